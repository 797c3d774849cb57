use crate::common::error::{Result, ServerError};
use crate::core::net::socket::ClientSocket;
use std::io::{ErrorKind, IoSlice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were placed at the start of the buffer
    Data(usize),
    /// Orderly shutdown by the peer
    Closed,
    /// Nothing more to read right now
    WouldBlock,
}

pub fn read_non_blocking(socket: &mut ClientSocket, buf: &mut [u8]) -> Result<ReadOutcome> {
    loop {
        match socket.read(buf) {
            Ok(0) => return Ok(ReadOutcome::Closed),
            Ok(n) => return Ok(ReadOutcome::Data(n)),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => return Ok(ReadOutcome::WouldBlock),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ServerError::IoError(e)),
        }
    }
}

/// One vectored write attempt. A full send buffer surfaces as a `WouldBlock`
/// error and the data is not retried.
pub fn write_non_blocking(socket: &mut ClientSocket, parts: &[IoSlice<'_>]) -> Result<usize> {
    loop {
        match socket.write_vectored(parts) {
            Ok(n) => return Ok(n),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ServerError::IoError(e)),
        }
    }
}
