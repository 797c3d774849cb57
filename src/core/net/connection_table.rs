use crate::common::error::{Result, ServerError};
use crate::core::net::io::write_non_blocking;
use crate::core::net::socket::ClientSocket;
use log::warn;
use std::io::IoSlice;
use std::os::unix::io::RawFd;

/// Bounded, acceptance-ordered set of live client connections.
///
/// Removal compacts the sequence so the remaining connections keep their
/// relative order. Broadcast order and log output follow table order.
pub struct ConnectionTable {
    capacity: usize,
    connections: Vec<ClientSocket>,
}

impl ConnectionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            connections: Vec::with_capacity(capacity.min(64)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.connections.len() >= self.capacity
    }

    /// Admit a freshly accepted socket and return its index.
    ///
    /// On error the socket has already been closed: either the table is full
    /// or the socket could not be switched to non-blocking mode.
    pub fn add(&mut self, socket: ClientSocket) -> Result<usize> {
        if self.is_full() {
            return Err(ServerError::CapacityExceeded(self.capacity));
        }
        socket.set_non_blocking()?;
        self.connections.push(socket);
        Ok(self.connections.len() - 1)
    }

    /// Take the connection at `index` out of the table, shifting later entries
    /// left. Dropping the returned socket closes it.
    pub fn remove(&mut self, index: usize) -> ClientSocket {
        self.connections.remove(index)
    }

    pub fn position(&self, fd: RawFd) -> Option<usize> {
        self.connections.iter().position(|c| c.as_raw_fd() == fd)
    }

    pub fn get(&self, index: usize) -> Option<&ClientSocket> {
        self.connections.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ClientSocket> {
        self.connections.get_mut(index)
    }

    pub fn fds(&self) -> Vec<RawFd> {
        self.connections.iter().map(|c| c.as_raw_fd()).collect()
    }

    /// Write `parts` once to every connection except `skip`. Failures and short
    /// writes are logged and otherwise ignored. Returns the number of peers
    /// that took the whole message.
    pub fn broadcast(&mut self, parts: &[IoSlice<'_>], skip: Option<RawFd>) -> usize {
        let total: usize = parts.iter().map(|p| p.len()).sum();
        let mut delivered = 0;

        for conn in self.connections.iter_mut() {
            let fd = conn.as_raw_fd();
            if Some(fd) == skip {
                continue;
            }
            match write_non_blocking(conn, parts) {
                Ok(n) if n == total => delivered += 1,
                Ok(n) => warn!(
                    "Short write to socket {} ({} of {} bytes), rest dropped",
                    fd, n, total
                ),
                Err(e) => warn!(
                    "Failed to write to socket {} (doing nothing about it): {}",
                    fd, e
                ),
            }
        }

        delivered
    }
}
