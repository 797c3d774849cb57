use crate::common::constants::{LINE_TERMINATOR, MESSAGE_PREFIX};
use crate::common::time::Timestamp;
use std::io::IoSlice;
use std::os::unix::io::RawFd;

/// Header for one relayed chunk: `Message from socket <fd> at <secs>.<nanos>: `
///
/// The payload is passed through untouched, so a chunk that contains
/// newlines (or only part of a line) reaches peers exactly as it was read.
pub struct MessageFrame {
    prefix: String,
}

impl MessageFrame {
    pub fn new(sender: RawFd, at: Timestamp) -> Self {
        Self {
            prefix: format!("{} {} at {}: ", MESSAGE_PREFIX, sender, at),
        }
    }

    #[cfg(test)]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefix, payload and terminator as separate slices for a single writev
    pub fn io_slices<'a>(&'a self, payload: &'a [u8]) -> [IoSlice<'a>; 3] {
        [
            IoSlice::new(self.prefix.as_bytes()),
            IoSlice::new(payload),
            IoSlice::new(LINE_TERMINATOR),
        ]
    }

    #[cfg(test)]
    pub fn to_bytes(&self, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.prefix.len() + payload.len() + 1);
        out.extend_from_slice(self.prefix.as_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(LINE_TERMINATOR);
        out
    }
}

pub fn tick_message(n: u64) -> String {
    format!("Tick {}\n", n)
}
