use crate::common::error::Result;
use crate::core::net::socket::{ClientSocket, ListeningSocket};
use std::net::{SocketAddr, SocketAddrV4};
use std::os::unix::io::RawFd;

/// Listener manages the listening socket for accepting connections
pub struct Listener {
    socket: ListeningSocket,
    addr: SocketAddr,
}

impl Listener {
    /// Create a new listener bound to the given address
    pub fn new(addr: SocketAddrV4, backlog: u32) -> Result<Self> {
        let socket = ListeningSocket::bind(addr, backlog)?;
        // Resolves port 0 to the port actually assigned
        let addr = socket.local_addr()?;
        Ok(Self { socket, addr })
    }

    /// Accept a new client connection (non-blocking)
    pub fn accept(&self) -> Result<Option<ClientSocket>> {
        Ok(self
            .socket
            .accept()?
            .map(|(stream, addr)| ClientSocket::new(stream, addr)))
    }

    /// Get the socket address this listener is bound to
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the file descriptor for event polling
    pub fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}
