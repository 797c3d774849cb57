use crate::common::error::{Result, ServerError};
use crate::core::net::fd::FileDescriptor;
use std::io::{self, IoSlice, Read, Write};
use std::net::{SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};

pub struct ListeningSocket {
    listener: TcpListener,
}

impl ListeningSocket {
    /// Create an IPv4 listening socket with `SO_REUSEADDR`, put it into
    /// non-blocking mode and start listening with the given backlog.
    pub fn bind(addr: SocketAddrV4, backlog: u32) -> Result<Self> {
        let raw = unsafe { libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0) };
        if raw < 0 {
            return Err(ServerError::NetworkError(format!(
                "Failed to create socket: {}",
                io::Error::last_os_error()
            )));
        }
        // Owned until handed to TcpListener, so every early return closes it
        let fd = FileDescriptor::from_raw(raw);

        let on: libc::c_int = 1;
        let ret = unsafe {
            libc::setsockopt(
                fd.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_REUSEADDR,
                &on as *const libc::c_int as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(ServerError::NetworkError(format!(
                "Failed to set SO_REUSEADDR: {}",
                io::Error::last_os_error()
            )));
        }

        let sin = sockaddr_v4(addr);
        let ret = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                &sin as *const libc::sockaddr_in as *const libc::sockaddr,
                std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(ServerError::NetworkError(format!(
                "Failed to bind socket to address '{}': {}",
                addr,
                io::Error::last_os_error()
            )));
        }

        fd.set_non_blocking()?;

        let backlog = backlog.min(libc::c_int::MAX as u32) as libc::c_int;
        if unsafe { libc::listen(fd.as_raw_fd(), backlog) } < 0 {
            return Err(ServerError::NetworkError(format!(
                "Failed to start listening for incoming connections: {}",
                io::Error::last_os_error()
            )));
        }

        let listener = unsafe { TcpListener::from_raw_fd(fd.into_raw_fd()) };
        Ok(Self { listener })
    }

    /// Accept one pending connection. `Ok(None)` means the backlog is drained.
    pub fn accept(&self) -> Result<Option<(TcpStream, SocketAddr)>> {
        loop {
            match self.listener.accept() {
                Ok(pair) => return Ok(Some(pair)),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ServerError::NetworkError(format!(
                        "accept () returned with error: {}",
                        e
                    )))
                }
            }
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.listener.as_raw_fd()
    }
}

fn sockaddr_v4(addr: SocketAddrV4) -> libc::sockaddr_in {
    let mut sin: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    sin.sin_family = libc::AF_INET as libc::sa_family_t;
    sin.sin_port = addr.port().to_be();
    sin.sin_addr = libc::in_addr {
        s_addr: u32::from(*addr.ip()).to_be(),
    };
    #[cfg(target_os = "macos")]
    {
        sin.sin_len = std::mem::size_of::<libc::sockaddr_in>() as u8;
    }
    sin
}

/// An accepted client connection. Dropping it closes the socket.
pub struct ClientSocket {
    stream: TcpStream,
    addr: SocketAddr,
}

impl ClientSocket {
    pub fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self { stream, addr }
    }

    pub fn set_non_blocking(&self) -> Result<()> {
        FileDescriptor::borrowed(self.as_raw_fd()).set_non_blocking()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }

    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    pub fn write_vectored(&mut self, parts: &[IoSlice<'_>]) -> io::Result<usize> {
        self.stream.write_vectored(parts)
    }
}
