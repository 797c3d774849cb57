use crate::common::error::{Result, ServerError};
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};

/// A raw descriptor, optionally owned (closed on drop)
pub struct FileDescriptor {
    fd: RawFd,
    owned: bool,
}

impl FileDescriptor {
    pub fn borrowed(fd: RawFd) -> Self {
        Self { fd, owned: false }
    }

    pub fn from_raw(fd: RawFd) -> Self {
        Self { fd, owned: true }
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.fd
    }

    pub fn set_non_blocking(&self) -> Result<()> {
        unsafe {
            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 {
                return Err(ServerError::NetworkError(format!(
                    "Failed to get socket flags: {}",
                    std::io::Error::last_os_error()
                )));
            }

            if libc::fcntl(self.fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
                return Err(ServerError::NetworkError(format!(
                    "Failed to put socket into non-blocking mode: {}",
                    std::io::Error::last_os_error()
                )));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn is_non_blocking(&self) -> Result<bool> {
        let flags = unsafe { libc::fcntl(self.fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(ServerError::IoError(std::io::Error::last_os_error()));
        }
        Ok(flags & libc::O_NONBLOCK != 0)
    }
}

impl AsRawFd for FileDescriptor {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl IntoRawFd for FileDescriptor {
    fn into_raw_fd(mut self) -> RawFd {
        self.owned = false;
        self.fd
    }
}

impl Drop for FileDescriptor {
    fn drop(&mut self) {
        if self.owned && self.fd >= 0 {
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}
