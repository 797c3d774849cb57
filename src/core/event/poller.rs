use crate::common::error::{Result, ServerError};
use libc::c_int;
use std::io;
use std::os::unix::io::RawFd;

#[cfg(target_os = "macos")]
use libc::{kevent, kqueue, EVFILT_READ, EV_ADD, EV_DELETE, EV_ENABLE, EV_EOF, EV_ERROR};

#[cfg(target_os = "linux")]
use libc::{
    epoll_create1, epoll_ctl, epoll_event, epoll_wait, EPOLLERR, EPOLLHUP, EPOLLIN,
    EPOLL_CLOEXEC, EPOLL_CTL_ADD, EPOLL_CTL_DEL, EPOLL_CTL_MOD,
};

/// Readiness reported for one descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub fd: RawFd,
    pub readable: bool,
    /// Peer hung up or the socket is in an error state. A read will observe it.
    pub hangup: bool,
}

impl Event {
    pub fn empty() -> Self {
        Self {
            fd: -1,
            readable: false,
            hangup: false,
        }
    }
}

/// Level-triggered, read-interest-only readiness poller
pub struct Poller {
    #[cfg(target_os = "macos")]
    kq: RawFd,

    #[cfg(target_os = "linux")]
    epfd: RawFd,
}

impl Poller {
    pub fn new() -> Result<Self> {
        unsafe {
            #[cfg(target_os = "macos")]
            {
                let kq = kqueue();
                if kq < 0 {
                    return Err(ServerError::PollError(io::Error::last_os_error()));
                }
                Ok(Self { kq })
            }

            #[cfg(target_os = "linux")]
            {
                let epfd = epoll_create1(EPOLL_CLOEXEC);
                if epfd < 0 {
                    return Err(ServerError::PollError(io::Error::last_os_error()));
                }
                Ok(Self { epfd })
            }

            #[cfg(not(any(target_os = "macos", target_os = "linux")))]
            {
                Err(ServerError::NetworkError("Unsupported platform".to_string()))
            }
        }
    }

    pub fn register_read(&self, fd: RawFd) -> Result<()> {
        #[cfg(target_os = "macos")]
        {
            self.change_kevent(fd, (EV_ADD | EV_ENABLE) as u16)
        }

        #[cfg(target_os = "linux")]
        {
            let mut ev = epoll_event {
                events: EPOLLIN as u32,
                u64: fd as u64,
            };
            unsafe {
                if epoll_ctl(self.epfd, EPOLL_CTL_ADD, fd, &mut ev) < 0 {
                    // Already registered: refresh the interest set instead
                    if epoll_ctl(self.epfd, EPOLL_CTL_MOD, fd, &mut ev) < 0 {
                        return Err(ServerError::NetworkError(format!(
                            "Failed to register fd {} for readiness: {}",
                            fd,
                            io::Error::last_os_error()
                        )));
                    }
                }
            }
            Ok(())
        }
    }

    /// Remove `fd` from the interest set. Closing the descriptor has the same
    /// effect, so failures here are ignored.
    pub fn unregister(&self, fd: RawFd) {
        #[cfg(target_os = "macos")]
        {
            let _ = self.change_kevent(fd, EV_DELETE as u16);
        }

        #[cfg(target_os = "linux")]
        {
            unsafe {
                let _ = epoll_ctl(self.epfd, EPOLL_CTL_DEL, fd, std::ptr::null_mut());
            }
        }
    }

    #[cfg(target_os = "macos")]
    fn change_kevent(&self, fd: RawFd, flags: u16) -> Result<()> {
        let kev = libc::kevent {
            ident: fd as usize,
            filter: EVFILT_READ,
            flags,
            fflags: 0,
            data: 0,
            udata: std::ptr::null_mut(),
        };
        let ret = unsafe {
            kevent(
                self.kq,
                &kev as *const libc::kevent,
                1,
                std::ptr::null_mut(),
                0,
                std::ptr::null(),
            )
        };
        if ret < 0 {
            return Err(ServerError::NetworkError(format!(
                "Failed to change kevent for fd {}: {}",
                fd,
                io::Error::last_os_error()
            )));
        }
        Ok(())
    }

    /// Block until at least one registered descriptor is ready or `timeout_ms`
    /// elapses (`-1` waits forever). Returns the number of entries filled.
    pub fn wait(&self, events: &mut [Event], timeout_ms: i32) -> Result<usize> {
        #[cfg(target_os = "macos")]
        {
            let timeout = libc::timespec {
                tv_sec: (timeout_ms.max(0) / 1000) as libc::time_t,
                tv_nsec: ((timeout_ms.max(0) % 1000) * 1_000_000) as libc::c_long,
            };
            let timeout_ptr = if timeout_ms >= 0 {
                &timeout as *const libc::timespec
            } else {
                std::ptr::null()
            };

            let mut raw: Vec<libc::kevent> = vec![unsafe { std::mem::zeroed() }; events.len()];
            let n = unsafe {
                kevent(
                    self.kq,
                    std::ptr::null(),
                    0,
                    raw.as_mut_ptr(),
                    raw.len() as c_int,
                    timeout_ptr,
                )
            };
            if n < 0 {
                return Err(ServerError::PollError(io::Error::last_os_error()));
            }

            for (slot, kev) in events.iter_mut().zip(raw.iter().take(n as usize)) {
                *slot = Event {
                    fd: kev.ident as RawFd,
                    readable: kev.filter == EVFILT_READ,
                    hangup: kev.flags & (EV_EOF | EV_ERROR) != 0,
                };
            }
            Ok(n as usize)
        }

        #[cfg(target_os = "linux")]
        {
            let mut raw = vec![epoll_event { events: 0, u64: 0 }; events.len()];
            let n = unsafe {
                epoll_wait(
                    self.epfd,
                    raw.as_mut_ptr(),
                    raw.len() as c_int,
                    timeout_ms.max(-1),
                )
            };
            if n < 0 {
                return Err(ServerError::PollError(io::Error::last_os_error()));
            }

            for (slot, ep_ev) in events.iter_mut().zip(raw.iter().take(n as usize)) {
                let flags = ep_ev.events;
                *slot = Event {
                    fd: ep_ev.u64 as RawFd,
                    readable: flags & (EPOLLIN as u32) != 0,
                    hangup: flags & ((EPOLLHUP | EPOLLERR) as u32) != 0,
                };
            }
            Ok(n as usize)
        }
    }

    pub fn as_raw_fd(&self) -> RawFd {
        #[cfg(target_os = "macos")]
        {
            self.kq
        }

        #[cfg(target_os = "linux")]
        {
            self.epfd
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.as_raw_fd());
        }
    }
}
