// Readiness wait wrapper used by the server loop
use crate::common::constants::MAX_EVENTS_PER_WAIT;
use crate::common::error::Result;
use crate::common::time::duration_to_timeout_ms;
use crate::core::event::poller::{Event, Poller};
use log::debug;
use std::os::unix::io::RawFd;
use std::time::Duration;

pub struct EventLoop {
    poller: Poller,
    events: Vec<Event>,
}

impl EventLoop {
    pub fn new() -> Result<Self> {
        let poller = Poller::new()?;
        Ok(Self {
            poller,
            events: vec![Event::empty(); MAX_EVENTS_PER_WAIT],
        })
    }

    pub fn register_read(&self, fd: RawFd) -> Result<()> {
        self.poller.register_read(fd)
    }

    pub fn unregister(&self, fd: RawFd) {
        self.poller.unregister(fd)
    }

    /// Wait for readiness for at most `timeout`. An empty slice means the
    /// timeout elapsed or a signal interrupted the wait; the caller re-checks
    /// its deadline and waits again on the next turn.
    pub fn wait(&mut self, timeout: Duration) -> Result<&[Event]> {
        match self.poller.wait(&mut self.events, duration_to_timeout_ms(timeout)) {
            Ok(n) => Ok(&self.events[..n]),
            Err(e) if e.is_interrupted() => {
                debug!("Readiness wait interrupted by signal, retrying");
                Ok(&self.events[..0])
            }
            Err(e) => Err(e),
        }
    }
}
