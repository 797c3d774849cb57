use crate::application::config::models::Config;
use crate::application::config::validator::validate_config;
use crate::application::server::listener::Listener;
use crate::application::server::message::{tick_message, MessageFrame};
use crate::application::server::ticker::TickSchedule;
use crate::common::error::{Result, ServerError};
use crate::common::time::MonotonicClock;
use crate::core::event::event_loop::EventLoop;
use crate::core::net::connection_table::ConnectionTable;
use crate::core::net::io::{read_non_blocking, ReadOutcome};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::io::IoSlice;
use std::net::SocketAddr;
use std::os::unix::io::RawFd;

/// Single-threaded relay: every chunk read from a client is framed and written
/// to all connected clients, and a `Tick <n>` line goes out on a fixed period.
pub struct BroadcastServer {
    /// Listening socket
    listener: Listener,

    /// Active client connections in acceptance order
    connections: ConnectionTable,

    /// Readiness wait over the listener and all connections
    event_loop: EventLoop,

    clock: MonotonicClock,

    ticker: TickSchedule,

    /// Scratch buffer for client reads
    read_buffer: Vec<u8>,

    max_accepts_per_wake: Option<usize>,

    echo_to_sender: bool,
}

impl BroadcastServer {
    /// Validate `config`, bind the listener and arm the tick schedule
    pub fn new(config: &Config) -> Result<Self> {
        validate_config(config)?;

        let listener = Listener::new(config.listen_addr(), config.backlog)?;
        let event_loop = EventLoop::new()?;
        event_loop.register_read(listener.as_raw_fd())?;

        let clock = MonotonicClock::new();
        let ticker = TickSchedule::new(
            clock.now()?,
            config.first_tick_delay(),
            config.tick_period(),
        );

        info!("Listening at '{}'", listener.addr());

        Ok(Self {
            listener,
            connections: ConnectionTable::new(config.max_connections),
            event_loop,
            clock,
            ticker,
            read_buffer: vec![0u8; config.read_buffer_size],
            max_accepts_per_wake: config.max_accepts_per_wake,
            echo_to_sender: config.echo_to_sender,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.addr()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn capacity(&self) -> usize {
        self.connections.capacity()
    }

    /// Run the main server loop. Only returns on a fatal error.
    pub fn run(&mut self) -> Result<()> {
        loop {
            if let Err(e) = self.run_once() {
                error!("{}", e);
                return Err(e);
            }
        }
    }

    /// One loop iteration: wait, accept, read and relay, then tick
    pub fn run_once(&mut self) -> Result<()> {
        let timeout = self.ticker.time_until_due(self.clock.now()?);

        // Snapshot readiness before accepting so new connections wait a turn
        let listener_fd = self.listener.as_raw_fd();
        let mut listener_ready = false;
        let mut ready: HashSet<RawFd> = HashSet::new();
        for event in self.event_loop.wait(timeout)? {
            if event.hangup {
                debug!("Hangup reported on socket {}", event.fd);
            } else if !event.readable {
                continue;
            }
            if event.fd == listener_fd {
                listener_ready = true;
            } else {
                ready.insert(event.fd);
            }
        }

        if listener_ready {
            self.accept_pending()?;
        }

        if !ready.is_empty() {
            // Table order keeps relay order deterministic
            let ready_in_order: Vec<RawFd> = self
                .connections
                .fds()
                .into_iter()
                .filter(|fd| ready.contains(fd))
                .collect();
            for fd in ready_in_order {
                self.service_connection(fd)?;
            }
        }

        self.fire_tick_if_due()
    }

    /// Accept until the backlog is drained (or the per-wake cap is hit)
    fn accept_pending(&mut self) -> Result<()> {
        let mut accepted = 0;
        while self.max_accepts_per_wake.map_or(true, |cap| accepted < cap) {
            let socket = match self.listener.accept()? {
                Some(socket) => socket,
                None => return Ok(()),
            };
            accepted += 1;

            let peer = socket.peer_addr();
            let fd = socket.as_raw_fd();
            info!("Have incoming connection from '{}'", peer);

            match self.connections.add(socket) {
                Ok(index) => {
                    if let Err(e) = self.event_loop.register_read(fd) {
                        warn!("Dropping connection from '{}': {}", peer, e);
                        self.connections.remove(index);
                    }
                }
                Err(ServerError::CapacityExceeded(limit)) => {
                    warn!(
                        "Connection limit of {} reached, dropping new connection from '{}'",
                        limit, peer
                    );
                }
                Err(e) => warn!("Dropping connection from '{}': {}", peer, e),
            }
        }

        debug!("Accept cap of {} reached, rest of backlog waits", accepted);
        Ok(())
    }

    /// Read from one ready connection until it would block, relaying each chunk
    fn service_connection(&mut self, fd: RawFd) -> Result<()> {
        loop {
            let index = match self.connections.position(fd) {
                Some(index) => index,
                None => return Ok(()),
            };
            let socket = match self.connections.get_mut(index) {
                Some(socket) => socket,
                None => return Ok(()),
            };

            match read_non_blocking(socket, &mut self.read_buffer) {
                Ok(ReadOutcome::Data(n)) => {
                    let frame = MessageFrame::new(fd, self.clock.now()?);
                    let skip = if self.echo_to_sender { None } else { Some(fd) };
                    let slices = frame.io_slices(&self.read_buffer[..n]);
                    self.connections.broadcast(&slices, skip);
                }
                Ok(ReadOutcome::WouldBlock) => return Ok(()),
                Ok(ReadOutcome::Closed) => {
                    info!("Connection on socket {} closed by peer", fd);
                    self.close_connection(index);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Failed to read from socket {}: {}", fd, e);
                    self.close_connection(index);
                    return Ok(());
                }
            }
        }
    }

    fn fire_tick_if_due(&mut self) -> Result<()> {
        let now = self.clock.now()?;
        if let Some(n) = self.ticker.poll(now) {
            let message = tick_message(n);
            let delivered = self
                .connections
                .broadcast(&[IoSlice::new(message.as_bytes())], None);
            debug!(
                "Tick {} delivered to {} of {} connections, next at {}",
                n,
                delivered,
                self.connections.len(),
                self.ticker.next_due()
            );
        }
        Ok(())
    }

    /// Deregister and close a connection
    fn close_connection(&mut self, index: usize) {
        if let Some(socket) = self.connections.get(index) {
            self.event_loop.unregister(socket.as_raw_fd());
        }
        let socket = self.connections.remove(index);
        debug!(
            "Removed connection from '{}', {} remaining",
            socket.peer_addr(),
            self.connections.len()
        );
    }
}
