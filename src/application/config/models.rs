use crate::common::constants::{
    DEFAULT_BACKLOG, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, DEFAULT_READ_BUFFER_SIZE,
    DEFAULT_TICK_PERIOD_MS,
};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// IPv4 address to bind (all interfaces by default)
    #[serde(default = "default_bind_address")]
    pub bind_address: Ipv4Addr,

    /// TCP port; 0 picks an ephemeral port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Pending connection queue length passed to listen()
    #[serde(default = "default_backlog")]
    pub backlog: u32,

    /// Maximum simultaneous client connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Interval between tick broadcasts in milliseconds
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Delay before the first tick; one full period when unset
    #[serde(default)]
    pub first_tick_delay_ms: Option<u64>,

    /// Size of a single read from a client socket
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// Cap on connections accepted per wake-up; unset drains the backlog
    #[serde(default)]
    pub max_accepts_per_wake: Option<usize>,

    /// Whether a sender receives its own messages
    #[serde(default = "default_echo_to_sender")]
    pub echo_to_sender: bool,
}

fn default_bind_address() -> Ipv4Addr {
    Ipv4Addr::UNSPECIFIED
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_backlog() -> u32 {
    DEFAULT_BACKLOG
}

fn default_max_connections() -> usize {
    DEFAULT_MAX_CONNECTIONS
}

fn default_tick_period_ms() -> u64 {
    DEFAULT_TICK_PERIOD_MS
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

fn default_echo_to_sender() -> bool {
    true
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.bind_address, self.port)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn first_tick_delay(&self) -> Duration {
        self.first_tick_delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.tick_period())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            backlog: default_backlog(),
            max_connections: default_max_connections(),
            tick_period_ms: default_tick_period_ms(),
            first_tick_delay_ms: None,
            read_buffer_size: default_read_buffer_size(),
            max_accepts_per_wake: None,
            echo_to_sender: default_echo_to_sender(),
        }
    }
}
