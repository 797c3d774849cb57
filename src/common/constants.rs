pub const DEFAULT_PORT: u16 = 4455;
pub const DEFAULT_BACKLOG: u32 = 256;
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;
pub const DEFAULT_TICK_PERIOD_MS: u64 = 5000;
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096; // 4KB

/// Upper bound on readiness events collected per wait
pub const MAX_EVENTS_PER_WAIT: usize = 1024;

pub const MESSAGE_PREFIX: &str = "Message from socket";
pub const LINE_TERMINATOR: &[u8] = b"\n";
