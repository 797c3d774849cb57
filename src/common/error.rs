use std::fmt;

#[derive(Debug)]
pub enum ServerError {
    IoError(std::io::Error),
    ConfigError(String),
    NetworkError(String),
    ClockError(std::io::Error),
    PollError(std::io::Error),
    CapacityExceeded(usize),
}

impl ServerError {
    /// True when the underlying OS call was interrupted by a signal and may be retried
    pub fn is_interrupted(&self) -> bool {
        match self {
            ServerError::IoError(e) | ServerError::ClockError(e) | ServerError::PollError(e) => {
                e.kind() == std::io::ErrorKind::Interrupted
            }
            _ => false,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::IoError(e) => write!(f, "IO error: {}", e),
            ServerError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ServerError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ServerError::ClockError(e) => write!(f, "Failed to get time: {}", e),
            ServerError::PollError(e) => write!(f, "Readiness wait failed: {}", e),
            ServerError::CapacityExceeded(limit) => {
                write!(f, "Connection limit of {} reached", limit)
            }
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::IoError(e) | ServerError::ClockError(e) | ServerError::PollError(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::IoError(err)
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
