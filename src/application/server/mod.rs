pub mod broadcast_server;
pub mod listener;
pub mod message;
pub mod ticker;

pub use broadcast_server::BroadcastServer;
pub use listener::Listener;
pub use ticker::TickSchedule;
