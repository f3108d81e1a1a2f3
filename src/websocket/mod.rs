pub mod broadcast;
pub mod handler;
pub mod messages;

pub use broadcast::Broadcaster;
pub use handler::handle_websocket;
