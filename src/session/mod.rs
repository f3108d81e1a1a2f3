pub mod sequencer;
pub mod store;

pub use sequencer::{command_channel, Command, CommandSender, Sequencer};
pub use store::SessionStore;
