mod channel;
mod conversation;
mod event;
pub mod input;
mod message;
pub mod remote;

pub use channel::Channel;
pub use conversation::{ConversationSummary, UNNAMED};
pub use event::InboundEvent;
pub use message::Message;
