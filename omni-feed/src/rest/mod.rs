mod client;
mod payload;

pub use client::ConversationApi;
pub use payload::{MetaReply, OutboundPayload, OutboundRoute};
