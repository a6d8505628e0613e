//! Live omnichannel conversation feed.
//!
//! Keeps an ordered, in-memory collection of conversation summaries that is
//! hydrated from the REST conversation store and kept current by a
//! reconnecting WebSocket channel. All mutations go through a single-writer
//! actor so the feed and the transcript view never drift apart.

pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod rest;
pub mod service;
pub mod session;
pub mod transcript;
pub mod utils;
pub mod websocket;

pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use feed::{ConversationFeed, FeedFilter, FeedHandle, FeedUpdate, StatusFilter};
pub use models::{Channel, ConversationSummary, InboundEvent, Message};
pub use rest::ConversationApi;
pub use service::FeedService;
pub use session::{Operator, Session};
pub use transcript::{RequestToken, TranscriptLoader};
pub use websocket::{ReconnectPolicy, SocketChannel, SocketHandle, SocketStatus};
