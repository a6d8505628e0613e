mod actor;
mod filter;
mod stats;
mod store;

pub use actor::{FeedHandle, FeedUpdate};
pub use filter::{FeedFilter, StatusFilter};
pub use stats::{ChannelStats, FeedStats};
pub use store::{ConversationFeed, MergeOutcome};
