use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::message::Message;

/// Name shown for contacts the store has no name for.
pub const UNNAMED: &str = "Sin nombre";

/// One row of the conversation list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConversationSummary {
   pub id: String,
   pub conversation_id: Option<String>,
   pub user_id: String,
   pub channel: Channel,
   pub display_name: String,
   pub last_message: String,
   pub last_timestamp: Option<String>,
   pub unread: bool,
   pub urgent: bool,
   pub managed: bool,
   pub kind: String,
   pub messages: Vec<Message>,
}

impl ConversationSummary {
   /// A name is a placeholder when the store never knew it.
   pub fn has_placeholder_name(&self) -> bool {
      let name = self.display_name.trim();
      name.is_empty() || name == UNNAMED || name == self.user_id
   }
}
