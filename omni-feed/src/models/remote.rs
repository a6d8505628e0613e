//! Wire shapes of the REST conversation store.

use serde::{Deserialize, Serialize};

/// Conversation record from `GET /conversations/get-conversations/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawConversation {
   #[serde(rename = "_id")]
   pub id: String,
   #[serde(default)]
   pub user_id: Option<String>,
   #[serde(default)]
   pub platform: Option<String>,
   #[serde(default)]
   pub name: Option<String>,
   #[serde(default)]
   pub last_message: Option<String>,
   #[serde(default)]
   pub timestamp: Option<String>,
   #[serde(default)]
   pub unread: Option<i64>,
}

/// Response of `GET /conversations/conversations/messages/{user_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemoteTranscript {
   #[serde(rename = "_id", default)]
   pub id: Option<String>,
   #[serde(default)]
   pub messages: Vec<RemoteMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMessage {
   #[serde(default)]
   pub content: String,
   #[serde(default)]
   pub timestamp: Option<String>,
   #[serde(default)]
   pub sender: String,
}

impl RemoteMessage {
   pub fn from_customer(&self) -> bool {
      self.sender == "user"
   }
}

/// Response of `POST /conversations/contacts/{id}/gestionado`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedResponse {
   pub status: String,
   #[serde(default)]
   pub contact_id: Option<String>,
}
