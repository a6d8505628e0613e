use serde::{Deserialize, Serialize};

/// One entry of a conversation transcript. Never mutated once appended.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
   pub id: String,
   pub from_customer: bool,
   pub body: String,
   pub timestamp: String,
   pub sender_name: String,
}
