use serde::{Deserialize, Deserializer, Serialize};

const INBOUND: &str = "inbound";

/// Real-time message notification delivered by the socket channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundEvent {
   pub user_id: String,
   #[serde(default)]
   pub platform: Option<String>,
   #[serde(default)]
   pub text: String,
   #[serde(default, deserialize_with = "lenient_timestamp")]
   pub timestamp: Option<String>,
   #[serde(default)]
   pub direction: Option<String>,
   #[serde(default)]
   pub remitente: Option<String>,
   #[serde(default)]
   pub conversation_id: Option<String>,
}

impl InboundEvent {
   /// Customer-originated messages are tagged `inbound`.
   pub fn is_inbound(&self) -> bool {
      self.direction.as_deref() == Some(INBOUND)
   }

   pub fn sender_name(&self) -> Option<&str> {
      self.remitente.as_deref().map(str::trim).filter(|n| !n.is_empty())
   }
}

/// Timestamps arrive either as ISO strings or as epoch numbers.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
   D: Deserializer<'de>,
{
   let value = Option::<serde_json::Value>::deserialize(deserializer)?;
   Ok(match value {
      Some(serde_json::Value::String(s)) => Some(s),
      Some(serde_json::Value::Number(n)) => Some(n.to_string()),
      _ => None,
   })
}
