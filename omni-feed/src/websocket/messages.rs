use std::time::Duration;

use crate::models::InboundEvent;

/// Connection state published by the socket channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketStatus {
   Connecting,
   Connected,
   Reconnecting { attempt: u32, delay: Duration },
   /// Closed on request or by a normal close from the server
   Closed,
   /// Retry budget exhausted; no further live updates
   GaveUp,
}

impl SocketStatus {
   pub fn is_terminal(&self) -> bool {
      matches!(self, SocketStatus::Closed | SocketStatus::GaveUp)
   }
}

/// Decode one text frame into an inbound event.
pub fn parse_frame(text: &str) -> Result<InboundEvent, serde_json::Error> {
   serde_json::from_str(text)
}
