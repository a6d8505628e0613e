use std::fmt;

use serde::{Deserialize, Serialize};

/// Messaging platform a conversation originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
   Whatsapp,
   Instagram,
   Facebook,
   Messenger,
   Tiktok,
}

impl Channel {
   pub const ALL: [Channel; 4] = [
      Channel::Whatsapp,
      Channel::Instagram,
      Channel::Facebook,
      Channel::Tiktok,
   ];

   /// Parse a platform tag; missing, empty or unknown values fall back to WhatsApp.
   pub fn from_platform(platform: Option<&str>) -> Self {
      match platform.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
         Some("instagram") => Channel::Instagram,
         Some("facebook") => Channel::Facebook,
         Some("messenger") => Channel::Messenger,
         Some("tiktok") => Channel::Tiktok,
         _ => Channel::Whatsapp,
      }
   }

   /// Messenger is shown, filtered and dispatched as Facebook.
   pub fn normalized(self) -> Self {
      match self {
         Channel::Messenger => Channel::Facebook,
         other => other,
      }
   }

   pub fn as_str(self) -> &'static str {
      match self {
         Channel::Whatsapp => "whatsapp",
         Channel::Instagram => "instagram",
         Channel::Facebook => "facebook",
         Channel::Messenger => "messenger",
         Channel::Tiktok => "tiktok",
      }
   }
}

impl fmt::Display for Channel {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

impl std::str::FromStr for Channel {
   type Err = String;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      match s.trim().to_ascii_lowercase().as_str() {
         "whatsapp" => Ok(Channel::Whatsapp),
         "instagram" => Ok(Channel::Instagram),
         "facebook" => Ok(Channel::Facebook),
         "messenger" => Ok(Channel::Messenger),
         "tiktok" => Ok(Channel::Tiktok),
         other => Err(format!("unknown channel: {}", other)),
      }
   }
}
