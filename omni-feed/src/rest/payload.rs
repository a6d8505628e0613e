use serde::Serialize;

use crate::error::{FeedError, Result};
use crate::models::Channel;

/// Body of an outbound reply; the shape depends on the channel.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OutboundPayload {
    WhatsApp {
        wa_id: String,
        text: String,
    },
    Meta {
        data: MetaReply,
        allowed_roles: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetaReply {
    pub user_id: String,
    pub text: String,
}

/// Where and what to POST for a reply on `channel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRoute {
    pub path: &'static [&'static str],
    pub payload: OutboundPayload,
}

impl OutboundRoute {
    pub fn for_channel(channel: Channel, user_id: &str, text: &str) -> Result<Self> {
        let meta = || OutboundPayload::Meta {
            data: MetaReply {
                user_id: user_id.to_string(),
                text: text.to_string(),
            },
            allowed_roles: Vec::new(),
        };

        match channel.normalized() {
            Channel::Whatsapp => Ok(Self {
                path: &["whatsapp", "whatsapp", "send-message"],
                payload: OutboundPayload::WhatsApp {
                    wa_id: user_id.to_string(),
                    text: text.to_string(),
                },
            }),
            Channel::Instagram => Ok(Self {
                path: &["instagram", "send"],
                payload: meta(),
            }),
            Channel::Facebook => Ok(Self {
                path: &["facebook", "send", "messenger"],
                payload: meta(),
            }),
            other => Err(FeedError::UnsupportedChannel(other.to_string())),
        }
    }
}
