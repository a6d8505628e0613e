use serde::Serialize;

use crate::models::{Channel, ConversationSummary};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChannelStats {
    pub channel: Channel,
    pub total: usize,
    /// Conversations with unread customer messages
    pub active: usize,
    pub managed: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FeedStats {
    pub total: usize,
    pub unread: usize,
    pub managed: usize,
    pub pending: usize,
    pub channels: Vec<ChannelStats>,
}

impl FeedStats {
    /// Counts per display channel; Messenger is folded into Facebook.
    pub fn from_conversations(conversations: &[ConversationSummary]) -> Self {
        let channels = Channel::ALL
            .iter()
            .map(|&channel| {
                let in_channel = conversations
                    .iter()
                    .filter(|c| c.channel.normalized() == channel);
                let (mut total, mut active, mut managed) = (0, 0, 0);
                for summary in in_channel {
                    total += 1;
                    active += usize::from(summary.unread);
                    managed += usize::from(summary.managed);
                }
                ChannelStats {
                    channel,
                    total,
                    active,
                    managed,
                }
            })
            .collect();

        let managed = conversations.iter().filter(|c| c.managed).count();
        Self {
            total: conversations.len(),
            unread: conversations.iter().filter(|c| c.unread).count(),
            managed,
            pending: conversations.len() - managed,
            channels,
        }
    }
}
