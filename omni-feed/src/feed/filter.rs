use std::str::FromStr;

use crate::models::{Channel, ConversationSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Managed,
    Pending,
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "todos" => Ok(StatusFilter::All),
            "managed" | "gestionado" => Ok(StatusFilter::Managed),
            "pending" | "pendiente" => Ok(StatusFilter::Pending),
            other => Err(format!("unknown status filter: {}", other)),
        }
    }
}

/// Search and facet filter over the conversation list.
#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    pub query: String,
    pub channel: Option<Channel>,
    pub status: StatusFilter,
}

impl FeedFilter {
    pub fn matches(&self, summary: &ConversationSummary) -> bool {
        self.matches_query(summary) && self.matches_channel(summary) && self.matches_status(summary)
    }

    fn matches_query(&self, summary: &ConversationSummary) -> bool {
        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        summary.display_name.to_lowercase().contains(&query)
            || summary.last_message.to_lowercase().contains(&query)
    }

    fn matches_channel(&self, summary: &ConversationSummary) -> bool {
        match self.channel {
            Some(channel) => summary.channel.normalized() == channel.normalized(),
            None => true,
        }
    }

    fn matches_status(&self, summary: &ConversationSummary) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Managed => summary.managed,
            StatusFilter::Pending => !summary.managed,
        }
    }
}
