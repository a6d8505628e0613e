use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::models::remote::{RawConversation, RemoteTranscript};
use crate::models::{Channel, ConversationSummary, InboundEvent, Message, UNNAMED};
use crate::utils::{local_reply_id, now_iso};

use super::stats::FeedStats;

const DEFAULT_KIND: &str = "inbox";

/// What applying an inbound event did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Created,
    Updated,
}

/// Ordered collection of conversation summaries, most recent activity first.
///
/// Holds at most one summary per `user_id`. Each summary owns its message
/// list, which is also the transcript shown for the selected conversation.
#[derive(Debug, Clone, Default)]
pub struct ConversationFeed {
    conversations: Vec<ConversationSummary>,
}

impl ConversationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn find_by_user(&self, user_id: &str) -> Option<&ConversationSummary> {
        self.conversations.iter().find(|c| c.user_id == user_id)
    }

    fn position_of(&self, user_id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.user_id == user_id)
    }

    /// Replace the feed with the store's conversation list.
    ///
    /// Records without a `user_id` are skipped and only the first record per
    /// user is kept. Summaries that exist only because a live event created
    /// them stay at the front. Returns the number of hydrated records.
    pub fn hydrate(&mut self, records: Vec<RawConversation>) -> usize {
        let mut seen = HashSet::new();
        let mut hydrated = Vec::with_capacity(records.len());

        for record in records {
            let Some(user_id) = record.user_id.clone().filter(|u| !u.is_empty()) else {
                debug!(id = %record.id, "Skipping conversation without user_id");
                continue;
            };
            if !seen.insert(user_id.clone()) {
                debug!(user_id = %user_id, "Skipping duplicate conversation");
                continue;
            }
            hydrated.push(summary_from_record(record, user_id));
        }

        let count = hydrated.len();
        let live_only: Vec<ConversationSummary> = self
            .conversations
            .drain(..)
            .filter(|c| !seen.contains(&c.user_id))
            .collect();

        self.conversations = live_only;
        self.conversations.extend(hydrated);
        count
    }

    /// Merge one socket event into the feed and move its conversation to the front.
    pub fn apply_inbound_event(&mut self, event: &InboundEvent) -> MergeOutcome {
        match self.position_of(&event.user_id) {
            Some(index) => {
                let mut summary = self.conversations.remove(index);

                if summary.has_placeholder_name() {
                    if let Some(name) = event.sender_name() {
                        summary.display_name = name.to_string();
                    }
                }

                let message = message_from_event(event, &summary.display_name);
                summary.last_message = event.text.clone();
                summary.last_timestamp = Some(message.timestamp.clone());
                summary.unread = true;
                summary.messages.push(message);

                self.conversations.insert(0, summary);
                MergeOutcome::Updated
            }
            None => {
                let display_name = event
                    .sender_name()
                    .map(String::from)
                    .unwrap_or_else(|| UNNAMED.to_string());
                let message = message_from_event(event, &display_name);

                let summary = ConversationSummary {
                    id: Uuid::new_v4().to_string(),
                    conversation_id: event.conversation_id.clone(),
                    user_id: event.user_id.clone(),
                    channel: Channel::from_platform(event.platform.as_deref()),
                    display_name,
                    last_message: event.text.clone(),
                    last_timestamp: Some(message.timestamp.clone()),
                    unread: true,
                    urgent: false,
                    managed: false,
                    kind: DEFAULT_KIND.to_string(),
                    messages: vec![message],
                };

                self.conversations.insert(0, summary);
                MergeOutcome::Created
            }
        }
    }

    /// Replace a conversation's messages with its stored history.
    pub fn replace_transcript(&mut self, user_id: &str, transcript: RemoteTranscript) -> bool {
        let Some(index) = self.position_of(user_id) else {
            return false;
        };
        let summary = &mut self.conversations[index];
        let prefix = transcript.id.unwrap_or_else(|| user_id.to_string());
        let sender_name = summary.display_name.clone();

        summary.messages = transcript
            .messages
            .into_iter()
            .enumerate()
            .map(|(i, remote)| Message {
                id: format!("{}-{}", prefix, i),
                from_customer: remote.from_customer(),
                body: remote.content,
                timestamp: remote.timestamp.unwrap_or_default(),
                sender_name: sender_name.clone(),
            })
            .collect();
        true
    }

    /// Record an operator reply that the store accepted.
    pub fn append_reply(&mut self, user_id: &str, text: &str, sender_name: &str) -> Option<Message> {
        let index = self.position_of(user_id)?;
        let summary = &mut self.conversations[index];

        let message = Message {
            id: local_reply_id(),
            from_customer: false,
            body: text.to_string(),
            timestamp: now_iso(),
            sender_name: sender_name.to_string(),
        };
        summary.last_message = message.body.clone();
        summary.last_timestamp = Some(message.timestamp.clone());
        summary.messages.push(message.clone());
        Some(message)
    }

    /// Flag a conversation as handled by an operator. Matches the store id.
    pub fn set_managed(&mut self, conversation_id: &str) -> bool {
        match self.conversations.iter_mut().find(|c| c.id == conversation_id) {
            Some(summary) => {
                summary.managed = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_read(&mut self, user_id: &str) -> bool {
        match self.position_of(user_id) {
            Some(index) => {
                let summary = &mut self.conversations[index];
                let changed = summary.unread;
                summary.unread = false;
                changed
            }
            None => false,
        }
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats::from_conversations(&self.conversations)
    }
}

fn summary_from_record(record: RawConversation, user_id: String) -> ConversationSummary {
    let unread = record.unread.unwrap_or(0);
    ConversationSummary {
        conversation_id: Some(record.id.clone()),
        id: record.id,
        user_id,
        channel: Channel::from_platform(record.platform.as_deref()),
        display_name: record
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNNAMED.to_string()),
        last_message: record.last_message.unwrap_or_default(),
        last_timestamp: record.timestamp,
        unread: unread > 0,
        urgent: false,
        managed: unread == 0,
        kind: DEFAULT_KIND.to_string(),
        messages: Vec::new(),
    }
}

fn message_from_event(event: &InboundEvent, fallback_name: &str) -> Message {
    Message {
        id: Uuid::new_v4().to_string(),
        from_customer: event.is_inbound(),
        body: event.text.clone(),
        timestamp: event.timestamp.clone().unwrap_or_else(now_iso),
        sender_name: event
            .sender_name()
            .unwrap_or(fallback_name)
            .to_string(),
    }
}
