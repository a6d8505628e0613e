use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

use crate::error::{FeedError, Result};
use crate::models::remote::{RawConversation, RemoteTranscript};
use crate::models::{ConversationSummary, InboundEvent, Message};
use crate::transcript::RequestToken;

use super::stats::FeedStats;
use super::store::{ConversationFeed, MergeOutcome};

/// Broadcast capacity; slow observers skip ahead rather than block the actor
const UPDATE_BUFFER: usize = 256;

/// Change notifications published after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    Hydrated { count: usize },
    Upserted { user_id: String, created: bool },
    TranscriptReplaced { user_id: String },
    ReplyAppended { user_id: String },
    ManagedChanged { conversation_id: String },
    ReadChanged { user_id: String },
    SelectionChanged { user_id: Option<String> },
}

enum FeedCommand {
    Hydrate {
        records: Vec<RawConversation>,
        reply: oneshot::Sender<usize>,
    },
    Inbound(InboundEvent),
    Select {
        user_id: String,
        reply: oneshot::Sender<RequestToken>,
    },
    Deselect {
        reply: oneshot::Sender<()>,
    },
    ReplaceTranscript {
        token: RequestToken,
        transcript: RemoteTranscript,
        reply: oneshot::Sender<bool>,
    },
    AppendReply {
        user_id: String,
        text: String,
        sender_name: String,
        reply: oneshot::Sender<Option<Message>>,
    },
    SetManaged {
        conversation_id: String,
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<ConversationSummary>>,
    },
    Selected {
        reply: oneshot::Sender<Option<ConversationSummary>>,
    },
    Stats {
        reply: oneshot::Sender<FeedStats>,
    },
}

/// Sole owner of the conversation feed; applies commands one at a time.
struct FeedActor {
    feed: ConversationFeed,
    selection: Option<RequestToken>,
    generation: u64,
    updates: broadcast::Sender<FeedUpdate>,
}

impl FeedActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<FeedCommand>) {
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        debug!("All feed handles dropped, stopping feed actor");
    }

    fn publish(&self, update: FeedUpdate) {
        // No subscribers is fine
        let _ = self.updates.send(update);
    }

    fn is_current(&self, token: &RequestToken) -> bool {
        self.selection.as_ref() == Some(token)
    }

    fn handle(&mut self, command: FeedCommand) {
        match command {
            FeedCommand::Hydrate { records, reply } => {
                let count = self.feed.hydrate(records);
                info!(count, total = self.feed.len(), "Feed hydrated");
                self.publish(FeedUpdate::Hydrated { count });
                let _ = reply.send(count);
            }
            FeedCommand::Inbound(event) => {
                let outcome = self.feed.apply_inbound_event(&event);
                debug!(user_id = %event.user_id, ?outcome, "Merged inbound event");

                // The selected conversation is on screen, so it is read as it arrives
                let on_screen = self
                    .selection
                    .as_ref()
                    .is_some_and(|s| s.user_id == event.user_id);
                if on_screen {
                    self.feed.mark_read(&event.user_id);
                }

                self.publish(FeedUpdate::Upserted {
                    user_id: event.user_id,
                    created: outcome == MergeOutcome::Created,
                });
            }
            FeedCommand::Select { user_id, reply } => {
                self.generation += 1;
                let token = RequestToken {
                    user_id: user_id.clone(),
                    generation: self.generation,
                };
                self.selection = Some(token.clone());
                self.publish(FeedUpdate::SelectionChanged {
                    user_id: Some(user_id.clone()),
                });
                if self.feed.mark_read(&user_id) {
                    self.publish(FeedUpdate::ReadChanged { user_id });
                }
                let _ = reply.send(token);
            }
            FeedCommand::Deselect { reply } => {
                self.generation += 1;
                self.selection = None;
                self.publish(FeedUpdate::SelectionChanged { user_id: None });
                let _ = reply.send(());
            }
            FeedCommand::ReplaceTranscript {
                token,
                transcript,
                reply,
            } => {
                let applied =
                    self.is_current(&token) && self.feed.replace_transcript(&token.user_id, transcript);
                if applied {
                    self.publish(FeedUpdate::TranscriptReplaced {
                        user_id: token.user_id,
                    });
                }
                let _ = reply.send(applied);
            }
            FeedCommand::AppendReply {
                user_id,
                text,
                sender_name,
                reply,
            } => {
                let message = self.feed.append_reply(&user_id, &text, &sender_name);
                if message.is_some() {
                    self.publish(FeedUpdate::ReplyAppended { user_id });
                }
                let _ = reply.send(message);
            }
            FeedCommand::SetManaged {
                conversation_id,
                reply,
            } => {
                let changed = self.feed.set_managed(&conversation_id);
                if changed {
                    self.publish(FeedUpdate::ManagedChanged { conversation_id });
                }
                let _ = reply.send(changed);
            }
            FeedCommand::Snapshot { reply } => {
                let _ = reply.send(self.feed.conversations().to_vec());
            }
            FeedCommand::Selected { reply } => {
                let selected = self
                    .selection
                    .as_ref()
                    .and_then(|s| self.feed.find_by_user(&s.user_id))
                    .cloned();
                let _ = reply.send(selected);
            }
            FeedCommand::Stats { reply } => {
                let _ = reply.send(self.feed.stats());
            }
        }
    }
}

/// Cloneable handle to the feed actor.
#[derive(Clone)]
pub struct FeedHandle {
    tx: mpsc::UnboundedSender<FeedCommand>,
    updates: broadcast::Sender<FeedUpdate>,
}

impl FeedHandle {
    /// Spawn the actor on the current tokio runtime with an empty feed.
    pub fn spawn() -> Self {
        Self::spawn_with(ConversationFeed::new())
    }

    pub fn spawn_with(feed: ConversationFeed) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);

        let actor = FeedActor {
            feed,
            selection: None,
            generation: 0,
            updates: updates.clone(),
        };
        tokio::spawn(actor.run(rx));

        Self { tx, updates }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedUpdate> {
        self.updates.subscribe()
    }

    fn send(&self, command: FeedCommand) -> Result<()> {
        self.tx.send(command).map_err(|_| FeedError::FeedClosed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> FeedCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.send(build(reply))?;
        rx.await.map_err(|_| FeedError::FeedClosed)
    }

    /// Queue a socket event. Does not wait for the merge.
    pub fn apply_inbound(&self, event: InboundEvent) -> Result<()> {
        self.send(FeedCommand::Inbound(event))
    }

    pub async fn hydrate(&self, records: Vec<RawConversation>) -> Result<usize> {
        self.request(|reply| FeedCommand::Hydrate { records, reply })
            .await
    }

    pub async fn select(&self, user_id: &str) -> Result<RequestToken> {
        let user_id = user_id.to_string();
        self.request(|reply| FeedCommand::Select { user_id, reply })
            .await
    }

    pub async fn deselect(&self) -> Result<()> {
        self.request(|reply| FeedCommand::Deselect { reply }).await
    }

    /// Apply a fetched transcript; `false` when the token was superseded.
    pub async fn replace_transcript(
        &self,
        token: RequestToken,
        transcript: RemoteTranscript,
    ) -> Result<bool> {
        self.request(|reply| FeedCommand::ReplaceTranscript {
            token,
            transcript,
            reply,
        })
        .await
    }

    pub async fn append_reply(
        &self,
        user_id: &str,
        text: &str,
        sender_name: &str,
    ) -> Result<Option<Message>> {
        let (user_id, text, sender_name) =
            (user_id.to_string(), text.to_string(), sender_name.to_string());
        self.request(|reply| FeedCommand::AppendReply {
            user_id,
            text,
            sender_name,
            reply,
        })
        .await
    }

    pub async fn set_managed(&self, conversation_id: &str) -> Result<bool> {
        let conversation_id = conversation_id.to_string();
        self.request(|reply| FeedCommand::SetManaged {
            conversation_id,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<Vec<ConversationSummary>> {
        self.request(|reply| FeedCommand::Snapshot { reply }).await
    }

    pub async fn selected(&self) -> Result<Option<ConversationSummary>> {
        self.request(|reply| FeedCommand::Selected { reply }).await
    }

    pub async fn stats(&self) -> Result<FeedStats> {
        self.request(|reply| FeedCommand::Stats { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::remote::RemoteMessage;

    fn event(user_id: &str, text: &str) -> InboundEvent {
        InboundEvent {
            user_id: user_id.to_string(),
            platform: Some("instagram".to_string()),
            text: text.to_string(),
            timestamp: None,
            direction: Some("inbound".to_string()),
            remitente: Some("Ana".to_string()),
            conversation_id: None,
        }
    }

    fn transcript(contents: &[&str]) -> RemoteTranscript {
        RemoteTranscript {
            id: Some("c1".to_string()),
            messages: contents
                .iter()
                .map(|c| RemoteMessage {
                    content: c.to_string(),
                    timestamp: None,
                    sender: "user".to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_inbound_events_are_serialized_through_actor() {
        let feed = FeedHandle::spawn();
        let mut updates = feed.subscribe();

        feed.apply_inbound(event("u1", "hola")).unwrap();
        feed.apply_inbound(event("u1", "sigo aquí")).unwrap();

        assert_eq!(
            updates.recv().await.unwrap(),
            FeedUpdate::Upserted {
                user_id: "u1".to_string(),
                created: true
            }
        );
        assert_eq!(
            updates.recv().await.unwrap(),
            FeedUpdate::Upserted {
                user_id: "u1".to_string(),
                created: false
            }
        );

        let snapshot = feed.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn test_stale_transcript_is_discarded() {
        let feed = FeedHandle::spawn();
        feed.apply_inbound(event("u1", "a")).unwrap();
        feed.apply_inbound(event("u2", "b")).unwrap();

        let stale = feed.select("u1").await.unwrap();
        let current = feed.select("u2").await.unwrap();
        assert!(current.generation > stale.generation);

        assert!(!feed.replace_transcript(stale, transcript(&["x", "y"])).await.unwrap());
        assert!(feed.replace_transcript(current, transcript(&["z"])).await.unwrap());

        let snapshot = feed.snapshot().await.unwrap();
        let u1 = snapshot.iter().find(|c| c.user_id == "u1").unwrap();
        let u2 = snapshot.iter().find(|c| c.user_id == "u2").unwrap();
        assert_eq!(u1.messages.len(), 1);
        assert_eq!(u2.messages.len(), 1);
        assert_eq!(u2.messages[0].body, "z");
    }

    #[tokio::test]
    async fn test_reselecting_same_conversation_supersedes_token() {
        let feed = FeedHandle::spawn();
        feed.apply_inbound(event("u1", "a")).unwrap();

        let first = feed.select("u1").await.unwrap();
        let second = feed.select("u1").await.unwrap();
        assert!(!feed.replace_transcript(first, transcript(&["old"])).await.unwrap());
        assert!(feed.replace_transcript(second, transcript(&["new"])).await.unwrap());
    }

    #[tokio::test]
    async fn test_selection_marks_read_and_tracks_live_events() {
        let feed = FeedHandle::spawn();
        feed.apply_inbound(event("u1", "a")).unwrap();
        feed.select("u1").await.unwrap();

        let selected = feed.selected().await.unwrap().unwrap();
        assert!(!selected.unread);

        feed.apply_inbound(event("u1", "b")).unwrap();
        let selected = feed.selected().await.unwrap().unwrap();
        assert!(!selected.unread);
        assert_eq!(selected.messages.len(), 2);

        feed.deselect().await.unwrap();
        assert!(feed.selected().await.unwrap().is_none());
    }
}
