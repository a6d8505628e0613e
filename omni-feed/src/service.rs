//! Wires the REST store, the socket channel and the feed actor together.

use tracing::{info, warn};

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::feed::{FeedFilter, FeedHandle, FeedStats};
use crate::models::input::{MarkManagedInput, SendReplyInput, ValidateExt};
use crate::models::{ConversationSummary, Message};
use crate::rest::ConversationApi;
use crate::transcript::{RequestToken, TranscriptLoader};
use crate::websocket::{ReconnectPolicy, SocketChannel, SocketHandle};

pub struct FeedService {
    api: ConversationApi,
    feed: FeedHandle,
    transcripts: TranscriptLoader,
    ws_url: String,
    policy: ReconnectPolicy,
}

impl FeedService {
    /// Must be called from within a tokio runtime; spawns the feed actor.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let api = ConversationApi::from_config(config)?;
        Ok(Self::with_api(api, config.ws_url.clone(), config.reconnect))
    }

    pub fn with_api(api: ConversationApi, ws_url: String, policy: ReconnectPolicy) -> Self {
        let feed = FeedHandle::spawn();
        let transcripts = TranscriptLoader::new(api.clone(), feed.clone());
        Self {
            api,
            feed,
            transcripts,
            ws_url,
            policy,
        }
    }

    pub fn feed(&self) -> &FeedHandle {
        &self.feed
    }

    pub fn api(&self) -> &ConversationApi {
        &self.api
    }

    /// Bulk-load the conversation list from the REST store.
    pub async fn hydrate(&self) -> Result<usize> {
        let records = self.api.list_conversations().await?;
        self.feed.hydrate(records).await
    }

    /// Open the socket channel; every event is merged into the feed.
    pub fn connect(&self) -> SocketHandle {
        let feed = self.feed.clone();
        SocketChannel::new(self.ws_url.clone(), self.policy).spawn(move |event| {
            if let Err(e) = feed.apply_inbound(event) {
                warn!(error = %e, "Dropping inbound event");
            }
        })
    }

    /// Select a conversation; its history loads in the background.
    pub async fn select(&self, user_id: &str) -> Result<RequestToken> {
        self.transcripts.select(user_id).await
    }

    pub async fn deselect(&self) -> Result<()> {
        self.transcripts.deselect().await
    }

    /// Select a conversation and return it once its history is loaded.
    pub async fn open_transcript(&self, user_id: &str) -> Result<ConversationSummary> {
        if !self.transcripts.select_and_load(user_id).await? {
            warn!(user_id = %user_id, "Transcript superseded by a newer selection");
        }
        self.feed
            .selected()
            .await?
            .ok_or_else(|| FeedError::NotFound(format!("conversation for {}", user_id)))
    }

    /// Send an operator reply through the conversation's channel.
    pub async fn send_reply(&self, user_id: &str, text: &str) -> Result<Message> {
        SendReplyInput {
            user_id: user_id.to_string(),
            text: text.to_string(),
        }
        .validate_input()?;

        let session = self.api.session();
        if !session.is_admin() {
            return Err(FeedError::NotPermitted(session.operator().name.clone()));
        }

        let conversation = self
            .feed
            .snapshot()
            .await?
            .into_iter()
            .find(|c| c.user_id == user_id)
            .ok_or_else(|| FeedError::NotFound(format!("conversation for {}", user_id)))?;

        self.api
            .send_reply(conversation.channel, user_id, text)
            .await?;

        self.feed
            .append_reply(user_id, text, &session.operator().name)
            .await?
            .ok_or_else(|| FeedError::NotFound(format!("conversation for {}", user_id)))
    }

    pub async fn mark_managed(&self, conversation_id: &str) -> Result<()> {
        MarkManagedInput {
            conversation_id: conversation_id.to_string(),
        }
        .validate_input()?;

        self.api.mark_managed(conversation_id).await?;
        if !self.feed.set_managed(conversation_id).await? {
            info!(conversation_id = %conversation_id, "Managed conversation is not in the feed");
        }
        Ok(())
    }

    pub async fn filtered(&self, filter: &FeedFilter) -> Result<Vec<ConversationSummary>> {
        let snapshot = self.feed.snapshot().await?;
        Ok(snapshot.into_iter().filter(|c| filter.matches(c)).collect())
    }

    pub async fn stats(&self) -> Result<FeedStats> {
        self.feed.stats().await
    }
}
