//! Chat transcript loading for the selected conversation.
//!
//! Each selection yields a [`RequestToken`]. The fetch started for it is
//! aborted when a newer selection supersedes it, and the feed actor ignores
//! any result whose token is no longer current.

use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::feed::FeedHandle;
use crate::models::input::{SelectConversationInput, ValidateExt};
use crate::rest::ConversationApi;

/// Identifies one selection of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub user_id: String,
    pub generation: u64,
}

pub struct TranscriptLoader {
    api: ConversationApi,
    feed: FeedHandle,
    in_flight: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TranscriptLoader {
    pub fn new(api: ConversationApi, feed: FeedHandle) -> Self {
        Self {
            api,
            feed,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Select a conversation and start loading its history in the background.
    pub async fn select(&self, user_id: &str) -> Result<RequestToken> {
        let (token, _done) = self.start(user_id).await?;
        Ok(token)
    }

    /// Select a conversation and wait for its history to be applied.
    ///
    /// Returns `false` when a newer selection made the result stale.
    pub async fn select_and_load(&self, user_id: &str) -> Result<bool> {
        let (_, done) = self.start(user_id).await?;
        match done.await {
            Ok(applied) => applied,
            // Aborted by a newer selection
            Err(_) => Ok(false),
        }
    }

    /// Issue the token and register its fetch while holding the in-flight
    /// lock, so the fetch that gets aborted is always the older one.
    async fn start(
        &self,
        user_id: &str,
    ) -> Result<(RequestToken, oneshot::Receiver<Result<bool>>)> {
        SelectConversationInput {
            user_id: user_id.to_string(),
        }
        .validate_input()?;

        let mut in_flight = self.in_flight.lock().await;
        let token = self.feed.select(user_id).await?;
        if let Some(previous) = in_flight.take() {
            debug!("Aborting superseded transcript fetch");
            previous.abort();
        }

        let (done_tx, done_rx) = oneshot::channel();
        let api = self.api.clone();
        let feed = self.feed.clone();
        let task_token = token.clone();
        *in_flight = Some(tokio::spawn(async move {
            let _ = done_tx.send(load_into_feed(&api, &feed, task_token).await);
        }));

        Ok((token, done_rx))
    }

    pub async fn deselect(&self) -> Result<()> {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }
        self.feed.deselect().await
    }
}

async fn load_into_feed(
    api: &ConversationApi,
    feed: &FeedHandle,
    token: RequestToken,
) -> Result<bool> {
    let transcript = match api.fetch_transcript(&token.user_id).await {
        Ok(transcript) => transcript,
        Err(e) => {
            error!(user_id = %token.user_id, error = %e, "Failed to load transcript");
            return Err(e);
        }
    };

    let count = transcript.messages.len();
    let applied = feed
        .replace_transcript(token.clone(), transcript)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to apply transcript"))?;
    if applied {
        info!(user_id = %token.user_id, messages = count, "Transcript loaded");
    } else {
        debug!(user_id = %token.user_id, "Discarded stale transcript");
    }
    Ok(applied)
}
