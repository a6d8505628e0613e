use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use super::payload::OutboundRoute;
use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::models::remote::{ManagedResponse, RawConversation, RemoteTranscript};
use crate::models::Channel;
use crate::session::Session;

const USER_AGENT: &str = "omni-feed/0.1";

/// Client for the REST conversation store.
#[derive(Clone)]
pub struct ConversationApi {
    http: reqwest::Client,
    base: Url,
    session: Session,
}

impl ConversationApi {
    pub fn new(base_url: &str, session: Session, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(FeedError::Config {
                key: "OMNI_API_URL".to_string(),
                reason: format!("{} cannot be used as a base URL", base_url),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, base, session })
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        Self::new(&config.api_url, config.session(), config.http_timeout)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Build an endpoint URL; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FeedError::Config {
                key: "OMNI_API_URL".to_string(),
                reason: "base URL has no path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.bearer() {
            Some(bearer) => request.header(reqwest::header::AUTHORIZATION, bearer),
            None => request,
        }
    }

    fn checked(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self.authorized(self.http.get(url)).send().await?;
        let body = Self::checked(response)?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// `GET /conversations/get-conversations/`
    pub async fn list_conversations(&self) -> Result<Vec<RawConversation>> {
        let url = self.endpoint(&["conversations", "get-conversations", ""])?;
        let records: Vec<RawConversation> = self.get_json(url).await?;
        info!(count = records.len(), "Fetched conversations");
        Ok(records)
    }

    /// `GET /conversations/conversations/messages/{user_id}`
    pub async fn fetch_transcript(&self, user_id: &str) -> Result<RemoteTranscript> {
        let url = self.endpoint(&["conversations", "conversations", "messages", user_id])?;
        self.get_json(url).await
    }

    /// POST a reply to the channel-specific endpoint and return the store's answer.
    pub async fn send_reply(
        &self,
        channel: Channel,
        user_id: &str,
        text: &str,
    ) -> Result<serde_json::Value> {
        let route = OutboundRoute::for_channel(channel, user_id, text)?;
        let url = self.endpoint(route.path)?;
        debug!(url = %url, channel = %channel, "POST reply");

        let response = self
            .authorized(self.http.post(url))
            .json(&route.payload)
            .send()
            .await?;
        let body = Self::checked(response)?.bytes().await?;

        let result = serde_json::from_slice(&body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())
        });
        info!(user_id = %user_id, channel = %channel, "Reply sent");
        Ok(result)
    }

    /// `POST /conversations/contacts/{id}/gestionado`
    pub async fn mark_managed(&self, conversation_id: &str) -> Result<()> {
        let url = self.endpoint(&["conversations", "contacts", conversation_id, "gestionado"])?;
        debug!(url = %url, "POST managed");

        let response = self.authorized(self.http.post(url)).send().await?;
        let body = Self::checked(response)?.bytes().await?;
        let answer: ManagedResponse = serde_json::from_slice(&body)?;

        match answer.status.as_str() {
            "ok" => Ok(()),
            "not_found" => Err(FeedError::NotFound(format!("conversation {}", conversation_id))),
            other => {
                warn!(status = %other, "Unexpected managed response");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Operator;

    fn api(base: &str) -> ConversationApi {
        let session = Session::new(
            None,
            Operator {
                name: "Laura".to_string(),
                role: "admin".to_string(),
            },
        );
        ConversationApi::new(base, session, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_trailing_slash() {
        let api = api("https://example.com/api");
        let url = api.endpoint(&["conversations", "get-conversations", ""]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/conversations/get-conversations/");
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let api = api("https://example.com/");
        let url = api
            .endpoint(&["conversations", "conversations", "messages", "a/b c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/conversations/conversations/messages/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let session = Session::new(
            None,
            Operator {
                name: "x".to_string(),
                role: "agent".to_string(),
            },
        );
        let result = ConversationApi::new("mailto:ops@example.com", session, Duration::from_secs(1));
        assert!(matches!(result, Err(FeedError::Config { .. })));
    }
}
