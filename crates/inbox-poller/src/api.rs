use std::future::Future;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::PollerConfig;
use crate::models::{ApiStatus, ConversationNotification, NotificationsResponse, UnreadSummary};

pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("invalid json from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("server reported status {0:?}")]
    ServerStatus(String),
    #[error("success response is missing `{0}`")]
    MissingField(&'static str),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The two read-only endpoints the poller consumes.
pub trait MessagingApi: Send + Sync {
    fn unread_count(&self) -> impl Future<Output = Result<u64, ApiError>> + Send;

    /// Unread conversations, most recent first.
    fn unread_conversations(
        &self,
    ) -> impl Future<Output = Result<Vec<ConversationNotification>, ApiError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpMessagingApi {
    client: reqwest::Client,
    unread_count_url: Url,
    notifications_url: Url,
}

impl HttpMessagingApi {
    pub fn new(config: &PollerConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Client)?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: &PollerConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client,
            unread_count_url: config.unread_count_url()?,
            notifications_url: config.notifications_url()?,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ApiError> {
        let transport = |source| ApiError::Transport {
            url: url.to_string(),
            source,
        };
        let resp = self
            .client
            .get(url.clone())
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl MessagingApi for HttpMessagingApi {
    async fn unread_count(&self) -> Result<u64, ApiError> {
        let summary: UnreadSummary = self.get_json(&self.unread_count_url).await?;
        unread_total(summary)
    }

    async fn unread_conversations(&self) -> Result<Vec<ConversationNotification>, ApiError> {
        let resp: NotificationsResponse = self.get_json(&self.notifications_url).await?;
        conversations(resp)
    }
}

pub fn unread_total(summary: UnreadSummary) -> Result<u64, ApiError> {
    if let ApiStatus::NotOk(status) = summary.status {
        return Err(ApiError::ServerStatus(status));
    }
    summary
        .total_unread
        .ok_or(ApiError::MissingField("total_unread"))
}

pub fn conversations(resp: NotificationsResponse) -> Result<Vec<ConversationNotification>, ApiError> {
    match resp.status {
        ApiStatus::Ok => Ok(resp.unread_conversations),
        ApiStatus::NotOk(status) => Err(ApiError::ServerStatus(status)),
    }
}
