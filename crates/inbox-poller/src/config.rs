use std::time::Duration;

use url::Url;

use crate::models::{ConversationId, conversation_path};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TOAST_VISIBLE_FOR: Duration = Duration::from_secs(5);
pub const DEFAULT_TOAST_FADE_FOR: Duration = Duration::from_millis(300);

pub const DEFAULT_UNREAD_COUNT_PATH: &str = "/messaging/unread-count/";
pub const DEFAULT_NOTIFICATIONS_PATH: &str = "/messaging/notifications/";
pub const DEFAULT_ICON_PATH: &str = "/static/messaging/img/message-icon.png";

pub const NATIVE_NOTIFICATION_TITLE: &str = "New Message";

#[derive(Clone, Debug)]
pub struct PollerConfig {
    pub base_url: Url,
    pub unread_count_path: String,
    pub notifications_path: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub toast_visible_for: Duration,
    pub toast_fade_for: Duration,
    pub icon_path: Option<String>,
}

impl PollerConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            unread_count_path: DEFAULT_UNREAD_COUNT_PATH.to_string(),
            notifications_path: DEFAULT_NOTIFICATIONS_PATH.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            toast_visible_for: DEFAULT_TOAST_VISIBLE_FOR,
            toast_fade_for: DEFAULT_TOAST_FADE_FOR,
            icon_path: Some(DEFAULT_ICON_PATH.to_string()),
        }
    }

    pub fn unread_count_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.unread_count_path)
    }

    pub fn notifications_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.notifications_path)
    }

    /// Absolute link to a conversation page; falls back to the bare path if
    /// the base cannot be joined.
    pub fn conversation_url(&self, id: &ConversationId) -> String {
        let path = conversation_path(id);
        self.base_url
            .join(&path)
            .map(|u| u.to_string())
            .unwrap_or(path)
    }

    pub fn icon_url(&self) -> Option<String> {
        let icon = self.icon_path.as_deref()?;
        self.base_url.join(icon).ok().map(|u| u.to_string())
    }
}
