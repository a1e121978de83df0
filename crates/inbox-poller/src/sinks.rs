// Capabilities the poller drives. A browser shell, a desktop wrapper or a
// test double all plug in here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ConversationId;
use crate::toast::Toast;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Never asked.
    #[default]
    Default,
    Granted,
    Denied,
    /// No native notification facility at all.
    Unsupported,
}

/// A native (OS-level) notification for one conversation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NativeNotice {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub conversation_id: ConversationId,
    /// Where activating the notice should take the user.
    pub target_url: String,
}

pub trait NotificationSink: Send + Sync {
    fn permission(&self) -> Permission;

    /// Ask the user for permission. Resolution may arrive later; callers
    /// re-read [`NotificationSink::permission`] rather than waiting.
    fn request_permission(&self);

    /// Show the notice. Activation must focus the window and navigate to
    /// `notice.target_url`.
    fn show(&self, notice: NativeNotice);
}

pub trait TitleSink: Send + Sync {
    fn title(&self) -> String;
    fn set_title(&self, title: &str);
    fn has_focus(&self) -> bool;
}

pub trait ToastSink: Send + Sync {
    fn show(&self, toast: &Toast);
    /// Start the fade-out transition.
    fn fade(&self, id: u64);
    fn remove(&self, id: u64);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Everything the poller touches outside the network.
#[derive(Clone)]
pub struct Surfaces {
    pub notifications: Arc<dyn NotificationSink>,
    pub title: Arc<dyn TitleSink>,
    pub toasts: Arc<dyn ToastSink>,
    pub clock: Arc<dyn Clock>,
}
