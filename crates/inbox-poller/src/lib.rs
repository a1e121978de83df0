//! Unread-message polling for the messaging inbox.
//!
//! A [`NotificationPoller`] asks the server for the unread count every 30
//! seconds, fetches the most recent unread conversation when there is one,
//! and surfaces it once: a native notification (if permitted) plus an in-page
//! toast. The window title carries a `(N)` marker while the window is in the
//! background.
//!
//! Everything outside the network is reached through the traits in
//! [`sinks`], so the polling logic runs the same under a browser shell, a
//! desktop sidecar or a test.

pub mod api;
pub mod config;
pub mod models;
pub mod poller;
pub mod sinks;
pub mod time;
pub mod title;
pub mod toast;

pub use api::{ApiError, HttpMessagingApi, MessagingApi};
pub use config::PollerConfig;
pub use models::{ApiStatus, ConversationId, ConversationNotification, UnreadSummary};
pub use poller::{CycleOutcome, NotificationPoller, PollState, PollerControl, PollerHandle};
pub use sinks::{
    Clock, NativeNotice, NotificationSink, Permission, Surfaces, SystemClock, TitleSink, ToastSink,
};
pub use toast::Toast;
