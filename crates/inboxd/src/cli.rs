use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use inbox_poller::Permission;

#[derive(Debug, Parser)]
#[command(
    name = "inboxd",
    about = "Unread-message poller sidecar: JSON-lines commands on stdin, events on stdout"
)]
pub struct Cli {
    /// Optional TOML config file. CLI flags and env vars override it.
    #[arg(long, env = "INBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the messaging site, e.g. https://rooms.example.org/
    #[arg(long, env = "INBOX_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "INBOX_POLL_SECS")]
    pub poll_secs: Option<u64>,

    #[arg(long, env = "INBOX_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Title to annotate until the host sends `set_title`.
    #[arg(long, env = "INBOX_TITLE")]
    pub title: Option<String>,

    /// Where native notifications go.
    #[arg(long, value_enum, env = "INBOX_NATIVE")]
    pub native: Option<NativeMode>,

    /// Initial native notification permission.
    #[arg(long, value_enum, env = "INBOX_PERMISSION")]
    pub permission: Option<PermissionArg>,

    /// Start with this conversation open (polling suppressed).
    #[arg(long)]
    pub conversation: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeMode {
    /// OS notification center via notify-rust.
    Desktop,
    /// Emit `native_notification` events and let the host render them.
    Host,
    /// No native notifications; toasts only.
    Off,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionArg {
    Default,
    Granted,
    Denied,
}

impl From<PermissionArg> for Permission {
    fn from(value: PermissionArg) -> Self {
        match value {
            PermissionArg::Default => Permission::Default,
            PermissionArg::Granted => Permission::Granted,
            PermissionArg::Denied => Permission::Denied,
        }
    }
}
