use std::path::Path;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use inbox_poller::{ConversationId, Permission, PollerConfig};
use serde::Deserialize;
use url::Url;

use crate::cli::{Cli, NativeMode, PermissionArg};

const DEFAULT_TITLE: &str = "Messages";

/// Shape of the optional `--config` TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub poll_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub title: Option<String>,
    pub native: Option<NativeMode>,
    pub permission: Option<PermissionArg>,
    pub unread_count_path: Option<String>,
    pub notifications_path: Option<String>,
    pub icon_path: Option<String>,
    pub toast_visible_ms: Option<u64>,
    pub toast_fade_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub poller: PollerConfig,
    pub title: String,
    pub native: NativeMode,
    pub permission: Permission,
    pub conversation: Option<ConversationId>,
}

impl DaemonConfig {
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// CLI/env values win over the file; the file wins over built-in defaults.
    pub fn merge(cli: &Cli, file: FileConfig) -> anyhow::Result<Self> {
        let base_url = cli
            .base_url
            .clone()
            .or(file.base_url)
            .ok_or_else(|| anyhow!("no base url: pass --base-url or set INBOX_BASE_URL"))?;
        let base_url = Url::parse(&base_url).with_context(|| format!("invalid base url {base_url}"))?;
        if base_url.cannot_be_a_base() {
            bail!("base url {base_url} cannot carry paths");
        }

        let mut poller = PollerConfig::new(base_url);

        if let Some(secs) = cli.poll_secs.or(file.poll_secs) {
            if secs == 0 {
                bail!("poll interval must be at least one second");
            }
            poller.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = cli.request_timeout_secs.or(file.request_timeout_secs) {
            if secs == 0 {
                bail!("request timeout must be at least one second");
            }
            poller.request_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = file.unread_count_path {
            poller.unread_count_path = path;
        }
        if let Some(path) = file.notifications_path {
            poller.notifications_path = path;
        }
        if let Some(icon) = file.icon_path {
            poller.icon_path = (!icon.is_empty()).then_some(icon);
        }
        if let Some(ms) = file.toast_visible_ms {
            poller.toast_visible_for = Duration::from_millis(ms);
        }
        if let Some(ms) = file.toast_fade_ms {
            poller.toast_fade_for = Duration::from_millis(ms);
        }

        let native = cli.native.or(file.native).unwrap_or(NativeMode::Desktop);
        let permission = match native {
            NativeMode::Off => Permission::Unsupported,
            _ => cli
                .permission
                .or(file.permission)
                .map(Permission::from)
                .unwrap_or_default(),
        };

        Ok(Self {
            poller,
            title: cli
                .title
                .clone()
                .or(file.title)
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            native,
            permission,
            conversation: cli
                .conversation
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(ConversationId::new),
        })
    }
}
