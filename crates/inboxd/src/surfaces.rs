// Sink implementations for the sidecar. Everything the host renders goes out
// as an `OutMsg`; the only thing rendered locally is the desktop notification.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use inbox_poller::{NativeNotice, NotificationSink, Permission, TitleSink, Toast, ToastSink};
use tokio::sync::mpsc;

use crate::cli::NativeMode;
use crate::protocol::OutMsg;

pub type Outbox = mpsc::UnboundedSender<OutMsg>;

const APP_NAME: &str = "inboxd";
const DESKTOP_ICON: &str = "mail-message-new";

fn emit(out: &Outbox, msg: OutMsg) {
    if out.send(msg).is_err() {
        tracing::debug!("stdout writer gone; dropping event");
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct HostTitle {
    title: Mutex<String>,
    focused: AtomicBool,
    out: Outbox,
}

impl HostTitle {
    pub fn new(title: impl Into<String>, out: Outbox) -> Self {
        Self {
            title: Mutex::new(title.into()),
            focused: AtomicBool::new(false),
            out,
        }
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    /// The host changed its title; adopt it without echoing it back.
    pub fn replace(&self, title: String) {
        *lock(&self.title) = title;
    }
}

impl TitleSink for HostTitle {
    fn title(&self) -> String {
        lock(&self.title).clone()
    }

    fn set_title(&self, title: &str) {
        *lock(&self.title) = title.to_string();
        emit(
            &self.out,
            OutMsg::Title {
                title: title.to_string(),
            },
        );
    }

    fn has_focus(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }
}

pub struct HostToasts {
    current: Mutex<Option<Toast>>,
    out: Outbox,
}

impl HostToasts {
    pub fn new(out: Outbox) -> Self {
        Self {
            current: Mutex::new(None),
            out,
        }
    }

    pub fn current(&self) -> Option<Toast> {
        lock(&self.current).clone()
    }
}

impl ToastSink for HostToasts {
    fn show(&self, toast: &Toast) {
        *lock(&self.current) = Some(toast.clone());
        emit(
            &self.out,
            OutMsg::ToastShown {
                toast: toast.clone(),
            },
        );
    }

    fn fade(&self, id: u64) {
        emit(&self.out, OutMsg::ToastFading { id });
    }

    fn remove(&self, id: u64) {
        let mut current = lock(&self.current);
        if current.as_ref().is_some_and(|t| t.id == id) {
            *current = None;
        }
        drop(current);
        emit(&self.out, OutMsg::ToastRemoved { id });
    }
}

/// The host renders native notices itself and answers permission prompts
/// with `set_permission`.
pub struct HostNotifications {
    permission: Mutex<Permission>,
    out: Outbox,
}

impl HostNotifications {
    pub fn new(permission: Permission, out: Outbox) -> Self {
        Self {
            permission: Mutex::new(permission),
            out,
        }
    }

    fn set_permission(&self, permission: Permission) {
        *lock(&self.permission) = permission;
    }
}

impl NotificationSink for HostNotifications {
    fn permission(&self) -> Permission {
        *lock(&self.permission)
    }

    fn request_permission(&self) {
        emit(&self.out, OutMsg::PermissionRequested);
    }

    fn show(&self, notice: NativeNotice) {
        emit(&self.out, OutMsg::NativeNotification { notice });
    }
}

/// OS notification centre via notify-rust. There is no per-app prompt, so a
/// request resolves to granted unless the host already denied.
pub struct DesktopNotifications {
    permission: Mutex<Permission>,
    out: Outbox,
    present: Arc<Present>,
}

/// Renders one notice and blocks until the user answers it.
type Present = dyn Fn(&NativeNotice, &Outbox) + Send + Sync;

impl DesktopNotifications {
    pub fn new(permission: Permission, out: Outbox) -> Self {
        Self::with_presenter(permission, out, Arc::new(present_desktop))
    }

    fn with_presenter(permission: Permission, out: Outbox, present: Arc<Present>) -> Self {
        Self {
            permission: Mutex::new(permission),
            out,
            present,
        }
    }

    fn set_permission(&self, permission: Permission) {
        *lock(&self.permission) = permission;
    }
}

impl NotificationSink for DesktopNotifications {
    fn permission(&self) -> Permission {
        *lock(&self.permission)
    }

    fn request_permission(&self) {
        let mut permission = lock(&self.permission);
        if *permission == Permission::Default {
            *permission = Permission::Granted;
            tracing::info!("desktop notifications enabled");
        }
    }

    fn show(&self, notice: NativeNotice) {
        let out = self.out.clone();
        let present = self.present.clone();
        // Detached, not on the runtime's blocking pool: an unanswered notice
        // must not keep the process alive after shutdown.
        let spawned = std::thread::Builder::new()
            .name("inboxd-notice".to_string())
            .spawn(move || present(&notice, &out));
        if let Err(e) = spawned {
            tracing::warn!(%e, "failed to start desktop notification thread");
        }
    }
}

fn present_desktop(notice: &NativeNotice, out: &Outbox) {
    if let Err(e) = show_desktop(notice, out.clone()) {
        tracing::warn!(%e, conversation = %notice.conversation_id, "desktop notification failed");
    }
}

/// Blocks until the notification is closed or activated.
fn show_desktop(notice: &NativeNotice, out: Outbox) -> Result<(), notify_rust::error::Error> {
    let handle = notify_rust::Notification::new()
        .summary(&notice.title)
        .body(&notice.body)
        .appname(APP_NAME)
        .icon(DESKTOP_ICON)
        .action("default", "Open")
        .action("open", "Open conversation")
        .show()?;

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        let conversation_id = notice.conversation_id.clone();
        let url = notice.target_url.clone();
        handle.wait_for_action(move |action| {
            if matches!(action, "default" | "open") {
                emit(
                    &out,
                    OutMsg::Navigate {
                        conversation_id,
                        url,
                    },
                );
            }
        });
    }
    #[cfg(not(all(unix, not(target_os = "macos"))))]
    {
        let _ = (handle, out);
    }
    Ok(())
}

/// One of the `--native` modes.
pub enum NativeNotifications {
    Host(HostNotifications),
    Desktop(DesktopNotifications),
    /// `--native off`: toasts only.
    Off,
}

impl NativeNotifications {
    pub fn for_mode(mode: NativeMode, permission: Permission, out: Outbox) -> Self {
        match mode {
            NativeMode::Host => Self::Host(HostNotifications::new(permission, out)),
            NativeMode::Desktop => Self::Desktop(DesktopNotifications::new(permission, out)),
            NativeMode::Off => Self::Off,
        }
    }

    /// The host answered a prompt or the user changed the setting.
    pub fn set_permission(&self, permission: Permission) {
        match self {
            Self::Host(sink) => sink.set_permission(permission),
            Self::Desktop(sink) => sink.set_permission(permission),
            Self::Off => {
                tracing::debug!(?permission, "native notifications disabled; ignoring permission")
            }
        }
    }
}

impl NotificationSink for NativeNotifications {
    fn permission(&self) -> Permission {
        match self {
            Self::Host(sink) => sink.permission(),
            Self::Desktop(sink) => sink.permission(),
            Self::Off => Permission::Unsupported,
        }
    }

    fn request_permission(&self) {
        match self {
            Self::Host(sink) => sink.request_permission(),
            Self::Desktop(sink) => sink.request_permission(),
            Self::Off => {}
        }
    }

    fn show(&self, notice: NativeNotice) {
        match self {
            Self::Host(sink) => sink.show(notice),
            Self::Desktop(sink) => sink.show(notice),
            Self::Off => {
                tracing::debug!(conversation = %notice.conversation_id, "native notifications disabled")
            }
        }
    }
}
