#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use inbox_poller::{
    ApiError, Clock, ConversationId, ConversationNotification, MessagingApi, NativeNotice,
    NotificationPoller, NotificationSink, Permission, PollerConfig, Surfaces, TitleSink, Toast,
    ToastSink,
};
use url::Url;

pub fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("test timestamp")
}

pub fn conversation(id: &str, at: DateTime<Utc>) -> ConversationNotification {
    ConversationNotification {
        id: ConversationId::new(id),
        name: format!("Room {id}"),
        sender_name: "Ada".to_string(),
        last_message_preview: "are we still on for 3pm?".to_string(),
        timestamp: at.to_rfc3339(),
    }
}

#[derive(Default)]
struct FakeApiState {
    unread: Mutex<Option<u64>>,
    conversations: Mutex<Option<Vec<ConversationNotification>>>,
    count_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

/// Scripted server. `None` for either endpoint answers with `status: "error"`.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<FakeApiState>,
}

impl FakeApi {
    pub fn set_unread(&self, unread: Option<u64>) {
        *self.state.unread.lock().unwrap() = unread;
    }

    pub fn set_conversations(&self, list: Option<Vec<ConversationNotification>>) {
        *self.state.conversations.lock().unwrap() = list;
    }

    pub fn count_calls(&self) -> usize {
        self.state.count_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.state.detail_calls.load(Ordering::SeqCst)
    }
}

impl MessagingApi for FakeApi {
    async fn unread_count(&self) -> Result<u64, ApiError> {
        self.state.count_calls.fetch_add(1, Ordering::SeqCst);
        let unread = *self.state.unread.lock().unwrap();
        unread.ok_or_else(|| ApiError::ServerStatus("error".to_string()))
    }

    async fn unread_conversations(&self) -> Result<Vec<ConversationNotification>, ApiError> {
        self.state.detail_calls.fetch_add(1, Ordering::SeqCst);
        let list = self.state.conversations.lock().unwrap().clone();
        list.ok_or_else(|| ApiError::ServerStatus("error".to_string()))
    }
}

pub struct RecordingNotifications {
    permission: Mutex<Permission>,
    /// What a permission prompt resolves to, if it resolves synchronously.
    answer: Mutex<Option<Permission>>,
    requests: AtomicUsize,
    shown: Mutex<Vec<NativeNotice>>,
}

impl RecordingNotifications {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission: Mutex::new(permission),
            answer: Mutex::new(None),
            requests: AtomicUsize::new(0),
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn answer_prompts_with(&self, answer: Permission) {
        *self.answer.lock().unwrap() = Some(answer);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn shown(&self) -> Vec<NativeNotice> {
        self.shown.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifications {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    fn request_permission(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(answer) = *self.answer.lock().unwrap() {
            *self.permission.lock().unwrap() = answer;
        }
    }

    fn show(&self, notice: NativeNotice) {
        self.shown.lock().unwrap().push(notice);
    }
}

pub struct RecordingTitle {
    title: Mutex<String>,
    focused: AtomicBool,
    writes: AtomicUsize,
}

impl RecordingTitle {
    pub fn new(title: &str) -> Self {
        Self {
            title: Mutex::new(title.to_string()),
            focused: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    pub fn current(&self) -> String {
        self.title.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl TitleSink for RecordingTitle {
    fn title(&self) -> String {
        self.current()
    }

    fn set_title(&self, title: &str) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.title.lock().unwrap() = title.to_string();
    }

    fn has_focus(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ToastEvent {
    Shown(Toast),
    Fading(u64),
    Removed(u64),
}

#[derive(Default)]
pub struct RecordingToasts {
    events: Mutex<Vec<ToastEvent>>,
}

impl RecordingToasts {
    pub fn events(&self) -> Vec<ToastEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn shown(&self) -> Vec<Toast> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ToastEvent::Shown(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl ToastSink for RecordingToasts {
    fn show(&self, toast: &Toast) {
        self.events
            .lock()
            .unwrap()
            .push(ToastEvent::Shown(toast.clone()));
    }

    fn fade(&self, id: u64) {
        self.events.lock().unwrap().push(ToastEvent::Fading(id));
    }

    fn remove(&self, id: u64) {
        self.events.lock().unwrap().push(ToastEvent::Removed(id));
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct Harness {
    pub api: FakeApi,
    pub notifications: Arc<RecordingNotifications>,
    pub title: Arc<RecordingTitle>,
    pub toasts: Arc<RecordingToasts>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            api: FakeApi::default(),
            notifications: Arc::new(RecordingNotifications::new(Permission::Granted)),
            title: Arc::new(RecordingTitle::new("Inbox")),
            toasts: Arc::new(RecordingToasts::default()),
            clock: Arc::new(ManualClock::new(start)),
        }
    }

    pub fn config() -> PollerConfig {
        PollerConfig::new(Url::parse("https://rooms.example.org/").unwrap())
    }

    pub fn surfaces(&self) -> Surfaces {
        Surfaces {
            notifications: self.notifications.clone(),
            title: self.title.clone(),
            toasts: self.toasts.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn poller(&self) -> NotificationPoller<FakeApi> {
        self.poller_with(Self::config())
    }

    pub fn poller_with(&self, config: PollerConfig) -> NotificationPoller<FakeApi> {
        NotificationPoller::new(config, self.api.clone(), self.surfaces())
    }
}
