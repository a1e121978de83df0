use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::MessagingApi;
use crate::config::{NATIVE_NOTIFICATION_TITLE, PollerConfig};
use crate::models::{ConversationId, ConversationNotification};
use crate::sinks::{NativeNotice, Permission, Surfaces};
use crate::title;
use crate::toast::{Toast, ToastController, ToastTimer};

const CONTROL_CHANNEL_CAPACITY: usize = 64;

/// Per-session poller state. Lives as long as the poller; nothing persists.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PollState {
    /// Watermark: nothing at or before this instant is surfaced.
    pub last_notification_check: DateTime<Utc>,
    pub unread_count: u64,
    /// Set while the user has a conversation open; suppresses polling.
    pub active_conversation: Option<ConversationId>,
}

impl PollState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_notification_check: now,
            unread_count: 0,
            active_conversation: None,
        }
    }

    fn advance_watermark(&mut self, to: DateTime<Utc>) {
        if to > self.last_notification_check {
            self.last_notification_check = to;
        }
    }
}

/// What a single poll cycle ended up doing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CycleOutcome {
    SkippedActiveConversation,
    CountFailed,
    NoUnread,
    DetailsFailed,
    NothingNew,
    Surfaced(ConversationId),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PollerControl {
    FocusChanged(bool),
    OpenConversation(ConversationId),
    CloseConversation,
    CheckNow,
    DismissToast,
    Shutdown,
}

pub struct NotificationPoller<A> {
    config: PollerConfig,
    api: A,
    surfaces: Surfaces,
    state: PollState,
    toasts: ToastController,
    toast_timers: mpsc::UnboundedReceiver<ToastTimer>,
}

impl<A: MessagingApi> NotificationPoller<A> {
    pub fn new(config: PollerConfig, api: A, surfaces: Surfaces) -> Self {
        let state = PollState::new(surfaces.clock.now());
        let (toasts, toast_timers) = ToastController::new(
            surfaces.toasts.clone(),
            config.toast_visible_for,
            config.toast_fade_for,
        );
        Self {
            config,
            api,
            surfaces,
            state,
            toasts,
            toast_timers,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn set_active_conversation(&mut self, id: Option<ConversationId>) {
        self.state.active_conversation = id;
    }

    /// One poll cycle: count first, details only after a positive count.
    pub async fn check_unread(&mut self) -> CycleOutcome {
        if let Some(id) = &self.state.active_conversation {
            tracing::debug!(conversation = %id, "conversation open; skipping unread poll");
            return CycleOutcome::SkippedActiveConversation;
        }

        let count = match self.api.unread_count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(%e, "error checking for new messages");
                return CycleOutcome::CountFailed;
            }
        };

        self.state.unread_count = count;
        self.refresh_title();

        if count == 0 {
            return CycleOutcome::NoUnread;
        }
        self.check_notification_details().await
    }

    pub async fn check_notification_details(&mut self) -> CycleOutcome {
        let conversations = match self.api.unread_conversations().await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(%e, "error checking for notifications");
                return CycleOutcome::DetailsFailed;
            }
        };

        let Some(latest) = conversations.into_iter().next() else {
            return CycleOutcome::NothingNew;
        };
        let Some(sent_at) = latest.timestamp_utc() else {
            tracing::warn!(
                conversation = %latest.id,
                timestamp = %latest.timestamp,
                "unparseable notification timestamp"
            );
            return CycleOutcome::NothingNew;
        };
        if sent_at <= self.state.last_notification_check {
            return CycleOutcome::NothingNew;
        }

        self.surface(&latest);
        // Our clock, not the message's: a future-dated entry must not push
        // the watermark past messages that arrive later.
        let now = self.surfaces.clock.now();
        self.state.advance_watermark(now);
        CycleOutcome::Surfaced(latest.id)
    }

    /// Native notice (permission allowing) plus the in-page toast.
    pub fn surface(&mut self, conversation: &ConversationNotification) {
        let target_url = self.config.conversation_url(&conversation.id);
        let notifications = &self.surfaces.notifications;

        if notifications.permission() == Permission::Default {
            notifications.request_permission();
        }
        match notifications.permission() {
            Permission::Granted => {
                tracing::info!(conversation = %conversation.id, "showing native notification");
                notifications.show(NativeNotice {
                    title: NATIVE_NOTIFICATION_TITLE.to_string(),
                    body: conversation.summary_line(),
                    icon: self.config.icon_url(),
                    conversation_id: conversation.id.clone(),
                    target_url: target_url.clone(),
                });
            }
            permission => {
                tracing::debug!(?permission, "native notification not permitted");
            }
        }

        let id = self.toasts.next_id();
        let toast = Toast::for_conversation(id, conversation, target_url, self.surfaces.clock.now());
        self.toasts.show(toast);
    }

    pub fn refresh_title(&self) {
        let sink = &self.surfaces.title;
        let current = sink.title();
        let next = title::annotate(&current, self.state.unread_count, sink.has_focus());
        if next != current {
            sink.set_title(&next);
        }
    }

    pub fn handle_focus(&self, focused: bool) {
        if !focused {
            return;
        }
        let sink = &self.surfaces.title;
        let current = sink.title();
        let stripped = title::strip_annotation(&current);
        if stripped != current {
            sink.set_title(stripped);
        }
    }

    pub fn dismiss_toast(&mut self) {
        self.toasts.close();
    }

    pub fn on_toast_timer(&mut self, timer: ToastTimer) {
        self.toasts.on_timer(timer);
    }

    /// Drive the poller until `Shutdown` or until every control sender is gone.
    /// The first cycle runs immediately.
    pub async fn run(mut self, mut control: mpsc::Receiver<PollerControl>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.refresh_title();
        tracing::info!(
            interval_secs = self.config.poll_interval.as_secs(),
            base_url = %self.config.base_url,
            "unread poller started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.check_unread().await;
                    tracing::debug!(?outcome, unread = self.state.unread_count, "poll cycle finished");
                }
                Some(timer) = self.toast_timers.recv() => self.on_toast_timer(timer),
                msg = control.recv() => match msg {
                    None | Some(PollerControl::Shutdown) => break,
                    Some(msg) => self.handle_control(msg).await,
                },
            }
        }

        tracing::info!("unread poller stopped");
    }

    async fn handle_control(&mut self, msg: PollerControl) {
        match msg {
            PollerControl::FocusChanged(focused) => self.handle_focus(focused),
            PollerControl::OpenConversation(id) => {
                tracing::debug!(conversation = %id, "conversation opened");
                self.set_active_conversation(Some(id));
            }
            PollerControl::CloseConversation => self.set_active_conversation(None),
            PollerControl::CheckNow => {
                let outcome = self.check_unread().await;
                tracing::debug!(?outcome, "manual poll finished");
            }
            PollerControl::DismissToast => self.dismiss_toast(),
            PollerControl::Shutdown => {}
        }
    }
}

impl<A: MessagingApi + 'static> NotificationPoller<A> {
    pub fn spawn(self) -> (PollerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
        let task = tokio::spawn(self.run(rx));
        (PollerHandle { tx }, task)
    }
}

/// Cheap, cloneable way to steer a spawned poller.
#[derive(Clone, Debug)]
pub struct PollerHandle {
    tx: mpsc::Sender<PollerControl>,
}

impl PollerHandle {
    pub async fn send(&self, msg: PollerControl) -> bool {
        self.tx.send(msg).await.is_ok()
    }

    pub async fn focus_changed(&self, focused: bool) -> bool {
        self.send(PollerControl::FocusChanged(focused)).await
    }

    pub async fn open_conversation(&self, id: ConversationId) -> bool {
        self.send(PollerControl::OpenConversation(id)).await
    }

    pub async fn close_conversation(&self) -> bool {
        self.send(PollerControl::CloseConversation).await
    }

    pub async fn check_now(&self) -> bool {
        self.send(PollerControl::CheckNow).await
    }

    pub async fn dismiss_toast(&self) -> bool {
        self.send(PollerControl::DismissToast).await
    }

    pub async fn shutdown(&self) -> bool {
        self.send(PollerControl::Shutdown).await
    }
}
