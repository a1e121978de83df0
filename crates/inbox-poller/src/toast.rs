// In-page toast lifecycle: shown -> fading -> removed.
//
// Timers run as detached tokio tasks and report back through an unbounded
// channel. Each toast has its own id, so timers belonging to a replaced toast
// are recognised and ignored.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::models::{ConversationId, ConversationNotification};
use crate::sinks::ToastSink;
use crate::time::format_relative_time;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub conversation_id: ConversationId,
    /// Conversation name.
    pub title: String,
    pub sender: String,
    pub body: String,
    pub time_label: String,
    pub view_url: String,
}

impl Toast {
    pub fn for_conversation(
        id: u64,
        conversation: &ConversationNotification,
        view_url: String,
        now: DateTime<Utc>,
    ) -> Self {
        let time_label = conversation
            .timestamp_utc()
            .map(|ts| format_relative_time(ts, now))
            .unwrap_or_else(|| conversation.timestamp.clone());
        Self {
            id,
            conversation_id: conversation.id.clone(),
            title: conversation.name.clone(),
            sender: conversation.sender_name.clone(),
            body: conversation.last_message_preview.clone(),
            time_label,
            view_url,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ToastTimer {
    Expire { id: u64 },
    Remove { id: u64 },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ToastPhase {
    Shown,
    Fading,
}

pub struct ToastController {
    sink: Arc<dyn ToastSink>,
    visible_for: Duration,
    fade_for: Duration,
    next_id: u64,
    current: Option<(u64, ToastPhase)>,
    timers: mpsc::UnboundedSender<ToastTimer>,
}

impl ToastController {
    pub fn new(
        sink: Arc<dyn ToastSink>,
        visible_for: Duration,
        fade_for: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ToastTimer>) {
        let (timers, rx) = mpsc::unbounded_channel();
        let controller = Self {
            sink,
            visible_for,
            fade_for,
            next_id: 0,
            current: None,
            timers,
        };
        (controller, rx)
    }

    pub fn next_id(&mut self) -> u64 {
        self.next_id = self.next_id.saturating_add(1);
        self.next_id
    }

    pub fn current(&self) -> Option<(u64, ToastPhase)> {
        self.current
    }

    /// Replace whatever is on screen with `toast`.
    pub fn show(&mut self, toast: Toast) {
        if let Some((old, _)) = self.current.take() {
            self.sink.remove(old);
        }
        let id = toast.id;
        self.sink.show(&toast);
        self.current = Some((id, ToastPhase::Shown));
        self.schedule(self.visible_for, ToastTimer::Expire { id });
    }

    /// Explicit close from the user.
    pub fn close(&mut self) {
        if let Some((id, ToastPhase::Shown)) = self.current {
            self.begin_fade(id);
        }
    }

    pub fn on_timer(&mut self, timer: ToastTimer) {
        match (timer, self.current) {
            (ToastTimer::Expire { id }, Some((cur, ToastPhase::Shown))) if id == cur => {
                self.begin_fade(id);
            }
            (ToastTimer::Remove { id }, Some((cur, ToastPhase::Fading))) if id == cur => {
                self.sink.remove(id);
                self.current = None;
            }
            (timer, _) => {
                tracing::trace!(?timer, "stale toast timer");
            }
        }
    }

    fn begin_fade(&mut self, id: u64) {
        self.sink.fade(id);
        self.current = Some((id, ToastPhase::Fading));
        self.schedule(self.fade_for, ToastTimer::Remove { id });
    }

    fn schedule(&self, after: Duration, timer: ToastTimer) {
        let tx = self.timers.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(timer);
        });
    }
}
