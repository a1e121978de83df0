// JSON-lines wire format between inboxd and its host. One object per line.

use inbox_poller::{ConversationId, NativeNotice, Permission, Toast};
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum InCmd {
    Focus,
    Blur,
    OpenConversation { id: ConversationId },
    CloseConversation,
    CheckNow,
    DismissToast,
    /// Host-side toast click: dismiss and navigate.
    OpenToast,
    SetPermission { permission: Permission },
    SetTitle { title: String },
    Shutdown,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutMsg {
    Ready {
        protocol_version: u32,
        base_url: String,
        poll_interval_secs: u64,
    },
    Title {
        title: String,
    },
    ToastShown {
        toast: Toast,
    },
    ToastFading {
        id: u64,
    },
    ToastRemoved {
        id: u64,
    },
    PermissionRequested,
    NativeNotification {
        notice: NativeNotice,
    },
    Navigate {
        conversation_id: ConversationId,
        url: String,
    },
    Error {
        code: String,
        message: String,
    },
}

pub fn out_error(code: &str, message: impl Into<String>) -> OutMsg {
    OutMsg::Error {
        code: code.to_string(),
        message: message.into(),
    }
}
