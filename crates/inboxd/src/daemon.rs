use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use inbox_poller::{HttpMessagingApi, NotificationPoller, PollerHandle, Surfaces, SystemClock};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::config::DaemonConfig;
use crate::protocol::{InCmd, OutMsg, PROTOCOL_VERSION, out_error};
use crate::surfaces::{HostTitle, HostToasts, NativeNotifications, Outbox};

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

async fn stdout_writer(mut rx: mpsc::UnboundedReceiver<OutMsg>) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(msg) = rx.recv().await {
        let line = serde_json::to_string(&msg).context("encode out msg")?;
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}

/// Host-facing state the command loop touches directly.
struct Session {
    poller: PollerHandle,
    title: Arc<HostTitle>,
    toasts: Arc<HostToasts>,
    notifications: Arc<NativeNotifications>,
    out: Outbox,
}

enum Flow {
    Continue,
    Stop,
}

impl Session {
    async fn apply(&self, cmd: InCmd) -> Flow {
        let delivered = match cmd {
            InCmd::Focus => {
                self.title.set_focused(true);
                self.poller.focus_changed(true).await
            }
            InCmd::Blur => {
                self.title.set_focused(false);
                self.poller.focus_changed(false).await
            }
            InCmd::OpenConversation { id } => self.poller.open_conversation(id).await,
            InCmd::CloseConversation => self.poller.close_conversation().await,
            InCmd::CheckNow => self.poller.check_now().await,
            InCmd::DismissToast => self.poller.dismiss_toast().await,
            InCmd::OpenToast => {
                let Some(toast) = self.toasts.current() else {
                    self.out
                        .send(out_error("no_toast", "no toast is showing"))
                        .ok();
                    return Flow::Continue;
                };
                self.out
                    .send(OutMsg::Navigate {
                        conversation_id: toast.conversation_id,
                        url: toast.view_url,
                    })
                    .ok();
                self.poller.dismiss_toast().await
            }
            InCmd::SetPermission { permission } => {
                self.notifications.set_permission(permission);
                true
            }
            InCmd::SetTitle { title } => {
                self.title.replace(title);
                true
            }
            InCmd::Shutdown => return Flow::Stop,
        };

        if delivered {
            Flow::Continue
        } else {
            tracing::error!("poller task is gone");
            Flow::Stop
        }
    }
}

pub async fn daemon_main(config: DaemonConfig) -> anyhow::Result<()> {
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutMsg>();
    let writer = tokio::spawn(async move {
        if let Err(err) = stdout_writer(out_rx).await {
            tracing::error!(error = %err, "stdout writer failed");
        }
    });

    let title = Arc::new(HostTitle::new(config.title.clone(), out_tx.clone()));
    let toasts = Arc::new(HostToasts::new(out_tx.clone()));
    let notifications = Arc::new(NativeNotifications::for_mode(
        config.native,
        config.permission,
        out_tx.clone(),
    ));
    let surfaces = Surfaces {
        notifications: notifications.clone(),
        title: title.clone(),
        toasts: toasts.clone(),
        clock: Arc::new(SystemClock),
    };

    let api = HttpMessagingApi::new(&config.poller).context("build http client")?;
    let mut poller = NotificationPoller::new(config.poller.clone(), api, surfaces);
    poller.set_active_conversation(config.conversation.clone());

    out_tx
        .send(OutMsg::Ready {
            protocol_version: PROTOCOL_VERSION,
            base_url: config.poller.base_url.to_string(),
            poll_interval_secs: config.poller.poll_interval.as_secs(),
        })
        .ok();
    let (handle, task) = poller.spawn();

    // stdin command reader
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<InCmd>();
    let reader_out = out_tx.clone();
    tokio::spawn(async move {
        let stdin = tokio::io::stdin();
        let mut lines = tokio::io::BufReader::new(stdin).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<InCmd>(trimmed) {
                Ok(cmd) => {
                    cmd_tx.send(cmd).ok();
                }
                Err(err) => {
                    tracing::warn!(%err, line = trimmed, "invalid cmd json");
                    reader_out.send(out_error("bad_cmd", err.to_string())).ok();
                }
            }
        }
    });

    let session = Session {
        poller: handle,
        title,
        toasts,
        notifications,
        out: out_tx,
    };

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    tracing::info!("stdin closed; shutting down");
                    break;
                };
                tracing::debug!(?cmd, "host command");
                if let Flow::Stop = session.apply(cmd).await {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted; shutting down");
                break;
            }
        }
    }

    session.poller.shutdown().await;
    if let Err(err) = task.await {
        tracing::error!(error = %err, "poller task failed");
    }

    drop(session);
    // Desktop notices waiting on a click may hold the outbox open.
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        tracing::debug!("stdout writer still busy at exit");
    }
    Ok(())
}
