use super::messages::{parse_frame, SocketStatus};
use super::reconnect::{ReconnectPolicy, NORMAL_CLOSE};
use crate::models::InboundEvent;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

type EventHandler = Arc<dyn Fn(InboundEvent) + Send + Sync>;

/// How a single connection ended
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Local close requested (or the handle was dropped)
    Shutdown,
    /// Server sent a close frame; carries its code if any
    ServerClosed(Option<u16>),
    /// Transport error or stream ended without a close frame
    Dropped,
}

/// Reconnecting WebSocket connection that feeds inbound events to a handler.
pub struct SocketChannel {
    url: String,
    policy: ReconnectPolicy,
}

impl SocketChannel {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
        }
    }

    /// Start the connection loop. Parsed events are passed to `handler`
    /// in transport order; frames that fail to parse are logged and skipped.
    pub fn spawn<F>(self, handler: F) -> SocketHandle
    where
        F: Fn(InboundEvent) + Send + Sync + 'static,
    {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let (status_tx, status_rx) = watch::channel(SocketStatus::Connecting);
        let handler: EventHandler = Arc::new(handler);

        let task = tokio::spawn(run(self.url, self.policy, handler, shutdown_rx, status_tx));

        SocketHandle {
            shutdown_tx,
            status: status_rx,
            task,
        }
    }
}

/// Owner of a running socket channel. Dropping it closes the connection.
pub struct SocketHandle {
    shutdown_tx: broadcast::Sender<()>,
    status: watch::Receiver<SocketStatus>,
    task: JoinHandle<()>,
}

impl SocketHandle {
    pub fn status(&self) -> watch::Receiver<SocketStatus> {
        self.status.clone()
    }

    pub fn current_status(&self) -> SocketStatus {
        self.status.borrow().clone()
    }

    /// Request a normal (1000) close; no reconnect follows.
    pub fn close(&self) {
        info!("Initiating graceful disconnect");
        let _ = self.shutdown_tx.send(());
    }

    /// Close and wait for the connection loop to finish.
    pub async fn shutdown(self) {
        self.close();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Socket task ended abnormally");
        }
    }

    /// Wait until the loop stops on its own (normal close or retries exhausted).
    pub async fn finished(self) {
        let SocketHandle { task, shutdown_tx, .. } = self;
        if let Err(e) = task.await {
            warn!(error = %e, "Socket task ended abnormally");
        }
        drop(shutdown_tx);
    }
}

async fn run(
    url: String,
    policy: ReconnectPolicy,
    handler: EventHandler,
    mut shutdown_rx: broadcast::Receiver<()>,
    status_tx: watch::Sender<SocketStatus>,
) {
    let mut retries: u32 = 0;

    loop {
        // Check for shutdown before attempting connection
        if !matches!(
            shutdown_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ) {
            info!("Shutdown signal received, stopping reconnection");
            break;
        }

        info!(url = %url, attempt = retries, "Connecting to socket channel");

        let connected = tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received while connecting");
                break;
            }
            result = connect_async(&url) => result,
        };

        match connected {
            Ok((ws_stream, _)) => {
                info!(url = %url, "Socket channel connected");
                retries = 0;
                let _ = status_tx.send(SocketStatus::Connected);

                match run_session(ws_stream, &handler, &mut shutdown_rx).await {
                    SessionEnd::Shutdown => break,
                    SessionEnd::ServerClosed(code) if !ReconnectPolicy::should_reconnect(code) => {
                        info!("Server closed the connection normally");
                        break;
                    }
                    SessionEnd::ServerClosed(code) => {
                        warn!(code = ?code, "Server closed the connection abnormally");
                    }
                    SessionEnd::Dropped => {
                        warn!("Socket connection dropped");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, url = %url, "Failed to connect to socket channel");
            }
        }

        retries += 1;
        let Some(delay) = policy.delay_for(retries) else {
            warn!(retries = retries - 1, "Reconnect attempts exhausted, live updates stopped");
            let _ = status_tx.send(SocketStatus::GaveUp);
            return;
        };

        info!(delay_ms = delay.as_millis() as u64, attempt = retries, "Reconnecting");
        let _ = status_tx.send(SocketStatus::Reconnecting {
            attempt: retries,
            delay,
        });

        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, cancelling reconnect");
                break;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    let _ = status_tx.send(SocketStatus::Closed);
    info!("Socket channel closed");
}

async fn run_session<S>(
    ws_stream: tokio_tungstenite::WebSocketStream<S>,
    handler: &EventHandler,
    shutdown_rx: &mut broadcast::Receiver<()>,
) -> SessionEnd
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, closing connection gracefully");
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "client shutdown".into(),
                };
                if let Err(e) = ws_write.send(Message::Close(Some(frame))).await {
                    warn!(error = %e, "Failed to send close frame");
                }
                return SessionEnd::Shutdown;
            }
            msg = ws_read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => dispatch(&text, handler),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => dispatch(text, handler),
                        Err(e) => warn!(error = %e, "Discarding non-UTF-8 binary frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        let code = frame.map(|f| u16::from(f.code));
                        debug!(code = ?code, normal = code == Some(NORMAL_CLOSE), "Received close frame");
                        return SessionEnd::ServerClosed(code);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(error = %e, "Socket channel error");
                        return SessionEnd::Dropped;
                    }
                    None => return SessionEnd::Dropped,
                }
            }
        }
    }
}

fn dispatch(text: &str, handler: &EventHandler) {
    match parse_frame(text) {
        Ok(event) => {
            debug!(user_id = %event.user_id, "Inbound event");
            handler(event);
        }
        Err(e) => {
            let preview: String = text.chars().take(100).collect();
            error!(error = %e, preview = %preview, "Error parsing socket frame");
        }
    }
}
