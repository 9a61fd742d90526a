//! WebSocket print job protocol
//!
//! One JSON job per text frame in, one [`PrintResult`] per job out.
//! Jobs on a connection run strictly in arrival order; separate
//! connections run concurrently as separate tasks.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::{
        ConnectInfo, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use shared::PrintResult;
use tracing::{Instrument, info, info_span, warn};

use crate::core::AppState;
use crate::printing::JobError;

/// Keepalive ping interval
const PING_INTERVAL_SECS: u64 = 30;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(upgrade))
        .route("/ws", get(upgrade))
}

async fn upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, remote_addr, state))
}

/// Run one client session until close, error or server shutdown
async fn run_session(socket: WebSocket, remote_addr: SocketAddr, state: AppState) {
    let guard = state.clients.register(remote_addr);
    let span = info_span!("client", id = %guard.id(), %remote_addr);

    async {
        info!(clients = state.clients.count(), "Client connected");

        let (mut sink, mut stream) = socket.split();
        let shutdown = guard.shutdown_token().clone();

        let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
        ping_interval.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    let _ = sink
                        .send(Message::Close(Some(CloseFrame {
                            code: close_code::AWAY,
                            reason: Utf8Bytes::from_static("Server shutting down"),
                        })))
                        .await;
                    info!("Session closed by server shutdown");
                    break;
                }

                _ = ping_interval.tick() => {
                    if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                        warn!("Ping failed, disconnecting");
                        break;
                    }
                }

                msg = stream.next() => {
                    let result = match msg {
                        Some(Ok(Message::Text(text))) => {
                            state.processor.process_text(text.as_str()).await
                        }
                        Some(Ok(Message::Binary(_))) => state.processor.reject(JobError::InvalidFormat),
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Client closed connection");
                            break;
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                        // Ping replies are sent by the socket itself
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                    };

                    if send_result(&mut sink, &result).await.is_err() {
                        warn!("Failed to send result, disconnecting");
                        break;
                    }
                }
            }
        }

        drop(guard);
        info!(clients = state.clients.count(), "Client disconnected");
    }
    .instrument(span)
    .await
}

async fn send_result(
    sink: &mut SplitSink<WebSocket, Message>,
    result: &PrintResult,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(result).map_err(axum::Error::new)?;
    sink.send(Message::Text(json.into())).await
}
