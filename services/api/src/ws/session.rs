//! Manages the WebSocket connection lifecycle for a simulation session.

use super::{
    driver::SessionDriver,
    protocol::{ClientMessage, ServerMessage},
};
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// Wires the socket to a [`SessionDriver`]: inbound text frames are parsed
/// into client messages and forwarded; the driver's outbound messages are
/// serialized back onto the socket. A connection is one session at a time,
/// restartable via a fresh `start` message.
#[instrument(name = "ws_session", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id: u32 = rand::random();
    tracing::Span::current().record("session_id", &session_id.to_string());
    info!("New WebSocket connection");

    let (mut socket_tx, mut socket_rx) = socket.split();

    let (client_tx, client_rx) = mpsc::channel::<ClientMessage>(16);
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(64);

    let driver = SessionDriver::new(state.store.clone(), state.store.clone(), out_tx);
    let driver_handle = tokio::spawn(async move {
        if let Err(e) = driver.run(client_rx).await {
            error!(error = ?e, "session driver terminated with error");
        }
    });

    loop {
        tokio::select! {
            frame = socket_rx.next() => {
                let Some(Ok(frame)) = frame else {
                    info!("Client disconnected");
                    break;
                };
                match frame {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(msg) => {
                            if client_tx.send(msg).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "malformed client message");
                            let reply = ServerMessage::Error {
                                message: format!("Malformed message: {e}"),
                            };
                            if send_msg(&mut socket_tx, reply).await.is_err() {
                                break;
                            }
                        }
                    },
                    Message::Close(_) => {
                        info!("Client closed connection");
                        break;
                    }
                    // Ping/pong are handled by axum; binary frames are ignored.
                    _ => {}
                }
            }
            msg = out_rx.recv() => {
                let Some(msg) = msg else {
                    // Driver gone; nothing more to forward.
                    break;
                };
                if send_msg(&mut socket_tx, msg).await.is_err() {
                    break;
                }
            }
        }
    }

    driver_handle.abort();
    info!("Session finished");
}

async fn send_msg(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(&msg).unwrap_or_else(|e| {
        error!(error = %e, "failed to serialize server message");
        r#"{"type":"error","message":"internal serialization error"}"#.to_string()
    });
    sink.send(Message::Text(payload.into())).await
}
