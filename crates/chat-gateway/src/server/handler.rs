//! WebSocket handler
//!
//! Runs the lifecycle of one socket: handshake, event loop, keepalive, and
//! disconnect cleanup.

use crate::connection::{Connection, Outbound};
use crate::events::{ClientEvent, ServerEvent, UserOfflineEvent};
use crate::handlers::{EventDispatcher, HandshakeHandler, PresenceHandler, TokenSources};
use crate::protocol::{CloseCode, ErrorCode, GatewayMessage, HandshakePayload};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use chat_service::{Identity, PresenceService};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, timeout, Instant};

/// How long a close frame may wait behind queued events
const CLOSE_WAIT: Duration = Duration::from_secs(1);

type WsSink = SplitSink<WebSocket, Message>;
type WsStream = SplitStream<WebSocket>;

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    sources: TokenSources,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, sources, socket))
}

/// Reason a handshake was refused
struct Rejection {
    code: ErrorCode,
    message: String,
    close: CloseCode,
}

impl Rejection {
    fn new(code: ErrorCode, message: impl Into<String>, close: CloseCode) -> Self {
        Self {
            code,
            message: message.into(),
            close,
        }
    }
}

/// Which connection task finished first
enum TaskEnd {
    Reader(Option<CloseCode>),
    Writer,
    Keepalive(Option<CloseCode>),
}

/// First meaningful frame of a socket
enum FirstFrame {
    Text(String),
    Other,
    Gone,
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, sources: TokenSources, socket: WebSocket) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    let identity = match accept_handshake(&state, &sources, &mut ws_stream).await {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            tracing::debug!("Socket closed before handshake");
            return;
        }
        Err(rejection) => {
            tracing::info!(
                code = %rejection.code,
                close_code = rejection.close.as_u16(),
                reason = %rejection.message,
                "Handshake rejected"
            );
            reject(&mut ws_sink, rejection).await;
            return;
        }
    };

    let (tx, rx) = mpsc::channel::<Outbound>(state.config().outbound_buffer.max(1));
    let connection = Connection::new(Connection::generate_id(), identity, tx);

    if let Err(e) = HandshakeHandler::establish(&state, &connection).await {
        tracing::error!(
            connection_id = %connection.id(),
            user_id = %connection.user_id(),
            error = %e,
            "Failed to establish connection"
        );
        reject(
            &mut ws_sink,
            Rejection::new(
                ErrorCode::InternalError,
                "Internal server error",
                CloseCode::UnknownError,
            ),
        )
        .await;
        return;
    }

    let mut writer = tokio::spawn(run_writer(ws_sink, rx, connection.id().to_string()));
    let mut reader = tokio::spawn(run_reader(state.clone(), connection.clone(), ws_stream));
    let mut keepalive = tokio::spawn(run_keepalive(
        connection.clone(),
        state.config().heartbeat_interval(),
        state.config().idle_timeout(),
    ));

    // Wait for any task to complete
    let ended = tokio::select! {
        result = &mut reader => TaskEnd::Reader(result.ok().flatten()),
        _ = &mut writer => TaskEnd::Writer,
        result = &mut keepalive => TaskEnd::Keepalive(result.ok()),
    };

    if !matches!(ended, TaskEnd::Reader(_)) {
        reader.abort();
        let _ = reader.await;
    }
    if !matches!(ended, TaskEnd::Keepalive(_)) {
        keepalive.abort();
        let _ = keepalive.await;
    }

    match ended {
        TaskEnd::Writer => {
            tracing::debug!(connection_id = %connection.id(), "Send task ended");
        }
        TaskEnd::Reader(close_code) | TaskEnd::Keepalive(close_code) => {
            let closed = match close_code {
                Some(code) => {
                    tracing::debug!(
                        connection_id = %connection.id(),
                        close_code = %code,
                        "Closing connection"
                    );
                    connection.close(code, CLOSE_WAIT).await.is_ok()
                        && timeout(CLOSE_WAIT, &mut writer).await.is_ok()
                }
                None => false,
            };
            if !closed {
                writer.abort();
                let _ = writer.await;
            }
        }
    }

    cleanup_connection(&state, &connection).await;
}

/// Wait for the handshake frame and authenticate it
///
/// `Ok(None)` means the peer went away first.
async fn accept_handshake(
    state: &GatewayState,
    sources: &TokenSources,
    stream: &mut WsStream,
) -> Result<Option<Identity>, Rejection> {
    let frame = timeout(state.config().handshake_timeout(), first_frame(stream))
        .await
        .map_err(|_| {
            Rejection::new(
                ErrorCode::AuthError,
                "Handshake timeout",
                CloseCode::SessionTimeout,
            )
        })?;

    let text = match frame {
        FirstFrame::Text(text) => text,
        FirstFrame::Other => {
            return Err(Rejection::new(
                ErrorCode::AuthError,
                "Handshake required",
                CloseCode::NotAuthenticated,
            ))
        }
        FirstFrame::Gone => return Ok(None),
    };

    let payload = GatewayMessage::from_json(&text)
        .ok()
        .filter(|m| m.event == ClientEvent::Handshake.as_str())
        .and_then(|m| match m.data {
            Value::Null => Some(HandshakePayload::default()),
            _ => m.decode_data::<HandshakePayload>().ok(),
        })
        .ok_or_else(|| {
            Rejection::new(
                ErrorCode::AuthError,
                "Handshake required",
                CloseCode::NotAuthenticated,
            )
        })?;

    HandshakeHandler::authenticate(state, &payload, sources)
        .await
        .map(Some)
        .map_err(|e| {
            Rejection::new(
                ErrorCode::AuthError,
                e.client_message(),
                e.to_close_code().unwrap_or(CloseCode::AuthenticationFailed),
            )
        })
}

async fn first_frame(stream: &mut WsStream) -> FirstFrame {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => return FirstFrame::Text(text),
            Ok(Message::Binary(_)) => return FirstFrame::Other,
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Ok(Message::Close(_)) | Err(_) => return FirstFrame::Gone,
        }
    }
    FirstFrame::Gone
}

/// Send an error event and a close frame on a socket that has no writer task yet
async fn reject(sink: &mut WsSink, rejection: Rejection) {
    if let Ok(json) = GatewayMessage::error(rejection.code, rejection.message).to_json() {
        let _ = sink.send(Message::Text(json)).await;
    }
    let _ = sink.send(close_message(rejection.close)).await;
    let _ = sink.close().await;
}

fn close_message(code: CloseCode) -> Message {
    let (code, reason) = GatewayMessage::close_frame(code);
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}

/// Drain the outbound queue into the socket
async fn run_writer(mut sink: WsSink, mut rx: mpsc::Receiver<Outbound>, connection_id: String) {
    while let Some(outbound) = rx.recv().await {
        let frame = match outbound {
            Outbound::Event(msg) => match msg.to_json() {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(connection_id = %connection_id, error = %e, "Failed to encode event");
                    continue;
                }
            },
            Outbound::Ping => Message::Ping(Vec::new()),
            Outbound::Close(code) => {
                let _ = sink.send(close_message(code)).await;
                break;
            }
        };

        if sink.send(frame).await.is_err() {
            tracing::warn!(connection_id = %connection_id, "Failed to send message to WebSocket");
            break;
        }
    }

    let _ = sink.close().await;
}

/// Process inbound frames strictly in order
///
/// Returns a close code when the socket failed.
async fn run_reader(
    state: GatewayState,
    connection: Arc<Connection>,
    mut stream: WsStream,
) -> Option<CloseCode> {
    while let Some(msg) = stream.next().await {
        connection.touch();

        match msg {
            Ok(Message::Text(text)) => handle_text_message(&state, &connection, &text).await,
            Ok(Message::Binary(_)) => reply(
                &connection,
                GatewayMessage::error(ErrorCode::BadRequest, "Binary frames are not supported"),
            ),
            Ok(Message::Ping(_)) => {
                tracing::trace!(connection_id = %connection.id(), "Ping received");
            }
            Ok(Message::Pong(_)) => {
                tracing::trace!(connection_id = %connection.id(), "Pong received");
                if let Err(e) = PresenceService::new(state.service_context())
                    .refresh(connection.user_id())
                    .await
                {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        error = %e,
                        "Failed to refresh presence"
                    );
                }
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection.id(), "Client closed connection");
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    error = %e,
                    "WebSocket error"
                );
                return Some(CloseCode::UnknownError);
            }
        }
    }
    None
}

/// Ping on every interval and give up after `idle_timeout` without inbound frames
async fn run_keepalive(
    connection: Arc<Connection>,
    heartbeat_interval: Duration,
    idle_timeout: Duration,
) -> CloseCode {
    let mut ticker = interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);

    loop {
        let deadline = connection.last_activity() + idle_timeout;

        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = connection.ping() {
                    tracing::debug!(connection_id = %connection.id(), error = %e, "Ping not queued");
                }
            }
            () = sleep_until(deadline) => {
                if connection.idle_for() >= idle_timeout {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        idle_ms = connection.idle_for().as_millis(),
                        "Connection timed out (no activity)"
                    );
                    return CloseCode::SessionTimeout;
                }
            }
        }
    }
}

/// Handle a text frame from the client
async fn handle_text_message(state: &GatewayState, connection: &Arc<Connection>, text: &str) {
    let message = match GatewayMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Failed to parse message"
            );
            reply(
                connection,
                GatewayMessage::error(ErrorCode::BadRequest, "Malformed frame"),
            );
            return;
        }
    };

    match EventDispatcher::dispatch(state, connection, &message).await {
        Ok(result) => {
            if let Some(id) = message.ack {
                reply(connection, GatewayMessage::ack(id, result));
            }
        }
        Err(e) => {
            let code = e.error_code();
            if code == ErrorCode::InternalError {
                tracing::error!(
                    connection_id = %connection.id(),
                    event = %message.event,
                    error = %e,
                    "Handler error"
                );
            } else {
                tracing::debug!(
                    connection_id = %connection.id(),
                    event = %message.event,
                    error = %e,
                    "Request rejected"
                );
            }
            reply(connection, GatewayMessage::error(code, e.client_message()));
        }
    }
}

fn reply(connection: &Connection, message: GatewayMessage) {
    if let Err(e) = connection.send(message) {
        tracing::warn!(connection_id = %connection.id(), error = %e, "Failed to queue reply");
    }
}

/// Clean up a connection on disconnect
///
/// The connection leaves the registry first so it never sees its own
/// `user:offline`.
async fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    let user_id = connection.user_id();
    tracing::info!(connection_id = %connection.id(), user_id = %user_id, "Cleaning up connection");

    state.connection_manager().remove_connection(connection.id());

    if !PresenceHandler::release(state, user_id).await {
        return;
    }

    state.connection_manager().broadcast(&GatewayMessage::event(
        ServerEvent::UserOffline,
        UserOfflineEvent {
            user_id: user_id.clone(),
        },
    ));
}
