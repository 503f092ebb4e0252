//! WebSocket handler
//!
//! Upgrades `/ws`, then runs one receive loop per connection that feeds a
//! [`ProtocolHandler`], alongside a writer task that drains the outbound
//! queue, sends keepalive pings and closes the socket on shutdown.

use crate::connection::{ConnectionHandle, OutboundReceiver};
use crate::handlers::ProtocolHandler;
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

/// WebSocket upgrade handler
pub async fn ws_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let (handle, outbound) = ConnectionHandle::channel();
    let mut handler = ProtocolHandler::new(state.clone(), handle);
    let conn_id = handler.conn_id().to_string();

    tracing::info!(conn_id = %conn_id, "WebSocket connection established");

    let (ws_sink, mut ws_stream) = socket.split();

    let mut send_task = tokio::spawn(write_loop(
        ws_sink,
        outbound,
        state.config().chat.keepalive_interval(),
        state.shutdown_receiver(),
        conn_id.clone(),
    ));

    loop {
        tokio::select! {
            msg = ws_stream.next() => match msg {
                Some(Ok(Message::Text(text))) => handler.handle_text(&text).await,
                Some(Ok(Message::Binary(data))) => handler.handle_binary(data.len()),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    // Pong replies are handled by axum
                    tracing::trace!(conn_id = %conn_id, "Control frame received");
                }
                Some(Ok(Message::Close(_))) => {
                    tracing::info!(conn_id = %conn_id, "Client closed connection");
                    break;
                }
                Some(Err(e)) => {
                    tracing::warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
                None => break,
            },
            _ = &mut send_task => {
                tracing::debug!(conn_id = %conn_id, "Send task ended");
                break;
            }
        }
    }

    handler.disconnect().await;
    send_task.abort();

    tracing::info!(conn_id = %conn_id, "WebSocket connection closed");
}

/// Drain queued frames into the socket
///
/// Ends when the queue closes, a send or keepalive ping fails, or shutdown
/// is signalled (after sending a close frame).
async fn write_loop(
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut outbound: OutboundReceiver,
    keepalive: Duration,
    mut shutdown: watch::Receiver<bool>,
    conn_id: String,
) {
    let mut ping = time::interval_at(Instant::now() + keepalive, keepalive);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if *shutdown.borrow() {
        send_going_away(&mut ws_sink, &conn_id).await;
        return;
    }

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                if let Err(e) = ws_sink.send(Message::Text(frame.to_string())).await {
                    tracing::warn!(conn_id = %conn_id, error = %e, "Failed to send frame");
                    break;
                }
            }
            _ = ping.tick() => {
                if let Err(e) = ws_sink.send(Message::Ping(Vec::new())).await {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Keepalive ping failed");
                    break;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    send_going_away(&mut ws_sink, &conn_id).await;
                    break;
                }
            }
        }
    }
}

async fn send_going_away(ws_sink: &mut SplitSink<WebSocket, Message>, conn_id: &str) {
    let close = Message::Close(Some(CloseFrame {
        code: close_code::AWAY,
        reason: "server shutting down".into(),
    }));
    if let Err(e) = ws_sink.send(close).await {
        tracing::debug!(conn_id = %conn_id, error = %e, "Failed to send close frame");
    }
}
