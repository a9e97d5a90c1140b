//! WebSocket upgrade handler and per-connection socket task.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use chatdesk_core::error::AppError;
use chatdesk_realtime::connection::{ConnectionHandle, ConnectionIdentity};
use chatdesk_realtime::message::types::{InboundFrame, OutboundFrame};

use crate::error::ApiError;
use crate::state::AppState;

/// How long the writer gets to flush and send a close frame.
const WRITER_GRACE: Duration = Duration::from_secs(5);

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Bearer credential; falls back to the `Authorization` header.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_from_headers(&headers))
        .ok_or_else(|| AppError::authentication("Missing token"))?;

    // Authenticate before upgrade
    let identity = state.authenticator.authenticate(&token)?;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, identity, socket)))
}

fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, identity: ConnectionIdentity, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.realtime.connect(identity);
    let conn_id = handle.id;
    let cancel = handle.cancellation();
    let ping_every = state.realtime.connections.ping_interval();

    info!(
        conn_id = %conn_id,
        user_id = %handle.user_id,
        "WebSocket connection established"
    );

    // Outbound forwarder. On close request it flushes what is already
    // queued (e.g. a FORCE_LOGOUT notice) and sends a close frame.
    let writer_cancel = cancel.clone();
    let mut writer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ping_every);
        ticker.tick().await;
        loop {
            tokio::select! {
                biased;
                next = outbound_rx.recv() => match next {
                    Some(text) => {
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                _ = writer_cancel.cancelled() => {
                    while let Ok(text) = outbound_rx.try_recv() {
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
                _ = ticker.tick() => {
                    let ping = OutboundFrame::Ping { at: Utc::now() };
                    if let Ok(text) = ping.to_text() {
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });

    // Inbound loop
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = ws_rx.next() => match next {
                Some(Ok(Message::Text(text))) => handle_inbound(&state, &handle, text.as_str()),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    // Cleanup
    handle.close();
    state.realtime.disconnect(&conn_id);
    if tokio::time::timeout(WRITER_GRACE, &mut writer).await.is_err() {
        writer.abort();
    }

    info!(
        conn_id = %conn_id,
        user_id = %handle.user_id,
        connected_secs = (Utc::now() - handle.connected_at).num_seconds(),
        "WebSocket connection closed"
    );
}

fn handle_inbound(state: &AppState, handle: &ConnectionHandle, text: &str) {
    match serde_json::from_str::<InboundFrame>(text) {
        Ok(InboundFrame::Pong) => {}
        Ok(InboundFrame::Ping) => {
            state
                .realtime
                .connections
                .send_to(handle, &OutboundFrame::Ping { at: Utc::now() });
        }
        Err(e) => {
            debug!(conn_id = %handle.id, error = %e, "Unrecognised inbound frame");
            state.realtime.connections.send_to(
                handle,
                &OutboundFrame::Error {
                    code: "bad_frame".to_string(),
                    message: "Unrecognised frame".to_string(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_from_headers(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic zzz"));
        assert_eq!(bearer_from_headers(&headers), None);
    }
}
