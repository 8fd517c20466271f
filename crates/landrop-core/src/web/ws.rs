//! The live connection endpoint.
//!
//! Each WebSocket connection is one peer session: an unbounded event queue
//! feeds a writer task that serializes [`PeerEvent`](crate::protocol::PeerEvent)s
//! into text frames, while the read half only watches for closure. Peers are
//! not expected to send structured commands; inbound text is logged and
//! ignored.
//!
//! The transport reporting closure (clean close, error, or the writer dying)
//! is the only cancellation signal; every exit path funnels into a single
//! `on_disconnect` call per connection.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};

use crate::presence::PeerChannel;

use super::state::SharedState;

/// GET /ws - Upgrade to a live peer connection.
pub async fn ws_handler(State(state): State<SharedState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Drive one peer connection from registration to disconnect.
async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (channel, mut events) = PeerChannel::open();

    let id = state.dispatcher.on_connect(channel).await;
    tracing::info!("peer {id} connected");

    let mut writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let frame = match event.to_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!("failed to encode event: {e}");
                    continue;
                }
            };
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!("ignoring message from {id}: {text}");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("connection error for {id}: {e}");
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    writer.abort();
    state.dispatcher.on_disconnect(&id).await;
    tracing::info!("peer {id} disconnected");
}
