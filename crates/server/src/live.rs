//! `/ws/sensor-stream` (§4.8, §5): subscribes to the Store and forwards every
//! ingested Sample to the client. Send and receive run as separate tasks so
//! a slow client never blocks ingest; the subscriber's own bounded queue
//! absorbs backpressure (drops the oldest queued sample for that client
//! only — see `pump_store::Handle`).

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tracing::debug;

use crate::api::dto::SampleView;
use crate::state::AppState;

const SEND_DEADLINE: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct SensorUpdate {
    #[serde(rename = "type")]
    msg_type: &'static str,
    data: SampleView,
    history_length: usize,
}

pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let handle = state.telemetry.store.subscribe();

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    let send_task = tokio::spawn(async move {
        loop {
            let Some(sample) = handle.recv().await else { break };
            let history_length = state.telemetry.store.history().len();
            let payload = match serde_json::to_string(&SensorUpdate {
                msg_type: "sensor_update",
                data: SampleView::from(&sample),
                history_length,
            }) {
                Ok(p) => p,
                Err(_) => continue,
            };

            match tokio::time::timeout(SEND_DEADLINE, sender.send(Message::Text(payload.into()))).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => break,
                Err(_) => {
                    debug!("websocket send deadline exceeded, dropping this update");
                    continue;
                }
            }
        }
    });

    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }
}
