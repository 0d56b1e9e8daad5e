use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::live::LiveHub;

/// Spectator feed for one competition. Inbound frames are ignored.
pub async fn watch_competition(
    ws: WebSocketUpgrade,
    State(hub): State<LiveHub>,
    Path(competition_id): Path<Uuid>,
) -> Response {
    ws.on_upgrade(move |socket| stream_updates(socket, hub, competition_id))
}

async fn stream_updates(socket: WebSocket, hub: LiveHub, competition_id: Uuid) {
    let mut updates = hub.subscribe(competition_id);
    let (mut sender, mut receiver) = socket.split();

    tracing::info!(
        %competition_id,
        spectators = hub.subscriber_count(competition_id),
        "Spectator connected"
    );

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(message) => {
                    let text = match serde_json::to_string(&message) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!("Failed to serialize live update: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%competition_id, skipped, "Spectator lagged behind, skipping updates");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!(%competition_id, "Spectator disconnected");
}
