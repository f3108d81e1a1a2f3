use crate::{
    session::Command,
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Outbound messages buffered per connection before new ones are dropped
const OUTBOUND_QUEUE_SIZE: usize = 100;

/// WebSocket upgrade handler
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_QUEUE_SIZE);

    // The broadcaster keeps the only sender, so unregistering closes the writer
    state.broadcaster.register(conn, tx);
    tracing::info!(
        "WebSocket connection established: {} ({} open)",
        conn,
        state.broadcaster.connection_count()
    );

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Forward incoming messages to the session sequencer
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => {
                        if recv_state
                            .commands
                            .send(Command::Client { conn, message })
                            .await
                            .is_err()
                        {
                            tracing::error!("Session sequencer is gone, closing {}", conn);
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Failed to parse message from {}: {}", conn, e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        recv_state.broadcaster.send_to(conn, error_msg);
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client disconnected: {}", conn);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    state.broadcaster.unregister(conn);
    if state.commands.send(Command::Disconnect { conn }).await.is_err() {
        tracing::warn!("Session sequencer is gone, dropping disconnect for {}", conn);
    }

    tracing::info!("WebSocket connection closed: {}", conn);
}
