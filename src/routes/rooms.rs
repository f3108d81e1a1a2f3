use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tokio::sync::oneshot;

use crate::{models::RoomSummary, session::Command, AppState};

/// Directory of active rooms, as the sequencer currently sees it
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummary>>, StatusCode> {
    let (reply, rx) = oneshot::channel();
    state
        .commands
        .send(Command::Directory { reply })
        .await
        .map_err(|_| {
            tracing::error!("Session sequencer is gone, cannot list rooms");
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    let rooms = rx.await.map_err(|_| {
        tracing::error!("Session sequencer dropped the room directory request");
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok(Json(rooms))
}
