use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::ApiJson,
    models::participant::{Participant, ParticipantConfirmPayload},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/:id/confirm", post(confirm_participant))
}

async fn confirm_participant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<ParticipantConfirmPayload>,
) -> Result<Json<Participant>, AppError> {
    let name = payload.name()?;
    Ok(Json(state.trips.confirm_participant(id, name).await?))
}
