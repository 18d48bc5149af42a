use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::ApiJson,
    models::{
        activity::{Activity, ActivityPayload},
        link::{Link, LinkPayload},
        participant::{InvitePayload, Participant},
        trip::{Trip, TripCreated, TripPayload},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_trip))
        .route("/:id", get(get_trip).put(update_trip))
        .route("/:id/confirm", get(confirm_trip))
        .route("/:id/invite", post(invite_participant))
        .route("/:id/participants", get(list_participants))
        .route(
            "/:id/activities",
            get(list_activities).post(register_activity),
        )
        .route("/:id/links", get(list_links).post(register_link))
}

async fn create_trip(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TripPayload>,
) -> Result<Json<TripCreated>, AppError> {
    let id = state.trips.create_trip(payload).await?;
    Ok(Json(TripCreated { id }))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.get_trip(id).await?))
}

async fn update_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<TripPayload>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.update_trip(id, payload).await?))
}

async fn confirm_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.confirm_trip(id).await?))
}

async fn invite_participant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<InvitePayload>,
) -> Result<Json<Participant>, AppError> {
    Ok(Json(
        state.trips.invite_participant(id, &payload.email).await?,
    ))
}

async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Participant>>, AppError> {
    Ok(Json(state.trips.list_participants(id).await?))
}

async fn register_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<ActivityPayload>,
) -> Result<Json<Activity>, AppError> {
    Ok(Json(state.trips.register_activity(id, payload).await?))
}

async fn list_activities(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(state.trips.list_activities(id).await?))
}

async fn register_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<LinkPayload>,
) -> Result<Json<Link>, AppError> {
    Ok(Json(state.trips.register_link(id, payload).await?))
}

async fn list_links(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Link>>, AppError> {
    Ok(Json(state.trips.list_links(id).await?))
}
