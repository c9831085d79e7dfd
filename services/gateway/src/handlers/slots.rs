use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{MessageResponse, UpdateStatusRequest};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use swap_engine::MarketplaceSlot;
use types::errors::SwapError;
use types::ids::SlotId;
use types::slot::{NewSlot, Slot};

/// Path ids that fail to parse name no existing slot
fn parse_slot_id(raw: &str) -> Result<SlotId, AppError> {
    raw.parse()
        .map_err(|_| AppError::from(SwapError::slot_not_found(raw)))
}

pub async fn create_slot(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<NewSlot>, JsonRejection>,
) -> Result<(StatusCode, Json<Slot>), AppError> {
    let Json(input) = payload?;
    let slot = state.engine.create_slot(user.user_id, &input)?;
    Ok((StatusCode::CREATED, Json(slot)))
}

pub async fn list_my_slots(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Slot>>, AppError> {
    Ok(Json(state.engine.list_my_slots(user.user_id)?))
}

pub async fn get_slot(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Slot>, AppError> {
    let id = parse_slot_id(&id)?;
    Ok(Json(state.engine.get_slot(user.user_id, id)?))
}

pub async fn update_slot_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Slot>, AppError> {
    let Json(body) = payload?;
    let id = parse_slot_id(&id)?;
    let to = body.status()?;
    Ok(Json(state.engine.update_slot_status(user.user_id, id, to)?))
}

pub async fn delete_slot(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_slot_id(&id)?;
    state.engine.delete_slot(user.user_id, id)?;
    Ok(Json(MessageResponse {
        message: "Event deleted successfully".into(),
    }))
}

pub async fn marketplace(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<MarketplaceSlot>>, AppError> {
    Ok(Json(state.engine.list_marketplace(user.user_id)?))
}
