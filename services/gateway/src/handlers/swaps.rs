use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{
    ActivityQuery, CreateSwapRequest, NotificationsResponse, RespondSwapRequest,
    SwapRequestResponse,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use swap_engine::events::SwapEvent;
use types::errors::SwapError;
use types::ids::SwapRequestId;
use types::swap::{MyRequests, SwapStatus};

pub async fn create_swap(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateSwapRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SwapRequestResponse>), AppError> {
    let Json(body) = payload?;
    let (my_slot, their_slot) = body.slots()?;
    let view = state.engine.propose_swap(user.user_id, my_slot, their_slot)?;
    Ok((
        StatusCode::CREATED,
        Json(SwapRequestResponse::new("Swap request created successfully", view)),
    ))
}

pub async fn respond_swap(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<RespondSwapRequest>, JsonRejection>,
) -> Result<Json<SwapRequestResponse>, AppError> {
    let Json(body) = payload?;
    let action = body.action()?;
    let id: SwapRequestId = id
        .parse()
        .map_err(|_| AppError::from(SwapError::request_not_found(&id)))?;

    let view = state.engine.respond_to_swap(user.user_id, id, action)?;
    let message = match view.status {
        SwapStatus::Accepted => "Swap request accepted successfully",
        _ => "Swap request rejected successfully",
    };
    Ok(Json(SwapRequestResponse::new(message, view)))
}

pub async fn my_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<MyRequests>, AppError> {
    Ok(Json(state.engine.my_requests(user.user_id)?))
}

pub async fn notifications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<NotificationsResponse>, AppError> {
    Ok(Json(NotificationsResponse {
        pending_incoming: state.engine.pending_incoming_count(user.user_id)?,
    }))
}

/// Transitions involving the caller, for polling clients
pub async fn activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<SwapEvent>>, AppError> {
    Ok(Json(state.engine.events_for(user.user_id, query.after)?))
}
