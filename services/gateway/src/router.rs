use crate::handlers::{self, slots, swaps};
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!(%origin, "Invalid CORS origin, cross-origin requests disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router {
    let event_routes = Router::new()
        .route("/", post(slots::create_slot).get(slots::list_my_slots))
        .route("/swappable/marketplace", get(slots::marketplace))
        .route("/{id}", get(slots::get_slot).delete(slots::delete_slot))
        .route("/{id}/status", patch(slots::update_slot_status));

    let swap_routes = Router::new()
        .route("/swappable-slots", get(slots::marketplace))
        .route("/create", post(swaps::create_swap))
        .route("/respond/{id}", post(swaps::respond_swap))
        .route("/my-requests", get(swaps::my_requests))
        .route("/notifications", get(swaps::notifications))
        .route("/activity", get(swaps::activity));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .nest("/events", event_routes)
        .nest("/swap-request", swap_routes);

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origin));

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware)
        .with_state(state)
}
