//! HTTP gateway for the slot swap marketplace
//!
//! JSON over HTTP under `/api`, bearer-token authenticated, backed by one
//! shared [`swap_engine::NegotiationEngine`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod shutdown;
pub mod state;

pub use router::create_router;
pub use state::AppState;
