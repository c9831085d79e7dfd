//! Types library for the slot swap marketplace
//!
//! Core type definitions shared by the negotiation engine and the HTTP
//! gateway.
//!
//! # Modules
//! - `ids`: Unique identifiers (UserId, SlotId, SwapRequestId)
//! - `slot`: Calendar slot and its status machine
//! - `swap`: Swap request lifecycle and response views
//! - `user`: Display profiles
//! - `errors`: Error taxonomy

pub mod ids;
pub mod slot;
pub mod swap;
pub mod user;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::slot::*;
    pub use crate::swap::*;
    pub use crate::user::*;
    pub use crate::errors::*;
}
