//! Shepherd Gateway - HTTP surface for moderation classification
//!
//! Exposes the learning loop to the moderation dashboard:
//!
//! - `POST /classify` - classify content, remembering the prediction
//! - `POST /decisions` - record a moderator decision
//! - `GET /feedback` - accuracy, patterns and suggestions
//! - `GET /stats` - cache, store and oracle counters
//! - `GET /health` - liveness and backend availability

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::Args;
pub use error::{GatewayError, Result};
pub use server::{run, AppState};
