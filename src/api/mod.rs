//! JSON HTTP API over the rank service.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod types;

pub use error::ApiError;
pub use routes::create_router;
pub use server::{bind_available, serve, CANDIDATE_PORTS};
pub use state::AppState;
