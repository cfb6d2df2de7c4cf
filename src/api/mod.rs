//! API layer - HTTP endpoints and middleware

pub mod debug;
pub mod health;
pub mod middleware;
pub mod rag;
pub mod router;
pub mod state;
pub mod types;

pub use router::{create_router, RouterOptions};
pub use state::AppState;
