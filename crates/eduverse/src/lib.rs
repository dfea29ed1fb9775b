// eduverse/crates/eduverse/src/lib.rs

pub mod api;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod server;
pub mod shared_state;
pub mod store;
pub mod telemetry;
pub mod tools;

// Public API exports
pub use chat::{ChatStyle, LlmClient, Message};
pub use config::Config;
pub use error::{AppError, Result};
pub use identity::{AuthUser, IdentityGateway, LocalIdentityGateway};
pub use server::{build_router, run_server};
pub use shared_state::AppState;
pub use store::Database;
