//! API module - HTTP handlers for every EduVerse route

pub mod admin_api;
pub mod auth_api;
pub mod chat_api;
pub mod classroom_api;
pub mod profile_api;
pub mod resource_api;
pub mod tools_api;

pub use chat_api::ChatRequest;
pub use resource_api::resource_routes;
