//! Application state shared by every handler.
//!
//! Everything here is read-only after startup and held behind `Arc`; the
//! database is the only place mutable state lives.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::chat::LlmClient;
use crate::config::Config;
use crate::identity::{IdentityGateway, LocalIdentityGateway};
use crate::store::Database;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Database>,
    pub llm: Arc<LlmClient>,
    pub identity: Arc<dyn IdentityGateway>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, db: Arc<Database>) -> Self {
        let llm = Arc::new(LlmClient::from_config(&config));
        let identity: Arc<dyn IdentityGateway> =
            Arc::new(LocalIdentityGateway::new(Arc::clone(&db), config.session_ttl_hours));
        Self::with_parts(config, db, llm, identity)
    }

    /// Assemble state from prebuilt parts, e.g. a mock LLM endpoint in tests.
    pub fn with_parts(
        config: Config,
        db: Arc<Database>,
        llm: Arc<LlmClient>,
        identity: Arc<dyn IdentityGateway>,
    ) -> Self {
        info!("Application state initialized (chat configured: {})", llm.is_configured());
        Self {
            config: Arc::new(config),
            db,
            llm,
            identity,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
