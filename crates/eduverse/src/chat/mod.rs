//! Study-assistant chat: style presets, prompt composition and the provider client
pub mod llm_client;
pub mod prompt;
pub mod style;

use serde::{Deserialize, Serialize};

pub use llm_client::LlmClient;
pub use prompt::{
    compose_system_prompt, normalize_messages, plan_chat, AgeBand, ChatProfile, ChatRequestPlan,
    DEFAULT_SYSTEM_PROMPT,
};
pub use style::{ChatStyle, StyleConfig};

/// One message as sent to the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}
