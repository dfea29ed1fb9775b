//! Streaming chat endpoint and conversation thread headers.
//!
//! Flow: client POST → prompt composition (profile, style, history) → one
//! streaming call to the provider → deltas forwarded as a chunked text body.
//! Nothing about the messages is stored.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::chat::{plan_chat, ChatProfile};
use crate::error::{AppError, Result};
use crate::identity::AuthUser;
use crate::metrics;
use crate::shared_state::AppState;
use crate::store::{Conversation, NewConversation};

/// Request body as the web client sends it
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default, alias = "userProfile")]
    pub profile: Option<ChatProfile>,
    #[serde(default, alias = "chatStyle")]
    pub chat_style: Option<String>,
    /// Accepted for compatibility; chat history is not persisted.
    #[serde(default, alias = "threadId")]
    pub thread_id: Option<Value>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<Value>,
}

/// Keeps `active_chat_streams` honest even when the client disconnects mid-stream.
struct StreamGauge;

impl StreamGauge {
    fn start() -> Self {
        metrics::inc_streams();
        StreamGauge
    }
}

impl Drop for StreamGauge {
    fn drop(&mut self) {
        metrics::dec_streams();
    }
}

/// POST /api/chat
///
/// An inline profile wins; otherwise a signed-in caller's stored profile is used.
pub async fn chat(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Json(req): Json<ChatRequest>,
) -> Result<Response> {
    let stored = match (&req.profile, &user) {
        (None, Some(user)) => state.db.profiles.get(&user.user_id)?.map(|p| ChatProfile::from(&p)),
        _ => None,
    };
    let profile = req.profile.as_ref().or(stored.as_ref());

    let plan = plan_chat(&req.messages, profile, req.chat_style.as_deref());
    if plan.messages.len() < 2 {
        return Err(AppError::Validation("Messages array cannot be empty".into()));
    }
    info!(
        "Chat request: {} message(s), style {}",
        plan.messages.len() - 1,
        plan.style.as_str()
    );

    let mut deltas = state.llm.stream_chat(&plan.messages, plan.temperature).await?;

    let body = async_stream::stream! {
        let _gauge = StreamGauge::start();
        let mut sent = 0usize;
        while let Some(item) = deltas.next().await {
            match item {
                Ok(text) => {
                    sent += text.len();
                    yield Ok::<Bytes, Infallible>(Bytes::from(text));
                }
                Err(e) => {
                    warn!("Ending chat stream early: {}", e);
                    break;
                }
            }
        }
        debug!("Chat stream finished after {} bytes", sent);
    };

    Ok((
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response())
}

/// POST /api/chat/create
pub async fn create_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new): Json<NewConversation>,
) -> Result<Json<Conversation>> {
    let conversation = state.db.resource::<Conversation>().create(&user.user_id, &new)?;
    Ok(Json(conversation))
}

/// GET /api/chat/list
pub async fn list_conversations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Conversation>>> {
    let conversations = state.db.resource::<Conversation>().list(&user.user_id, &[])?;
    Ok(Json(conversations))
}
