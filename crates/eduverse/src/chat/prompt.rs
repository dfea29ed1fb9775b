//! Builds the system instruction and the provider message list for one chat turn.
//!
//! Stateless: history arrives with every request and nothing is kept here.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::style::ChatStyle;
use super::Message;
use crate::store::{Profile, Role};

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are EduVerse, a helpful educational assistant. Answer clearly and accurately, and help the user learn.";

pub const CHILD_METAPHOR: &str =
    "Explain things the way a storyteller would for a young learner, using games, animals and everyday adventures as metaphors.";
pub const YOUNG_ADULT_METAPHOR: &str =
    "Relate ideas to campus life, sports, technology and first jobs, treating the learner as a capable young adult.";
pub const ELDER_METAPHOR: &str =
    "Draw on work, family and lived experience as metaphors, respecting the learner's maturity and prior knowledge.";

/// The part of a profile the composer looks at. Clients may send it inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatProfile {
    #[serde(default)]
    pub name: Option<String>,
    /// Anything other than "teacher" reads as a student.
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
    /// Numbers or numeric text; anything else is dropped.
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: Option<i64>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, alias = "chatStyle")]
    pub chat_style: Option<String>,
}

fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Role>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) if s.trim().eq_ignore_ascii_case("teacher") => Some(Role::Teacher),
        _ => Some(Role::Student),
    })
}

fn lenient_age<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl From<&Profile> for ChatProfile {
    fn from(profile: &Profile) -> Self {
        Self {
            name: Some(profile.name.clone()),
            role: Some(profile.role),
            age: profile.age,
            subject: profile.subject.clone(),
            chat_style: Some(profile.chat_style.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBand {
    Child,
    YoungAdult,
    Elder,
}

impl AgeBand {
    /// ≤15, 16–25, >25
    pub fn from_age(age: i64) -> Self {
        match age {
            i64::MIN..=15 => AgeBand::Child,
            16..=25 => AgeBand::YoungAdult,
            _ => AgeBand::Elder,
        }
    }

    pub fn metaphor(&self) -> &'static str {
        match self {
            AgeBand::Child => CHILD_METAPHOR,
            AgeBand::YoungAdult => YOUNG_ADULT_METAPHOR,
            AgeBand::Elder => ELDER_METAPHOR,
        }
    }
}

/// Everything the provider call needs.
#[derive(Debug, Clone)]
pub struct ChatRequestPlan {
    pub style: ChatStyle,
    pub temperature: f32,
    pub messages: Vec<Message>,
}

/// Resolve the style: explicit override, then the profile's, then `Wise`.
pub fn resolve_style(profile: Option<&ChatProfile>, style_override: Option<&str>) -> ChatStyle {
    style_override
        .or_else(|| profile.and_then(|p| p.chat_style.as_deref()))
        .map(ChatStyle::parse)
        .unwrap_or_default()
}

pub fn compose_system_prompt(profile: Option<&ChatProfile>, style: ChatStyle) -> String {
    let Some(profile) = profile else {
        return DEFAULT_SYSTEM_PROMPT.to_string();
    };

    let name = profile
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("the learner");
    let subject = profile
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut prompt = match profile.role.unwrap_or(Role::Student) {
        Role::Teacher => {
            let mut intro = format!("You are EduVerse, a teaching assistant working with {}, a teacher", name);
            if let Some(subject) = subject {
                intro.push_str(&format!(" of {}", subject));
            }
            intro.push_str(". Help plan lessons, design assessments and explain concepts so they can be taught well.");
            intro
        }
        Role::Student => {
            let mut intro = format!("You are EduVerse, a study companion for {}, a student", name);
            if let Some(subject) = subject {
                intro.push_str(&format!(" focusing on {}", subject));
            }
            intro.push_str(". Help them understand rather than just handing over answers.");
            intro
        }
    };

    if let Some(age) = profile.age {
        prompt.push_str(&format!("\n\nThe user is {} years old. {}", age, AgeBand::from_age(age).metaphor()));
    }

    let config = style.config();
    prompt.push_str(&format!(
        "\n\nResponse style: {}\nTone: {}",
        config.instruction, config.tone
    ));
    prompt
}

/// Map whatever the client sent onto `{role, content}`; unrecognised shapes are dropped.
pub fn normalize_messages(raw: &[Value]) -> Vec<Message> {
    raw.iter().filter_map(normalize_message).collect()
}

fn normalize_message(value: &Value) -> Option<Message> {
    let object = value.as_object()?;

    if let Some(content) = object.get("content") {
        let role = match object.get("role").and_then(Value::as_str) {
            Some("assistant") => "assistant",
            _ => "user",
        };
        return Some(Message {
            role: role.to_string(),
            content: content_text(content)?,
        });
    }

    if object.get("type").and_then(Value::as_str) == Some("text") {
        let text = object.get("text").and_then(Value::as_str)?;
        return Some(Message {
            role: "user".to_string(),
            content: text.to_string(),
        });
    }

    None
}

/// Plain string content, or the text parts of a multi-part content array.
fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter(|p| p.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.join("\n"))
            }
        }
        _ => None,
    }
}

pub fn plan_chat(
    raw_messages: &[Value],
    profile: Option<&ChatProfile>,
    style_override: Option<&str>,
) -> ChatRequestPlan {
    let style = resolve_style(profile, style_override);
    let system = Message {
        role: "system".to_string(),
        content: compose_system_prompt(profile, style),
    };

    let mut messages = Vec::with_capacity(raw_messages.len() + 1);
    messages.push(system);
    messages.extend(normalize_messages(raw_messages));

    ChatRequestPlan {
        style,
        temperature: style.temperature(),
        messages,
    }
}
