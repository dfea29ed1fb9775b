//! Chat styles and the tone/instruction text each one injects.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChatStyle {
    Simple,
    Academic,
    Conversational,
    #[default]
    Wise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleConfig {
    pub instruction: &'static str,
    pub tone: &'static str,
}

const SIMPLE: StyleConfig = StyleConfig {
    instruction: "Explain ideas in plain, everyday words. Keep sentences short and introduce one new idea at a time.",
    tone: "simple and clear",
};

const ACADEMIC: StyleConfig = StyleConfig {
    instruction: "Use precise terminology and structured explanations. State definitions, principles or formulas before applying them.",
    tone: "formal and scholarly",
};

const CONVERSATIONAL: StyleConfig = StyleConfig {
    instruction: "Talk like a friendly study partner. Ask a short follow-up question when it helps the learner think.",
    tone: "warm and conversational",
};

const WISE: StyleConfig = StyleConfig {
    instruction: "Guide the learner like a patient mentor. Connect each answer to a bigger lesson and invite reflection before the final answer.",
    tone: "wise and thoughtful",
};

impl ChatStyle {
    pub const ALL: [ChatStyle; 4] = [
        ChatStyle::Simple,
        ChatStyle::Academic,
        ChatStyle::Conversational,
        ChatStyle::Wise,
    ];

    /// Unknown or empty names fall back to `Wise`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "simple" => ChatStyle::Simple,
            "academic" => ChatStyle::Academic,
            "conversational" => ChatStyle::Conversational,
            _ => ChatStyle::Wise,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStyle::Simple => "simple",
            ChatStyle::Academic => "academic",
            ChatStyle::Conversational => "conversational",
            ChatStyle::Wise => "wise",
        }
    }

    pub fn config(&self) -> &'static StyleConfig {
        match self {
            ChatStyle::Simple => &SIMPLE,
            ChatStyle::Academic => &ACADEMIC,
            ChatStyle::Conversational => &CONVERSATIONAL,
            ChatStyle::Wise => &WISE,
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            ChatStyle::Academic => 0.3,
            _ => 0.7,
        }
    }
}

impl Serialize for ChatStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChatStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(ChatStyle::parse).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_style_falls_back_to_wise() {
        assert_eq!(ChatStyle::parse("poetic"), ChatStyle::Wise);
        assert_eq!(ChatStyle::parse(""), ChatStyle::Wise);
        assert_eq!(ChatStyle::parse(" Academic "), ChatStyle::Academic);
    }

    #[test]
    fn test_style_names_round_trip() {
        for style in ChatStyle::ALL {
            assert_eq!(ChatStyle::parse(style.as_str()), style);
        }
    }

    #[test]
    fn test_tones_are_distinct() {
        let tones: std::collections::HashSet<_> =
            ChatStyle::ALL.iter().map(|s| s.config().tone).collect();
        assert_eq!(tones.len(), ChatStyle::ALL.len());
    }

    #[test]
    fn test_deserialize_tolerates_null_and_unknown() {
        let style: ChatStyle = serde_json::from_str("null").unwrap();
        assert_eq!(style, ChatStyle::Wise);
        let style: ChatStyle = serde_json::from_str("\"shakespearean\"").unwrap();
        assert_eq!(style, ChatStyle::Wise);
        let style: ChatStyle = serde_json::from_str("\"simple\"").unwrap();
        assert_eq!(style, ChatStyle::Simple);
    }

    #[test]
    fn test_only_academic_is_cool() {
        assert_eq!(ChatStyle::Academic.temperature(), 0.3);
        assert_eq!(ChatStyle::Simple.temperature(), 0.7);
        assert_eq!(ChatStyle::Wise.temperature(), 0.7);
    }
}
