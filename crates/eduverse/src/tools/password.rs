//! Password generator and strength heuristic.
//!
//! Generation uses whatever `Rng` the caller hands in; the HTTP layer passes
//! `thread_rng`, tests pass a seeded generator.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharClasses {
    #[serde(default)]
    pub uppercase: bool,
    #[serde(default)]
    pub lowercase: bool,
    #[serde(default)]
    pub digits: bool,
    #[serde(default)]
    pub symbols: bool,
}

impl CharClasses {
    pub const ALL: CharClasses = CharClasses {
        uppercase: true,
        lowercase: true,
        digits: true,
        symbols: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.uppercase || self.lowercase || self.digits || self.symbols)
    }

    /// Characters to draw from. An empty selection means every class.
    pub fn alphabet(&self) -> Vec<char> {
        let classes = if self.is_empty() { CharClasses::ALL } else { *self };
        let mut chars = Vec::new();
        for (enabled, set) in [
            (classes.uppercase, UPPERCASE),
            (classes.lowercase, LOWERCASE),
            (classes.digits, DIGITS),
            (classes.symbols, SYMBOLS),
        ] {
            if enabled {
                chars.extend(set.chars());
            }
        }
        chars
    }
}

impl Default for CharClasses {
    fn default() -> Self {
        CharClasses::ALL
    }
}

/// Exactly `length` characters, each drawn uniformly from the selected classes.
pub fn generate<R: Rng + ?Sized>(length: usize, classes: CharClasses, rng: &mut R) -> String {
    let alphabet = classes.alphabet();
    (0..length)
        .filter_map(|_| alphabet.choose(rng).copied())
        .collect()
}

/// `min(len / 20, 0.4)` plus 0.15 for each character class present.
pub fn strength_score(password: &str) -> f64 {
    let length = password.chars().count() as f64;
    let mut score = (length / 20.0).min(0.4);
    let checks: [fn(&char) -> bool; 4] = [
        char::is_ascii_uppercase,
        char::is_ascii_lowercase,
        char::is_ascii_digit,
        |c| !c.is_ascii_alphanumeric(),
    ];
    for check in checks {
        if password.chars().any(|c| check(&c)) {
            score += 0.15;
        }
    }
    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StrengthLabel {
    Weak,
    Medium,
    Strong,
    #[serde(alias = "Very Strong")]
    VeryStrong,
}

impl StrengthLabel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            StrengthLabel::Weak
        } else if score < 0.6 {
            StrengthLabel::Medium
        } else if score < 0.8 {
            StrengthLabel::Strong
        } else {
            StrengthLabel::VeryStrong
        }
    }

    pub fn of(password: &str) -> Self {
        Self::from_score(strength_score(password))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthLabel::Weak => "Weak",
            StrengthLabel::Medium => "Medium",
            StrengthLabel::Strong => "Strong",
            StrengthLabel::VeryStrong => "Very Strong",
        }
    }
}

impl Serialize for StrengthLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    #[test]
    fn test_digits_only() {
        let mut rng = StdRng::seed_from_u64(7);
        let classes = CharClasses {
            uppercase: false,
            lowercase: false,
            digits: true,
            symbols: false,
        };
        let pw = generate(12, classes, &mut rng);
        assert!(Regex::new(r"^[0-9]{12}$").unwrap().is_match(&pw), "{}", pw);
    }

    #[test]
    fn test_no_class_selected_uses_all() {
        let none = CharClasses {
            uppercase: false,
            lowercase: false,
            digits: false,
            symbols: false,
        };
        assert_eq!(none.alphabet().len(), CharClasses::ALL.alphabet().len());
    }

    #[test]
    fn test_labels() {
        assert_eq!(StrengthLabel::of("ab"), StrengthLabel::Weak);
        assert_eq!(StrengthLabel::of("abcdefgh"), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::of("Abc"), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::of("abcdef12"), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::of("Abc1"), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::of("Abcdefgh12"), StrengthLabel::VeryStrong);
        assert_eq!(StrengthLabel::VeryStrong.as_str(), "Very Strong");
    }

    #[test]
    fn test_length_contribution_caps() {
        let long = "a".repeat(100);
        assert!((strength_score(&long) - 0.55).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_generate_length_and_alphabet(
            len in 0usize..64,
            seed in any::<u64>(),
            upper in any::<bool>(),
            lower in any::<bool>(),
            digits in any::<bool>(),
            symbols in any::<bool>(),
        ) {
            let classes = CharClasses { uppercase: upper, lowercase: lower, digits, symbols };
            let alphabet = classes.alphabet();
            let pw = generate(len, classes, &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(pw.chars().count(), len);
            prop_assert!(pw.chars().all(|c| alphabet.contains(&c)));
        }
    }
}
