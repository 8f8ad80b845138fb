// src/models/question.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the fixed option letters a question can offer.
/// Serialized lowercase, the way the backend keys `options`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];

    pub fn as_char(self) -> char {
        match self {
            OptionKey::A => 'a',
            OptionKey::B => 'b',
            OptionKey::C => 'c',
            OptionKey::D => 'd',
        }
    }

    /// Case-insensitive, so `B` typed at a prompt selects `b`.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(OptionKey::A),
            'b' => Some(OptionKey::B),
            'c' => Some(OptionKey::C),
            'd' => Some(OptionKey::D),
            _ => None,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                OptionKey::from_char(c).ok_or_else(|| format!("'{}' is not an option (a-d)", s.trim()))
            }
            _ => Err(format!("'{}' is not an option (a-d)", s.trim())),
        }
    }
}

/// A question as delivered before submission.
///
/// The backend never sends the correct option here. Should it ever include
/// one, the unknown field is dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_text: String,

    /// Option text keyed by letter, e.g. `{"a": "Paris", "b": "Rome"}`.
    pub options: BTreeMap<OptionKey, String>,
}

impl Question {
    pub fn has_option(&self, key: OptionKey) -> bool {
        self.options.contains_key(&key)
    }
}

/// A question as returned with the graded result, including its answer key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedQuestion {
    pub question_text: String,
    pub options: BTreeMap<OptionKey, String>,
    #[serde(default)]
    pub correct_option: Option<OptionKey>,
}
