//! Response languages the front end can request.
//!
//! The selected language is persisted as its two-letter code and passed to
//! the response-generation flow on every turn.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported output language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
}

impl Language {
    /// All supported languages, in menu order.
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Hindi,
        Language::Spanish,
        Language::French,
    ];

    /// The two-letter code (`"en"`, `"hi"`, ...).
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Spanish => "es",
            Language::French => "fr",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "हिन्दी (Hindi)",
            Language::Spanish => "Español (Spanish)",
            Language::French => "Français (French)",
        }
    }

    /// Look up a language by its two-letter code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| {
            let supported: Vec<&str> = Self::ALL.iter().map(|l| l.code()).collect();
            format!("unsupported language '{s}' (expected one of {})", supported.join(", "))
        })
    }
}
