//! Answer style requested by the client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the generated answer should be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Spoken, first-person answer the candidate can read aloud.
    #[default]
    Script,
    /// A handful of talking points.
    Bullet,
    /// Keyword cues only.
    Shorthand,
}

impl Style {
    /// Lenient parse used for form fields: unknown or blank values fall back to
    /// [`Style::Script`].
    pub fn from_field(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Script => "script",
            Style::Bullet => "bullet",
            Style::Shorthand => "shorthand",
        }
    }
}

impl std::str::FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "script" => Ok(Style::Script),
            "bullet" | "bullets" => Ok(Style::Bullet),
            "shorthand" => Ok(Style::Shorthand),
            other => Err(format!("Invalid style: {}", other)),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
