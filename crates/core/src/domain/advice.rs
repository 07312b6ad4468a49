use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdviceLevel {
    Critical,
    Warning,
    Advisory,
    Info,
}

impl AdviceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceLevel::Critical => "CRITICAL",
            AdviceLevel::Warning => "WARNING",
            AdviceLevel::Advisory => "ADVISORY",
            AdviceLevel::Info => "INFO",
        }
    }

    pub fn badge_color(&self) -> &'static str {
        match self {
            AdviceLevel::Critical => "red",
            AdviceLevel::Warning => "orange",
            AdviceLevel::Advisory => "green",
            AdviceLevel::Info => "blue",
        }
    }
}

/// A "protocol" on the advice view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceEntry {
    pub id: String,
    pub level: AdviceLevel,
    pub title: String,
    pub description: String,
    /// What happens if the advice is ignored.
    pub consequence: String,
}
