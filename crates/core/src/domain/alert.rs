use serde::{Deserialize, Serialize};

pub const FUEL_SPIKE: &str = "fuel_spike";
pub const RATE_HIKE: &str = "rate_hike";
pub const INFLATION: &str = "inflation";
pub const FARM_INPUTS: &str = "farm_inputs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    Critical,
    Warning,
    Advisory,
}

impl AlertLevel {
    /// Display order: lower ranks first.
    pub fn rank(&self) -> u8 {
        match self {
            AlertLevel::Critical => 0,
            AlertLevel::Warning => 1,
            AlertLevel::Advisory => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "CRITICAL",
            AlertLevel::Warning => "WARNING",
            AlertLevel::Advisory => "ADVISORY",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "red",
            AlertLevel::Warning => "orange",
            AlertLevel::Advisory => "blue",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tab grouping for the alerts surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Fuel,
    Credit,
    CostOfLiving,
    Agriculture,
}

impl AlertCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fuel" => Some(AlertCategory::Fuel),
            "credit" => Some(AlertCategory::Credit),
            "cost_of_living" => Some(AlertCategory::CostOfLiving),
            "agriculture" => Some(AlertCategory::Agriculture),
            _ => None,
        }
    }
}

/// Presentation urgency, independent of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Monitor,
    Upcoming,
    Immediate,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Monitor => "Monitor",
            Urgency::Upcoming => "Upcoming 3–7 days",
            Urgency::Immediate => "Immediate 0–48hrs",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Urgency::Monitor => "yellow",
            Urgency::Upcoming => "orange",
            Urgency::Immediate => "red",
        }
    }
}

/// A rule-triggered situational alert. Value object: fully reconstructible
/// from the profile and metrics it was generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Stable per rule; the resolution key.
    pub id: String,
    pub category: AlertCategory,
    pub level: AlertLevel,
    pub title: String,
    pub summary: String,
    pub impact_lines: Vec<String>,
    /// Ranked by priority.
    pub actions: Vec<String>,
    pub urgency: Urgency,
    /// Estimated monthly cost of the shock in currency units.
    pub impact_amount: f64,
}

impl Alert {
    pub fn top_actions(&self, n: usize) -> &[String] {
        &self.actions[..n.min(self.actions.len())]
    }

    pub fn urgency_label(&self) -> &'static str {
        self.urgency.label()
    }

    pub fn urgency_color(&self) -> &'static str {
        self.urgency.color()
    }
}
