use crate::domain::profile::UserType;
use serde::{Deserialize, Serialize};

/// Days until savings run out at the current burn rate.
///
/// `Infinite` sorts after every finite value, so `runway <= Runway::Days(15)`
/// reads naturally in threshold rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Runway {
    Days(i64),
    Infinite,
}

impl Runway {
    pub fn days(&self) -> Option<i64> {
        match self {
            Runway::Days(d) => Some(*d),
            Runway::Infinite => None,
        }
    }

    pub fn at_most(&self, days: i64) -> bool {
        *self <= Runway::Days(days)
    }

    pub fn below(&self, days: i64) -> bool {
        *self < Runway::Days(days)
    }

    /// True for the sentinel and for finite runways past the display threshold.
    pub fn displays_as_infinite(&self, threshold_days: i64) -> bool {
        match self {
            Runway::Infinite => true,
            Runway::Days(d) => *d > threshold_days,
        }
    }

    pub fn label(&self, threshold_days: i64) -> String {
        match self.days() {
            Some(d) if !self.displays_as_infinite(threshold_days) => format!("{d} Days"),
            _ => "Infinite".to_string(),
        }
    }
}

/// Derived financial-health figures. Always a pure function of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mode: UserType,
    /// Monthly outflow. For students this is the daily limit projected over 30 days.
    pub burn: f64,
    pub daily_burn: f64,
    /// Standard mode only.
    pub net_savings: Option<f64>,
    pub runway: Runway,
    pub risk_score: u8,
}

impl Metrics {
    pub fn status(&self) -> DashboardStatus {
        DashboardStatus::from_metrics(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardStatus {
    Secure,
    MonitoringRisks,
    CriticalThreats,
}

impl DashboardStatus {
    pub fn from_metrics(metrics: &Metrics) -> Self {
        let risk = metrics.risk_score;
        if risk >= 75 || metrics.runway.at_most(15) {
            DashboardStatus::CriticalThreats
        } else if risk >= 50 || metrics.runway.at_most(30) {
            DashboardStatus::MonitoringRisks
        } else {
            DashboardStatus::Secure
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DashboardStatus::Secure => "LIVELIHOOD SECURE",
            DashboardStatus::MonitoringRisks => "MONITORING RISKS",
            DashboardStatus::CriticalThreats => "CRITICAL THREATS",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            DashboardStatus::Secure => "green",
            DashboardStatus::MonitoringRisks => "orange",
            DashboardStatus::CriticalThreats => "red",
        }
    }
}
