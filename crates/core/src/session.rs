//! Per-user evaluation context.
//!
//! A `Session` owns one user's profile, the metrics derived from it and the
//! resolution tracker. Metrics are recomputed on every profile change, so
//! they can never go stale. Alerts and advice are regenerated on demand.

use crate::domain::advice::AdviceEntry;
use crate::domain::alert::{Alert, AlertCategory};
use crate::domain::contract::ProfileDocument;
use crate::domain::metrics::Metrics;
use crate::domain::profile::{Profile, UserType};
use crate::engine::advice::build_advice;
use crate::engine::alerts::{active_view, alerts_in_category, generate_alerts, rank_alerts};
use crate::engine::lifecycle::{AlertTracker, ResolvedSet};
use crate::engine::narration::{
    build_script, note_briefing, student_briefings, Briefing, Narratable,
};
use crate::engine::risk::compute_metrics;
use crate::storage::{ProfileStore, ResolvedStore};
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Session {
    profile: Profile,
    metrics: Metrics,
    tracker: AlertTracker,
}

impl Session {
    pub fn new(profile: Profile, resolved: ResolvedSet) -> Self {
        let profile = profile.normalized();
        let metrics = compute_metrics(&profile);
        Self {
            profile,
            metrics,
            tracker: AlertTracker::new(resolved),
        }
    }

    pub async fn load(
        profiles: &dyn ProfileStore,
        resolved: &dyn ResolvedStore,
    ) -> anyhow::Result<Self> {
        let profile = profiles.load_profile().await.context("load profile")?;
        let ids = resolved
            .load_resolved_ids()
            .await
            .context("load resolved alert ids")?;
        Ok(Self::new(profile, ids))
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Wholesale replacement, as on a setup-form submission.
    pub fn replace_profile(&mut self, profile: Profile) {
        self.profile = profile.normalized();
        self.refresh();
    }

    /// Applies a partial document on top of the current profile.
    pub fn apply_patch(&mut self, patch: &ProfileDocument) {
        let mut doc = ProfileDocument::from_profile(&self.profile);
        doc.merge(patch);
        self.profile = doc.to_profile();
        self.refresh();
    }

    /// Mutates the profile in place and recomputes metrics. Returns the
    /// closure's result.
    pub fn update_profile<R>(&mut self, f: impl FnOnce(&mut Profile) -> R) -> R {
        let out = f(&mut self.profile);
        self.profile = std::mem::take(&mut self.profile).normalized();
        self.refresh();
        out
    }

    fn refresh(&mut self) {
        self.metrics = compute_metrics(&self.profile);
        tracing::debug!(
            mode = self.profile.user_type.as_str(),
            burn = self.metrics.burn,
            risk_score = self.metrics.risk_score,
            "metrics recomputed"
        );
    }

    /// Full rule-evaluation result in rule order, resolved alerts included.
    pub fn alerts(&self) -> Vec<Alert> {
        generate_alerts(&self.profile, &self.metrics)
    }

    pub fn ranked_alerts(&self) -> Vec<Alert> {
        rank_alerts(self.alerts())
    }

    /// Ranked alerts, minus resolved ones unless `show_resolved`.
    pub fn active_alerts(&self, show_resolved: bool) -> Vec<Alert> {
        let ranked = self.ranked_alerts();
        active_view(&ranked, self.tracker.resolved(), show_resolved)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Per-category tab: rule order, resolution ignored.
    pub fn alerts_in_category(&self, category: AlertCategory) -> Vec<Alert> {
        let alerts = self.alerts();
        alerts_in_category(&alerts, category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn advice(&self) -> Vec<AdviceEntry> {
        build_advice(&self.profile, &self.metrics)
    }

    pub fn mark_resolved(&mut self, id: &str) -> bool {
        self.tracker.mark_resolved(id)
    }

    pub fn clear_resolved(&mut self) {
        self.tracker.clear_all();
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.tracker.is_resolved(id)
    }

    pub fn resolved(&self) -> &ResolvedSet {
        self.tracker.resolved()
    }

    /// Saves the resolved set if it changed since load or the last save.
    pub async fn persist_resolved(&mut self, store: &dyn ResolvedStore) -> anyhow::Result<()> {
        if !self.tracker.is_dirty() {
            return Ok(());
        }
        store
            .save_resolved_ids(self.tracker.resolved())
            .await
            .context("save resolved alert ids")?;
        self.tracker.mark_saved();
        Ok(())
    }

    /// Items available for narration: generated alerts for Standard users,
    /// static briefings plus the saved note for students.
    pub fn briefings(&self) -> Vec<Briefing> {
        match self.profile.user_type {
            UserType::Standard => self.alerts().into_iter().map(Briefing::Alert).collect(),
            UserType::Student => student_briefings(self.profile.study_stream.as_deref())
                .into_iter()
                .chain(note_briefing(self.profile.student_note.as_deref()))
                .map(Briefing::Static)
                .collect(),
        }
    }

    /// Script for one briefing, or `None` when no current item has that id.
    pub fn narrate(&self, id: &str, infinite_threshold_days: i64) -> Option<String> {
        let item = self.briefings().into_iter().find(|b| b.briefing_id() == id)?;
        let runway = match item {
            Briefing::Alert(_) => Some(self.metrics.runway),
            Briefing::Static(_) => None,
        };
        Some(build_script(&item, runway, infinite_threshold_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::FUEL_SPIKE;
    use crate::domain::metrics::Runway;
    use crate::domain::profile::ExpenseCategory;

    fn household() -> Profile {
        let mut p = Profile {
            monthly_income: 20000.0,
            emi_total: 3000.0,
            savings_buffer: 20000.0,
            ..Default::default()
        };
        p.set_expense(ExpenseCategory::Rent, 8000.0);
        p.set_expense(ExpenseCategory::Food, 5000.0);
        p.set_expense(ExpenseCategory::Transport, 2000.0);
        p.set_expense(ExpenseCategory::Utilities, 1500.0);
        p
    }

    #[test]
    fn metrics_follow_profile_changes() {
        let mut s = Session::new(household(), ResolvedSet::default());
        assert_eq!(s.metrics().runway, Runway::Days(30));

        s.update_profile(|p| p.savings_buffer = 6500.0);
        assert_eq!(s.metrics().runway, Runway::Days(10));

        let mut patch = ProfileDocument::new();
        patch.set("savings_buffer", 39000);
        s.apply_patch(&patch);
        assert_eq!(s.metrics().runway, Runway::Days(60));
        assert_eq!(s.profile().monthly_income, 20000.0);
    }

    #[test]
    fn resolved_alerts_leave_active_view_only() {
        let mut s = Session::new(household(), ResolvedSet::default());
        assert!(s.mark_resolved(FUEL_SPIKE));

        assert!(s.active_alerts(false).iter().all(|a| a.id != FUEL_SPIKE));
        assert!(s.active_alerts(true).iter().any(|a| a.id == FUEL_SPIKE));
        assert!(s.alerts().iter().any(|a| a.id == FUEL_SPIKE));
    }

    #[test]
    fn narrates_alerts_with_runway_context() {
        let s = Session::new(household(), ResolvedSet::default());
        let script = s.narrate(FUEL_SPIKE, 900).unwrap();
        assert!(script.contains("about 30 days"));
        assert!(s.narrate("no_such_alert", 900).is_none());
    }

    #[test]
    fn narration_follows_infinite_display_threshold() {
        let mut p = Profile {
            monthly_income: 50000.0,
            savings_buffer: 10_000_000.0,
            ..Default::default()
        };
        p.set_expense(ExpenseCategory::Transport, 3000.0);
        let s = Session::new(p, ResolvedSet::default());
        assert_eq!(s.metrics().runway, Runway::Days(100_000));
        assert_eq!(s.metrics().runway.label(900), "Infinite");

        let script = s.narrate(FUEL_SPIKE, 900).unwrap();
        assert!(script.contains("your savings are not being drawn down."));
        assert!(!script.contains("100000 days"));
    }

    #[test]
    fn students_get_static_briefings() {
        let s = Session::new(
            Profile {
                user_type: UserType::Student,
                daily_limit: 200.0,
                savings_buffer: 1000.0,
                study_stream: Some("Law".to_string()),
                ..Default::default()
            },
            ResolvedSet::default(),
        );
        let ids: Vec<String> = s
            .briefings()
            .iter()
            .map(|b| b.briefing_id().to_string())
            .collect();
        assert_eq!(ids, vec!["daily_motivation", "financial_advice_note"]);
        assert!(s.narrate("daily_motivation", 900).unwrap().contains("Justice"));
    }

    #[test]
    fn saved_note_is_narratable() {
        let s = Session::new(
            Profile {
                user_type: UserType::Student,
                student_note: Some("Gave ₹500 to Rahul".to_string()),
                ..Default::default()
            },
            ResolvedSet::default(),
        );
        assert_eq!(s.briefings().len(), 3);
        let script = s.narrate("student_note", 900).unwrap();
        assert!(script.contains("Gave ₹500 to Rahul."));
    }
}
