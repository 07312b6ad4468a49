//! Situational alert rules.
//!
//! Each rule is gated independently and yields at most one alert. A rule that
//! does not fire produces nothing; absence means "not applicable", never
//! "resolved". Generation ignores resolution state entirely; filtering for the
//! active view happens afterwards in [`active_view`].

use crate::domain::alert::{
    Alert, AlertCategory, AlertLevel, Urgency, FARM_INPUTS, FUEL_SPIKE, INFLATION, RATE_HIKE,
};
use crate::domain::metrics::Metrics;
use crate::domain::money::format_inr;
use crate::domain::profile::{ExpenseCategory, Profile};
use crate::engine::lifecycle::ResolvedSet;

const FUEL_SHOCK_RATE: f64 = 0.10;
const RATE_HIKE_RATE: f64 = 0.06;
const INFLATION_RATE: f64 = 0.02;
const FARM_INPUT_RATE: f64 = 0.12;

const INFLATION_WARNING_AT: f64 = 800.0;
const FARM_INPUT_WARNING_ABOVE: f64 = 500.0;
const CRITICAL_RUNWAY_DAYS: i64 = 7;

/// Evaluates every rule in fixed order: fuel, rate, inflation, farm.
pub fn generate_alerts(profile: &Profile, metrics: &Metrics) -> Vec<Alert> {
    [
        fuel_spike(profile, metrics),
        rate_hike(profile, metrics),
        Some(inflation(profile, metrics)),
        farm_inputs(profile, metrics),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Stable sort by severity; ties keep rule-evaluation order.
pub fn rank_alerts(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by_key(|a| a.level.rank());
    alerts
}

pub fn active_view<'a>(
    alerts: &'a [Alert],
    resolved: &ResolvedSet,
    show_resolved: bool,
) -> Vec<&'a Alert> {
    alerts
        .iter()
        .filter(|a| show_resolved || !resolved.contains(&a.id))
        .collect()
}

pub fn alerts_in_category(alerts: &[Alert], category: AlertCategory) -> Vec<&Alert> {
    alerts.iter().filter(|a| a.category == category).collect()
}

/// Runway at or below a week overrides every rule. Otherwise fuel and rate
/// alerts are "upcoming", and rate alerts escalate to "immediate" whenever
/// any EMI is outstanding (always true once the rule has fired).
pub fn urgency_for(rule_id: &str, profile: &Profile, metrics: &Metrics) -> Urgency {
    if metrics.runway.at_most(CRITICAL_RUNWAY_DAYS) {
        return Urgency::Immediate;
    }

    let mut urgency = match rule_id {
        FUEL_SPIKE | RATE_HIKE => Urgency::Upcoming,
        _ => Urgency::Monitor,
    };
    if rule_id == RATE_HIKE && profile.emi_total > 0.0 {
        urgency = Urgency::Immediate;
    }
    urgency
}

fn fuel_spike(profile: &Profile, metrics: &Metrics) -> Option<Alert> {
    let transport = profile.expense(ExpenseCategory::Transport);
    if transport.is_nan() || transport <= 0.0 {
        return None;
    }

    let impact = transport * FUEL_SHOCK_RATE;
    let days_lost = if metrics.daily_burn > 0.0 {
        impact / metrics.daily_burn
    } else {
        0.0
    };

    Some(Alert {
        id: FUEL_SPIKE.to_string(),
        category: AlertCategory::Fuel,
        level: AlertLevel::Warning,
        title: "Fuel Price Spike".to_string(),
        summary: format!(
            "Fuel prices are climbing. Your transport costs could rise by {}/month.",
            format_inr(impact)
        ),
        impact_lines: vec![
            format!("Transport budget: {}/month", format_inr(transport)),
            format!("Estimated increase: {}/month (10%)", format_inr(impact)),
            format!("Runway impact: about {days_lost:.1} fewer days of savings"),
        ],
        actions: vec![
            "Switch to pooled rides or public transit for daily commutes".to_string(),
            "Combine errands to cut the number of weekly trips".to_string(),
            format!("Set aside {} this month for fuel", format_inr(impact)),
        ],
        urgency: urgency_for(FUEL_SPIKE, profile, metrics),
        impact_amount: impact,
    })
}

fn rate_hike(profile: &Profile, metrics: &Metrics) -> Option<Alert> {
    let emi = profile.emi_total;
    if emi.is_nan() || emi <= 0.0 {
        return None;
    }

    let impact = emi * RATE_HIKE_RATE;
    let mut impact_lines = vec![
        format!("Current EMIs: {}/month", format_inr(emi)),
        format!("Estimated increase: {}/month (6%)", format_inr(impact)),
    ];
    if profile.monthly_income > 0.0 {
        let share = emi / profile.monthly_income * 100.0;
        impact_lines.push(format!("EMIs take {share:.0}% of your income"));
    }

    Some(Alert {
        id: RATE_HIKE.to_string(),
        category: AlertCategory::Credit,
        level: AlertLevel::Warning,
        title: "Interest Rate Hike".to_string(),
        summary: format!(
            "The central bank has raised rates. Your loan EMIs may rise by about {}/month.",
            format_inr(impact)
        ),
        impact_lines,
        actions: vec![
            "Ask your lender whether the change raises the EMI or extends the tenure".to_string(),
            "Prepay the costliest loan first if you have any surplus".to_string(),
            "Avoid taking on new variable-rate debt".to_string(),
        ],
        urgency: urgency_for(RATE_HIKE, profile, metrics),
        impact_amount: impact,
    })
}

fn inflation(profile: &Profile, metrics: &Metrics) -> Alert {
    let impact = profile.monthly_income * INFLATION_RATE;
    let level = if impact >= INFLATION_WARNING_AT {
        AlertLevel::Warning
    } else {
        AlertLevel::Advisory
    };

    Alert {
        id: INFLATION.to_string(),
        category: AlertCategory::CostOfLiving,
        level,
        title: "Cost of Living Rise".to_string(),
        summary: format!(
            "Food and utility prices are trending up. Estimated loss of buying power: {}/month.",
            format_inr(impact)
        ),
        impact_lines: vec![
            format!("Monthly income: {}", format_inr(profile.monthly_income)),
            format!("Buying power loss: {}/month (2%)", format_inr(impact)),
        ],
        actions: vec![
            "Cut discretionary spending this week".to_string(),
            "Buy staples in bulk while prices hold".to_string(),
            "Review subscriptions and recurring bills".to_string(),
        ],
        urgency: urgency_for(INFLATION, profile, metrics),
        impact_amount: impact,
    }
}

fn farm_inputs(profile: &Profile, metrics: &Metrics) -> Option<Alert> {
    if profile.crops_grown.is_empty() {
        return None;
    }

    let impact = profile.crop_input_cost * FARM_INPUT_RATE;
    let level = if impact > FARM_INPUT_WARNING_ABOVE {
        AlertLevel::Warning
    } else {
        AlertLevel::Advisory
    };
    let crops = profile
        .crops_grown
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    Some(Alert {
        id: FARM_INPUTS.to_string(),
        category: AlertCategory::Agriculture,
        level,
        title: "Farm Input Cost Surge".to_string(),
        summary: format!(
            "Seed, fertiliser and pesticide prices are rising for {crops}. Input costs could increase by {}.",
            format_inr(impact)
        ),
        impact_lines: vec![
            format!("Declared input cost: {}", format_inr(profile.crop_input_cost)),
            format!("Estimated increase: {} (12%)", format_inr(impact)),
            format!("Crops affected: {crops}"),
        ],
        actions: vec![
            "Book inputs early through your cooperative or producer group".to_string(),
            "Compare prices at government-subsidised fertiliser outlets".to_string(),
            "Stagger purchases to match sowing stages".to_string(),
        ],
        urgency: urgency_for(FARM_INPUTS, profile, metrics),
        impact_amount: impact,
    })
}
