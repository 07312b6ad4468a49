//! Profile → Metrics. Pure and total: any numeric input, including negative
//! or non-finite values, produces a result without panicking.

use crate::domain::metrics::{Metrics, Runway};
use crate::domain::profile::{ExpenseCategory, Profile, UserType};

const DAYS_PER_MONTH: f64 = 30.0;

const STANDARD_BASELINE: i32 = 50;
const DEFICIT_PENALTY: i32 = 25;
const DEBT_LOAD_PENALTY: i32 = 15;
const TRANSPORT_LOAD_PENALTY: i32 = 10;
const DEBT_LOAD_RATIO: f64 = 0.35;
const TRANSPORT_LOAD_RATIO: f64 = 0.15;

pub fn compute_metrics(profile: &Profile) -> Metrics {
    match profile.user_type {
        UserType::Standard => standard_metrics(profile),
        UserType::Student => student_metrics(profile),
    }
}

/// Sum of every expense category plus debt service.
pub fn monthly_burn(profile: &Profile) -> f64 {
    profile.total_expenses() + profile.emi_total
}

/// `floor(savings / daily_outflow)`, or `Infinite` when nothing flows out.
pub fn runway(savings: f64, daily_outflow: f64) -> Runway {
    if daily_outflow > 0.0 {
        // `as` saturates and maps NaN to 0.
        Runway::Days((savings / daily_outflow).floor() as i64)
    } else {
        Runway::Infinite
    }
}

fn standard_metrics(profile: &Profile) -> Metrics {
    let burn = monthly_burn(profile);
    let net_savings = profile.monthly_income - burn;
    let daily_burn = if burn > 0.0 { burn / DAYS_PER_MONTH } else { 0.0 };

    Metrics {
        mode: UserType::Standard,
        burn,
        daily_burn,
        net_savings: Some(net_savings),
        runway: runway(profile.savings_buffer, daily_burn),
        risk_score: standard_risk_score(
            profile.monthly_income,
            net_savings,
            profile.emi_total,
            profile.expense(ExpenseCategory::Transport),
        ),
    }
}

fn student_metrics(profile: &Profile) -> Metrics {
    let daily_limit = profile.daily_limit;
    let runway = runway(profile.savings_buffer, daily_limit);

    Metrics {
        mode: UserType::Student,
        burn: daily_limit * DAYS_PER_MONTH,
        daily_burn: daily_limit,
        net_savings: None,
        runway,
        risk_score: student_risk_score(runway),
    }
}

pub fn standard_risk_score(income: f64, net_savings: f64, emi_total: f64, transport: f64) -> u8 {
    let mut score = STANDARD_BASELINE;
    if net_savings < 0.0 {
        score += DEFICIT_PENALTY;
    }
    if income > 0.0 && emi_total > DEBT_LOAD_RATIO * income {
        score += DEBT_LOAD_PENALTY;
    }
    if transport > TRANSPORT_LOAD_RATIO * income {
        score += TRANSPORT_LOAD_PENALTY;
    }
    score.clamp(0, 100) as u8
}

/// Threshold ladder on runway; no baseline.
pub fn student_risk_score(runway: Runway) -> u8 {
    if runway.below(7) {
        90
    } else if runway.below(15) {
        60
    } else if runway.below(30) {
        30
    } else {
        0
    }
}
