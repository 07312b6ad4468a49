use proptest::prelude::*;
use proptest::test_runner::Config;

use sentinel_core::domain::alert::FARM_INPUTS;
use sentinel_core::domain::metrics::Runway;
use sentinel_core::domain::profile::{ExpenseCategory, Profile, UserType};
use sentinel_core::engine::advice::{build_advice, COTTON_PEST, HARVEST_STRATEGY};
use sentinel_core::engine::alerts::generate_alerts;
use sentinel_core::engine::risk::compute_metrics;

/// NaN impacts compare unequal; JSON renders them as null.
fn as_json<T: serde::Serialize>(v: &T) -> String {
    serde_json::to_string(v).unwrap()
}

fn any_amount() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -1.0e7..1.0e9_f64,
        1 => Just(0.0),
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn standard_profile() -> impl Strategy<Value = Profile> {
    (
        any_amount(),
        prop::collection::vec(any_amount(), 6),
        any_amount(),
        any_amount(),
    )
        .prop_map(|(income, expenses, emi, savings)| {
            let mut p = Profile {
                monthly_income: income,
                emi_total: emi,
                savings_buffer: savings,
                ..Default::default()
            };
            for (category, amount) in ExpenseCategory::ALL.into_iter().zip(expenses) {
                p.set_expense(category, amount);
            }
            p
        })
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn risk_score_is_clamped(p in standard_profile()) {
        let m = compute_metrics(&p);
        prop_assert!(m.risk_score <= 100);
    }

    #[test]
    fn zero_burn_means_infinite_runway(income in 0.0..1.0e9_f64, savings in any_amount()) {
        let p = Profile {
            monthly_income: income,
            savings_buffer: savings,
            ..Default::default()
        };
        prop_assert_eq!(compute_metrics(&p).runway, Runway::Infinite);
    }

    #[test]
    fn evaluation_is_idempotent(p in standard_profile()) {
        let a = compute_metrics(&p);
        let b = compute_metrics(&p);
        prop_assert_eq!(a.runway, b.runway);
        prop_assert_eq!(a.risk_score, b.risk_score);
        prop_assert_eq!(a.burn.to_bits(), b.burn.to_bits());
        prop_assert_eq!(as_json(&generate_alerts(&p, &a)), as_json(&generate_alerts(&p, &b)));
    }

    #[test]
    fn crossing_debt_threshold_adds_fifteen(
        income in 10_000.0..1.0e6_f64,
        transport_share in 0.0..0.10_f64,
    ) {
        let mut low = Profile {
            monthly_income: income,
            emi_total: 0.30 * income,
            ..Default::default()
        };
        low.set_expense(ExpenseCategory::Transport, transport_share * income);
        let mut high = low.clone();
        high.emi_total = 0.40 * income;

        let before = compute_metrics(&low).risk_score;
        let after = compute_metrics(&high).risk_score;
        prop_assert_eq!(after, before + 15);
    }

    #[test]
    fn removing_crops_only_drops_crop_outputs(
        p in standard_profile(),
        input_cost in 0.0..50_000.0_f64,
    ) {
        let mut with_crops = p.clone();
        with_crops.crops_grown.insert("Cotton".to_string());
        with_crops.crop_input_cost = input_cost;
        let mut without = with_crops.clone();
        without.crops_grown.clear();

        let m_with = compute_metrics(&with_crops);
        let m_without = compute_metrics(&without);
        prop_assert_eq!(m_with.risk_score, m_without.risk_score);

        let mut alerts_with = generate_alerts(&with_crops, &m_with);
        alerts_with.retain(|a| a.id != FARM_INPUTS);
        prop_assert_eq!(as_json(&alerts_with), as_json(&generate_alerts(&without, &m_without)));

        let mut advice_with = build_advice(&with_crops, &m_with);
        advice_with.retain(|e| e.id != HARVEST_STRATEGY && e.id != COTTON_PEST);
        prop_assert_eq!(advice_with, build_advice(&without, &m_without));
    }

    #[test]
    fn student_score_follows_ladder(limit in 1.0..5_000.0_f64, savings in 0.0..1.0e6_f64) {
        let p = Profile {
            user_type: UserType::Student,
            daily_limit: limit,
            savings_buffer: savings,
            ..Default::default()
        };
        let m = compute_metrics(&p);
        let expected = match m.runway.days() {
            Some(d) if d < 7 => 90,
            Some(d) if d < 15 => 60,
            Some(d) if d < 30 => 30,
            _ => 0,
        };
        prop_assert_eq!(m.risk_score, expected);
    }
}
