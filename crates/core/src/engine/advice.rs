//! Advice protocols: a rule table separate from alerts, with its own ids and
//! thresholds. Output keeps evaluation order; there is no severity sort.

use crate::domain::advice::{AdviceEntry, AdviceLevel};
use crate::domain::metrics::Metrics;
use crate::domain::profile::{AssetClass, Profile};

pub const CASH_PRESERVATION: &str = "cash_preservation";
pub const CONSERVE_CASH: &str = "conserve_cash";
pub const DEBT_TRAP: &str = "debt_trap";
pub const DEBT_MANAGEMENT: &str = "debt_management";
pub const HARVEST_STRATEGY: &str = "harvest_strategy";
pub const COTTON_PEST: &str = "cotton_pest";
pub const LIQUIDITY_OPTION: &str = "liquidity_option";
pub const VOLATILITY_RISK: &str = "volatility_risk";
pub const BUFFER_LOW: &str = "buffer_low";

pub fn build_advice(profile: &Profile, metrics: &Metrics) -> Vec<AdviceEntry> {
    let mut out = Vec::new();
    let runway = metrics.runway;

    if runway.at_most(15) {
        let days = runway.days().unwrap_or_default();
        out.push(entry(
            CASH_PRESERVATION,
            AdviceLevel::Critical,
            "Immediate Cash Preservation",
            format!("Runway is only {days} days. Stop ALL non-food spending immediately."),
            "If ignored: Total insolvency (bankruptcy) in ~2 weeks.",
        ));
    } else if runway.at_most(45) {
        out.push(entry(
            CONSERVE_CASH,
            AdviceLevel::Warning,
            "Conserve Cash",
            "Runway is tight (< 45 days). Postpone any large purchases.".to_string(),
            "If ignored: You will be forced to take high-interest loans for daily needs.",
        ));
    }

    if profile.emi_total > 0.0 {
        let debt_ratio = if profile.monthly_income > 0.0 {
            profile.emi_total / profile.monthly_income * 100.0
        } else {
            100.0
        };
        if debt_ratio > 40.0 {
            out.push(entry(
                DEBT_TRAP,
                AdviceLevel::Critical,
                "Debt Trap Alert",
                // Whole percent, truncated; non-finite ratios saturate.
                format!(
                    "Your EMIs consume {}% of income. Contact bank for loan restructuring.",
                    debt_ratio.trunc() as i64
                ),
                "If ignored: High risk of asset seizure or default penalties.",
            ));
        } else if debt_ratio > 20.0 {
            out.push(entry(
                DEBT_MANAGEMENT,
                AdviceLevel::Info,
                "Debt Management",
                "Ensure EMIs are paid by 5th of month to avoid penalties.".to_string(),
                "If ignored: Credit score damage impacts future farm loans.",
            ));
        }
    }

    if !profile.crops_grown.is_empty() {
        let crops = profile
            .crops_grown
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        out.push(entry(
            HARVEST_STRATEGY,
            AdviceLevel::Advisory,
            "Harvest Strategy",
            format!("Detected farming of {crops}. Stagger your sales to avoid market dips."),
            "If ignored: Selling all at once risks 20-30% revenue loss.",
        ));
        if profile.grows_crop("Cotton") {
            out.push(entry(
                COTTON_PEST,
                AdviceLevel::Warning,
                "Cotton Pest Alert",
                "Check Pink Bollworm notices in the News tab.".to_string(),
                "If ignored: Risk of total crop failure significantly increases.",
            ));
        }
    }

    if profile.holds(AssetClass::Gold) && runway.below(30) {
        out.push(entry(
            LIQUIDITY_OPTION,
            AdviceLevel::Info,
            "Liquidity Option",
            "Consider a low-interest Gold Loan instead of high-interest moneylenders.".to_string(),
            "If ignored: Selling family gold permanently erodes your wealth.",
        ));
    }

    if profile.holds(AssetClass::Crypto) {
        out.push(entry(
            VOLATILITY_RISK,
            AdviceLevel::Warning,
            "Volatility Risk",
            "Crypto is high risk. Do not rely on this for emergency funds.".to_string(),
            "If ignored: Market crash could wipe out emergency savings instantly.",
        ));
    }

    let savings = profile.savings_buffer;
    if savings > 0.0 && savings < metrics.burn {
        out.push(entry(
            BUFFER_LOW,
            AdviceLevel::Warning,
            "Buffer Low",
            "Your savings cover less than 1 month of expenses. Priority: Rebuild buffer.".to_string(),
            "If ignored: A single medical emergency will force you into debt.",
        ));
    }

    out
}

fn entry(
    id: &str,
    level: AdviceLevel,
    title: &str,
    description: String,
    consequence: &str,
) -> AdviceEntry {
    AdviceEntry {
        id: id.to_string(),
        level,
        title: title.to_string(),
        description,
        consequence: consequence.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::ExpenseCategory;
    use crate::engine::risk::compute_metrics;

    fn ids(entries: &[AdviceEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    fn advice_for(p: &Profile) -> Vec<AdviceEntry> {
        build_advice(p, &compute_metrics(p))
    }

    #[test]
    fn debt_trap_scenario() {
        let p = Profile {
            monthly_income: 10000.0,
            emi_total: 5000.0,
            savings_buffer: 1_000_000.0,
            ..Default::default()
        };
        let advice = advice_for(&p);
        assert_eq!(ids(&advice), vec![DEBT_TRAP]);
        assert_eq!(advice[0].level, AdviceLevel::Critical);
        assert_eq!(advice[0].title, "Debt Trap Alert");
        assert!(advice[0].description.contains("50%"));
    }

    #[test]
    fn debt_ratio_is_truncated_to_whole_percent() {
        let mut p = Profile {
            monthly_income: 10000.0,
            emi_total: 4590.0,
            savings_buffer: 1_000_000.0,
            ..Default::default()
        };
        assert!(advice_for(&p)[0].description.contains("consume 45% of income"));

        p.emi_total = f64::INFINITY;
        assert!(ids(&advice_for(&p)).contains(&DEBT_TRAP));
    }

    #[test]
    fn debt_without_income_counts_as_full_ratio() {
        let p = Profile {
            emi_total: 100.0,
            savings_buffer: 1_000_000.0,
            ..Default::default()
        };
        assert_eq!(ids(&advice_for(&p)), vec![DEBT_TRAP]);
    }

    #[test]
    fn moderate_debt_is_info() {
        let p = Profile {
            monthly_income: 10000.0,
            emi_total: 2500.0,
            savings_buffer: 1_000_000.0,
            ..Default::default()
        };
        let advice = advice_for(&p);
        assert_eq!(ids(&advice), vec![DEBT_MANAGEMENT]);
        assert_eq!(advice[0].level, AdviceLevel::Info);
    }

    #[test]
    fn runway_bands() {
        let mut p = Profile {
            savings_buffer: 1500.0,
            ..Default::default()
        };
        p.set_expense(ExpenseCategory::Food, 3000.0);
        // 100/day
        assert_eq!(ids(&advice_for(&p)), vec![CASH_PRESERVATION, BUFFER_LOW]);

        p.savings_buffer = 4500.0;
        assert_eq!(ids(&advice_for(&p)), vec![CONSERVE_CASH]);

        p.savings_buffer = 4600.0;
        assert!(advice_for(&p).is_empty());
    }

    #[test]
    fn infinite_runway_skips_runway_rules() {
        let p = Profile::default();
        assert!(advice_for(&p).is_empty());
    }

    #[test]
    fn cotton_adds_second_entry() {
        let mut p = Profile {
            savings_buffer: 1_000_000.0,
            ..Default::default()
        };
        p.crops_grown.insert("Cotton".to_string());
        p.crops_grown.insert("Rice".to_string());
        let advice = advice_for(&p);
        assert_eq!(ids(&advice), vec![HARVEST_STRATEGY, COTTON_PEST]);
        assert!(advice[0].description.contains("Cotton, Rice"));
    }

    #[test]
    fn asset_rules() {
        let mut p = Profile {
            savings_buffer: 2000.0,
            ..Default::default()
        };
        p.set_expense(ExpenseCategory::Food, 3000.0);
        p.held_assets.insert("Gold".to_string());
        p.held_assets.insert("Crypto".to_string());
        // runway 20 days
        assert_eq!(
            ids(&advice_for(&p)),
            vec![CONSERVE_CASH, LIQUIDITY_OPTION, VOLATILITY_RISK, BUFFER_LOW]
        );

        p.savings_buffer = 100_000.0;
        assert_eq!(ids(&advice_for(&p)), vec![VOLATILITY_RISK]);
    }

    #[test]
    fn empty_buffer_is_not_flagged_low() {
        let mut p = Profile::default();
        p.set_expense(ExpenseCategory::Rent, 5000.0);
        let advice = advice_for(&p);
        assert!(!ids(&advice).contains(&BUFFER_LOW));
        assert_eq!(ids(&advice), vec![CASH_PRESERVATION]);
        assert!(advice[0].description.contains("only 0 days"));
    }
}
