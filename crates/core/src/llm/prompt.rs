use crate::domain::metrics::Runway;
use crate::domain::money::format_inr;
use crate::llm::InsightInput;

pub fn dashboard_prompt(input: &InsightInput, infinite_threshold_days: i64) -> String {
    let m = &input.metrics;
    let runway = match m.runway {
        Runway::Days(d) if d <= infinite_threshold_days => d.to_string(),
        _ => "Infinite".to_string(),
    };
    format!(
        "Act as a financial advisor for an Indian household. \
         User data: Monthly Income {income}, Monthly Burn {burn}, Survival Runway {runway} days, \
         Risk Score {risk}/100. \
         Give exactly ONE short sentence (max 20 words) of practical advice. No preamble.",
        income = format_inr(input.monthly_income),
        burn = format_inr(m.burn),
        risk = m.risk_score,
    )
}

pub fn headline_prompt(headline: &str) -> String {
    format!(
        "Explain this news headline to a rural Indian citizen in one simple sentence: \
         how could it affect their money? Headline: \"{}\"",
        headline.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::Metrics;
    use crate::domain::profile::UserType;

    fn input(runway: Runway) -> InsightInput {
        InsightInput {
            monthly_income: 20000.0,
            metrics: Metrics {
                mode: UserType::Standard,
                burn: 19500.0,
                daily_burn: 650.0,
                net_savings: Some(500.0),
                runway,
                risk_score: 50,
            },
        }
    }

    #[test]
    fn dashboard_prompt_carries_figures() {
        let p = dashboard_prompt(&input(Runway::Days(30)), 900);
        assert!(p.contains("Monthly Income ₹20,000"));
        assert!(p.contains("Monthly Burn ₹19,500"));
        assert!(p.contains("Survival Runway 30 days"));
        assert!(p.contains("Risk Score 50/100"));
        assert!(p.contains("max 20 words"));
    }

    #[test]
    fn long_runway_reads_infinite() {
        let p = dashboard_prompt(&input(Runway::Days(5000)), 900);
        assert!(p.contains("Survival Runway Infinite days"));
    }

    #[test]
    fn headline_is_quoted() {
        assert!(headline_prompt("  Diesel up ₹2 ").ends_with("\"Diesel up ₹2\""));
    }
}
