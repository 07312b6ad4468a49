use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    #[default]
    Standard,
    Student,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Standard => "Standard",
            UserType::Student => "Student",
        }
    }

    /// Lenient parse; anything that is not recognisably "student" is Standard.
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().to_ascii_lowercase().contains("student") {
            UserType::Student
        } else {
            UserType::Standard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Rent,
    Food,
    Transport,
    Utilities,
    Education,
    Medical,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Rent,
        ExpenseCategory::Food,
        ExpenseCategory::Transport,
        ExpenseCategory::Utilities,
        ExpenseCategory::Education,
        ExpenseCategory::Medical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Food => "food",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Education => "education",
            ExpenseCategory::Medical => "medical",
        }
    }
}

/// Coarse asset classes recognised in free-form holding tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Equities,
    MutualFunds,
    Gold,
    Crypto,
    RealEstate,
    Other,
}

impl AssetClass {
    pub fn classify(tag: &str) -> Self {
        let t = tag.trim().to_ascii_lowercase();
        if t.contains("gold") {
            AssetClass::Gold
        } else if t.contains("crypto") || t.contains("btc") || t.contains("eth") {
            AssetClass::Crypto
        } else if t.contains("mutual") {
            AssetClass::MutualFunds
        } else if t.contains("stock") || t.contains("equit") || t.contains("share") {
            AssetClass::Equities
        } else if t.contains("real estate") || t.contains("property") {
            AssetClass::RealEstate
        } else {
            AssetClass::Other
        }
    }

    /// Market-linked holdings that make a profile an "investor" for news selection.
    pub fn is_market_linked(&self) -> bool {
        matches!(
            self,
            AssetClass::Equities | AssetClass::MutualFunds | AssetClass::Gold | AssetClass::Crypto
        )
    }
}

/// The user's declared financial facts. Monetary fields are expected to be
/// non-negative; the engine tolerates anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub user_type: UserType,
    pub monthly_income: f64,
    pub fixed_monthly: f64,
    pub gig_avg_monthly: f64,
    pub farm_avg_monthly: f64,
    /// Monthly SIP contribution. Recorded, not counted as income.
    pub sip: f64,
    pub expense_categories: BTreeMap<ExpenseCategory, f64>,
    pub emi_total: f64,
    pub savings_buffer: f64,
    pub crops_grown: BTreeSet<String>,
    pub crop_input_cost: f64,
    pub held_assets: BTreeSet<String>,
    pub livelihood_sources: Vec<String>,

    // Student mode.
    pub daily_limit: f64,
    pub today_spend: f64,
    pub study_stream: Option<String>,
    pub college_name: Option<String>,
    /// Free-form lending log.
    pub student_note: Option<String>,
}

impl Profile {
    pub fn expense(&self, category: ExpenseCategory) -> f64 {
        self.expense_categories.get(&category).copied().unwrap_or(0.0)
    }

    pub fn set_expense(&mut self, category: ExpenseCategory, amount: f64) {
        self.expense_categories.insert(category, amount);
    }

    /// Salary, gig and farm income summed; the default for `monthly_income`.
    pub fn income_from_sources(&self) -> f64 {
        self.fixed_monthly + self.gig_avg_monthly + self.farm_avg_monthly
    }

    pub fn total_expenses(&self) -> f64 {
        ExpenseCategory::ALL.iter().map(|c| self.expense(*c)).sum()
    }

    pub fn holds(&self, class: AssetClass) -> bool {
        self.held_assets
            .iter()
            .any(|tag| AssetClass::classify(tag) == class)
    }

    pub fn is_investor(&self) -> bool {
        self.held_assets
            .iter()
            .any(|tag| AssetClass::classify(tag).is_market_linked())
    }

    pub fn grows_crop(&self, crop: &str) -> bool {
        self.crops_grown
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(crop))
    }

    /// Applies the mode rules: Student profiles carry no household expenses,
    /// debt, income breakdown, crops or holdings.
    pub fn normalized(mut self) -> Self {
        if self.user_type == UserType::Student {
            self.expense_categories.clear();
            self.emi_total = 0.0;
            self.fixed_monthly = 0.0;
            self.gig_avg_monthly = 0.0;
            self.farm_avg_monthly = 0.0;
            self.sip = 0.0;
            self.crops_grown.clear();
            self.crop_input_cost = 0.0;
            self.held_assets.clear();
        }
        self
    }

    /// Logs a purchase from the wallet. Non-positive amounts are ignored.
    /// The balance may go negative; an overdraft is carried until cash
    /// comes in.
    pub fn record_spend(&mut self, amount: f64) -> bool {
        if amount.is_nan() || amount <= 0.0 {
            return false;
        }
        self.savings_buffer -= amount;
        self.today_spend += amount;
        true
    }

    /// Logs cash received into the wallet. Non-positive amounts are ignored.
    pub fn record_cash(&mut self, amount: f64) -> bool {
        if amount.is_nan() || amount <= 0.0 {
            return false;
        }
        self.savings_buffer += amount;
        true
    }

    pub fn start_new_day(&mut self) {
        self.today_spend = 0.0;
    }

    pub fn wallet_summary(&self) -> WalletSummary {
        let limit_usage = if self.daily_limit > 0.0 {
            (self.today_spend / self.daily_limit).clamp(0.0, 1.0)
        } else {
            0.0
        };

        WalletSummary {
            balance: self.savings_buffer,
            spent_today: self.today_spend,
            daily_limit: self.daily_limit,
            safe_to_spend: (self.daily_limit - self.today_spend).max(0.0),
            limit_usage,
            over_limit: limit_usage >= 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub balance: f64,
    pub spent_today: f64,
    pub daily_limit: f64,
    pub safe_to_spend: f64,
    /// Fraction of today's limit already spent, capped at 1.
    pub limit_usage: f64,
    pub over_limit: bool,
}
