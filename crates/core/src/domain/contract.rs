//! The persisted profile document.
//!
//! Profiles are stored as a flat JSON object (one key per field, expense
//! categories at top level) and merged field by field on save. Reading a
//! document never fails: missing, non-numeric, non-finite or negative amounts
//! become zero, and tag fields accept either a list or a single string.
//! The one signed amount is a Student wallet balance, which carries overdrafts.

use crate::domain::profile::{ExpenseCategory, Profile, UserType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileDocument(pub Map<String, Value>);

impl ProfileDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-object values yield an empty document.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Last write wins per top-level key.
    pub fn merge(&mut self, patch: &ProfileDocument) {
        for (k, v) in &patch.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn from_profile(profile: &Profile) -> Self {
        let mut doc = Self::new();
        doc.set("user_type", profile.user_type.as_str())
            .set("monthly_income", profile.monthly_income)
            .set("fixed_monthly", profile.fixed_monthly)
            .set("gig_avg_monthly", profile.gig_avg_monthly)
            .set("farm_avg_monthly", profile.farm_avg_monthly)
            .set("sip", profile.sip)
            .set("emi_total", profile.emi_total)
            .set("savings_buffer", profile.savings_buffer)
            .set("crop_input_cost", profile.crop_input_cost)
            .set("daily_limit", profile.daily_limit)
            .set("today_spend", profile.today_spend)
            .set("crops_grown", string_list(profile.crops_grown.iter()))
            .set("held_assets", string_list(profile.held_assets.iter()))
            .set("livelihood_sources", string_list(profile.livelihood_sources.iter()));

        for category in ExpenseCategory::ALL {
            doc.set(category.as_str(), profile.expense(category));
        }

        if let Some(stream) = &profile.study_stream {
            doc.set("study_stream", stream.as_str());
        }
        if let Some(college) = &profile.college_name {
            doc.set("college_name", college.as_str());
        }
        if let Some(note) = &profile.student_note {
            doc.set("student_note", note.as_str());
        }

        doc
    }

    pub fn to_profile(&self) -> Profile {
        let get = |k: &str| self.0.get(k);

        let user_type = get("user_type")
            .and_then(Value::as_str)
            .map(UserType::parse_lenient)
            .unwrap_or_default();

        // Nested `expense_categories` is accepted for older documents; top-level keys win.
        let nested = get("expense_categories").and_then(Value::as_object);
        let savings_buffer = match user_type {
            UserType::Student => signed_amount(get("savings_buffer")),
            UserType::Standard => amount(get("savings_buffer")),
        };
        let mut profile = Profile {
            user_type,
            monthly_income: amount(get("monthly_income")),
            fixed_monthly: amount(get("fixed_monthly")),
            gig_avg_monthly: amount(get("gig_avg_monthly")),
            farm_avg_monthly: amount(get("farm_avg_monthly")),
            sip: amount(get("sip")),
            emi_total: amount(get("emi_total")),
            savings_buffer,
            crops_grown: tags(get("crops_grown")),
            crop_input_cost: amount(get("crop_input_cost")),
            held_assets: tags(get("held_assets")),
            livelihood_sources: tags(get("livelihood_sources")).into_iter().collect(),
            daily_limit: amount(get("daily_limit")),
            today_spend: amount(get("today_spend")),
            study_stream: text(get("study_stream")),
            college_name: text(get("college_name")),
            student_note: text(get("student_note")),
            ..Default::default()
        };

        // An explicit income, even zero, wins over the source breakdown.
        if get("monthly_income").is_none() {
            profile.monthly_income = profile.income_from_sources();
        }

        for category in ExpenseCategory::ALL {
            let value = get(category.as_str())
                .or_else(|| nested.and_then(|m| m.get(category.as_str())));
            let value = amount(value);
            if value != 0.0 {
                profile.set_expense(category, value);
            }
        }

        profile.normalized()
    }
}

fn amount(value: Option<&Value>) -> f64 {
    signed_amount(value).max(0.0)
}

fn signed_amount(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn tags(value: Option<&Value>) -> BTreeSet<String> {
    let push = |out: &mut BTreeSet<String>, s: &str| {
        let s = s.trim();
        if !s.is_empty() {
            out.insert(s.to_string());
        }
    };

    let mut out = BTreeSet::new();
    match value {
        Some(Value::Array(items)) => {
            for item in items {
                if let Some(s) = item.as_str() {
                    push(&mut out, s);
                }
            }
        }
        Some(Value::String(s)) => push(&mut out, s),
        _ => {}
    }
    out
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn string_list<'a>(items: impl Iterator<Item = &'a String>) -> Value {
    Value::Array(items.map(|s| Value::String(s.clone())).collect())
}
