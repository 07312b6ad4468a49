//! Plain-language briefing scripts.
//!
//! Scripts are deterministic: the same item and runway always produce the
//! same text. Translation and speech synthesis happen elsewhere.

use crate::domain::alert::{Alert, AlertLevel};
use crate::domain::metrics::Runway;
use serde::{Deserialize, Serialize};

const OPENING: &str = "Hello. This is your Livelihood Sentinel briefing.";
const CLOSING: &str = "Stay alert, and check the app for full details. Goodbye.";

pub const DAILY_MOTIVATION: &str = "daily_motivation";
pub const FINANCIAL_ADVICE_NOTE: &str = "financial_advice_note";
pub const STUDENT_NOTE: &str = "student_note";

/// Anything that can be read out as a briefing.
pub trait Narratable {
    fn briefing_id(&self) -> &str;
    /// `None` for static content; narrated with the neutral framing.
    fn severity(&self) -> Option<AlertLevel>;
    fn briefing_title(&self) -> &str;
    fn briefing_summary(&self) -> &str;
    fn lead_action(&self) -> Option<&str>;
}

impl Narratable for Alert {
    fn briefing_id(&self) -> &str {
        &self.id
    }

    fn severity(&self) -> Option<AlertLevel> {
        Some(self.level)
    }

    fn briefing_title(&self) -> &str {
        &self.title
    }

    fn briefing_summary(&self) -> &str {
        &self.summary
    }

    fn lead_action(&self) -> Option<&str> {
        self.actions.first().map(String::as_str)
    }
}

/// Non-alert content such as a motivational quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticBriefing {
    pub id: String,
    pub title: String,
    pub summary: String,
}

impl Narratable for StaticBriefing {
    fn briefing_id(&self) -> &str {
        &self.id
    }

    fn severity(&self) -> Option<AlertLevel> {
        None
    }

    fn briefing_title(&self) -> &str {
        &self.title
    }

    fn briefing_summary(&self) -> &str {
        &self.summary
    }

    fn lead_action(&self) -> Option<&str> {
        None
    }
}

/// The narration feed: generated alerts for Standard users, static content
/// for students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Briefing {
    Alert(Alert),
    Static(StaticBriefing),
}

impl Briefing {
    fn inner(&self) -> &dyn Narratable {
        match self {
            Briefing::Alert(a) => a,
            Briefing::Static(s) => s,
        }
    }
}

impl Narratable for Briefing {
    fn briefing_id(&self) -> &str {
        self.inner().briefing_id()
    }

    fn severity(&self) -> Option<AlertLevel> {
        self.inner().severity()
    }

    fn briefing_title(&self) -> &str {
        self.inner().briefing_title()
    }

    fn briefing_summary(&self) -> &str {
        self.inner().briefing_summary()
    }

    fn lead_action(&self) -> Option<&str> {
        self.inner().lead_action()
    }
}

pub fn framing(level: Option<AlertLevel>) -> &'static str {
    match level {
        Some(AlertLevel::Critical) => "Urgent attention required.",
        Some(AlertLevel::Warning) => "This is a warning update.",
        Some(AlertLevel::Advisory) => "Here is an advisory update.",
        None => "Here is your update.",
    }
}

/// Runways above `infinite_threshold_days` are read out as not being drawn
/// down, matching how they are displayed.
pub fn build_script(
    item: &dyn Narratable,
    runway: Option<Runway>,
    infinite_threshold_days: i64,
) -> String {
    let mut parts: Vec<String> = vec![
        OPENING.to_string(),
        framing(item.severity()).to_string(),
        sentence(item.briefing_title()),
        sentence(item.briefing_summary()),
    ];

    match runway {
        Some(r) if r.displays_as_infinite(infinite_threshold_days) => parts.push(
            "At your current spending, your savings are not being drawn down.".to_string(),
        ),
        Some(Runway::Days(days)) => parts.push(format!(
            "At your current spending, your savings last about {days} days."
        )),
        _ => {}
    }

    if let Some(action) = item.lead_action() {
        parts.push(format!("Recommended step: {}", sentence(action)));
    }

    parts.push(CLOSING.to_string());
    parts.retain(|p| !p.is_empty());
    parts.join("\n\n")
}

fn sentence(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() || s.ends_with(&['.', '!', '?', '"', '”'][..]) {
        s.to_string()
    } else {
        format!("{s}.")
    }
}

/// Static briefings for Student mode, keyed on the study stream.
pub fn student_briefings(study_stream: Option<&str>) -> Vec<StaticBriefing> {
    let stream = study_stream
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("General");
    let short = stream.split('/').next().unwrap_or(stream).trim();

    vec![
        StaticBriefing {
            id: DAILY_MOTIVATION.to_string(),
            title: format!("Study Motivation ({short})"),
            summary: motivation_for(stream).to_string(),
        },
        StaticBriefing {
            id: FINANCIAL_ADVICE_NOTE.to_string(),
            title: "Sentinel Advice: On Being Broke".to_string(),
            summary: "Never be ashamed of not having money. It is a temporary stage, not your identity. \
                      Save what you can. If you really need to borrow, ask close friends or family; \
                      there is always someone willing to help."
                .to_string(),
        },
    ]
}

/// The student's own lending log, read back as written.
pub fn note_briefing(note: Option<&str>) -> Option<StaticBriefing> {
    let note = note.map(str::trim).filter(|n| !n.is_empty())?;
    Some(StaticBriefing {
        id: STUDENT_NOTE.to_string(),
        title: "Your Lending Log".to_string(),
        summary: note.to_string(),
    })
}

fn motivation_for(stream: &str) -> &'static str {
    match stream {
        "CSE / Tech" => "“Talk is cheap. Show me the code.” – Linus Torvalds",
        "Finance / Commerce" => "“Price is what you pay. Value is what you get.” – Warren Buffett",
        "Medical / Biology" => {
            "“Wherever the art of Medicine is loved, there is also a love of Humanity.”"
        }
        "Arts / Humanities" => "“Creativity takes courage.” – Henri Matisse",
        "Law" => "“Justice cannot be for one side alone, but must be for both.”",
        "Architecture" => "“We shape our buildings; thereafter they shape us.”",
        "Management (BBA/MBA)" => "“Leadership is the capacity to translate vision into reality.”",
        _ => "“The expert in anything was once a beginner.”",
    }
}

/// Broadcast languages supported by the voice pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Kannada,
    Tamil,
    Telugu,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Hindi,
        Language::Kannada,
        Language::Tamil,
        Language::Telugu,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Kannada => "kn",
            Language::Tamil => "ta",
            Language::Telugu => "te",
        }
    }

    /// BCP-47 tag for speech synthesis.
    pub fn locale(&self) -> &'static str {
        match self {
            Language::English => "en-IN",
            Language::Hindi => "hi-IN",
            Language::Kannada => "kn-IN",
            Language::Tamil => "ta-IN",
            Language::Telugu => "te-IN",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.code() == code || format!("{:?}", l).eq_ignore_ascii_case(&code))
    }
}
