//! Spoken briefings: optional translation, then speech synthesis.

pub mod google;

use crate::engine::narration::Language;
use crate::provider::{Degraded, Provider, ProviderError};
use base64::Engine as _;
use serde::Serialize;

#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language) -> Result<String, ProviderError>;
}

#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns encoded audio (MP3).
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBriefing {
    pub language: Language,
    pub text: String,
    /// Set when translation failed and `text` is the untranslated script.
    pub translation_fallback: bool,
    #[serde(skip)]
    pub audio: Degraded<Vec<u8>>,
}

impl RenderedBriefing {
    pub fn audio_base64(&self) -> Degraded<String> {
        self.audio
            .clone()
            .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes))
    }
}

pub async fn render_briefing(
    script: &str,
    language: Language,
    translator: Option<&dyn Translator>,
    synthesizer: Option<&dyn SpeechSynthesizer>,
) -> RenderedBriefing {
    let mut text = script.to_string();
    let mut translation_fallback = false;

    if language != Language::English {
        match translator {
            Some(t) => match t.translate(script, language).await {
                Ok(translated) => text = translated,
                Err(err) => {
                    tracing::warn!(
                        provider = %Provider::GoogleTranslate,
                        language = language.code(),
                        error = %err,
                        "translation failed; narrating original script"
                    );
                    translation_fallback = true;
                }
            },
            None => translation_fallback = true,
        }
    }

    let audio = match synthesizer {
        Some(s) => s.synthesize(&text, language).await.into(),
        None => Degraded::not_configured("Voice synthesis"),
    };

    RenderedBriefing {
        language,
        text,
        translation_fallback,
        audio,
    }
}
