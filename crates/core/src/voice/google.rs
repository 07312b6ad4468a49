use crate::config::Settings;
use crate::engine::narration::Language;
use crate::provider::{call_with_retry, Provider, ProviderError, RetryPolicy};
use crate::voice::{SpeechSynthesizer, Translator};
use anyhow::Context;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const TRANSLATE_URL: &str = "https://translation.googleapis.com/language/translate/v2";
const TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Google Cloud Translation (v2) and Text-to-Speech behind one API key.
#[derive(Debug, Clone)]
pub struct GoogleCloudVoice {
    http: reqwest::Client,
    api_key: String,
    translate_url: String,
    tts_url: String,
    retry: RetryPolicy,
}

impl GoogleCloudVoice {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_google_cloud_api_key()?.to_string();
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            http,
            api_key,
            translate_url: std::env::var("GOOGLE_TRANSLATE_URL")
                .unwrap_or_else(|_| TRANSLATE_URL.to_string()),
            tts_url: std::env::var("GOOGLE_TTS_URL").unwrap_or_else(|_| TTS_URL.to_string()),
            retry: RetryPolicy::from_env("GOOGLE_CLOUD"),
        })
    }

    async fn post<Req: Serialize, Res: for<'de> Deserialize<'de>>(
        &self,
        provider: Provider,
        url: &str,
        body: &Req,
    ) -> Result<Res, ProviderError> {
        let res = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(provider, &e))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(provider, &e))?;
        if !status.is_success() {
            return Err(ProviderError::from_status(provider, status, &text));
        }
        serde_json::from_str::<Res>(&text)
            .map_err(|e| ProviderError::decode(provider, format!("invalid response JSON: {e}")))
    }
}

#[async_trait::async_trait]
impl Translator for GoogleCloudVoice {
    async fn translate(&self, text: &str, target: Language) -> Result<String, ProviderError> {
        let body = TranslateRequest {
            q: text,
            target: target.code(),
            format: "text",
        };
        let res: TranslateResponse = call_with_retry(&self.retry, Provider::GoogleTranslate, || {
            self.post(Provider::GoogleTranslate, &self.translate_url, &body)
        })
        .await?;

        res.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ProviderError::decode(Provider::GoogleTranslate, "no translation returned"))
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GoogleCloudVoice {
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>, ProviderError> {
        let body = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: language.locale(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
            },
        };
        let res: SynthesizeResponse = call_with_retry(&self.retry, Provider::GoogleTts, || {
            self.post(Provider::GoogleTts, &self.tts_url, &body)
        })
        .await?;

        base64::engine::general_purpose::STANDARD
            .decode(res.audio_content.as_bytes())
            .map_err(|e| ProviderError::decode(Provider::GoogleTts, format!("bad audioContent: {e}")))
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig<'a>,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}
