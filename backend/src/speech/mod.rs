//! # Speech Synthesis Module
//!
//! Optional text-to-speech for spoken reminders. The speech service is
//! treated as unreliable and non-essential: every failure path degrades to
//! `None` so the mark-taken and request-help flows never block on audio.

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Voice used for synthesized reminders.
const VOICE_NAME: &str = "Kore";

/// The speech service gets a hard deadline; a reminder that arrives late is
/// worthless.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Synthesized audio as raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAudio {
    pub data: Vec<u8>,
}

/// A text-to-speech backend. Implementations return `None` on any failure;
/// callers skip playback rather than surfacing an error.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Option<SpeechAudio>;
}

/// Gemini TTS client over HTTP.
pub struct GeminiTts {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiTts {
    pub const DEFAULT_ENDPOINT: &'static str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-tts:generateContent";

    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(Self::DEFAULT_ENDPOINT.to_string(), api_key)
    }

    /// Construct against a specific endpoint (test servers).
    pub fn with_endpoint(endpoint: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            api_key,
        }
    }

    /// Construct from the `GEMINI_API_KEY` environment variable, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var("GEMINI_API_KEY").ok().map(Self::new)
    }
}

/// Request payload for a single-utterance audio generation call.
fn build_payload(text: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": text }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": VOICE_NAME }
                }
            }
        }
    })
}

/// Pull the inline base64 audio out of a generateContent response and
/// decode it. Any shape mismatch yields `None`.
fn extract_audio(response: &Value) -> Option<SpeechAudio> {
    let encoded = response
        .pointer("/candidates/0/content/parts/0/inlineData/data")?
        .as_str()?;
    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    Some(SpeechAudio { data })
}

#[async_trait]
impl SpeechSynthesizer for GeminiTts {
    async fn synthesize(&self, text: &str) -> Option<SpeechAudio> {
        let url = format!("{}?key={}", self.endpoint, self.api_key);

        let response = match self
            .client
            .post(&url)
            .json(&build_payload(text))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Speech service unreachable, skipping audio: {}", e);
                return None;
            }
        };

        let body: Value = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!("Speech service returned unparseable body, skipping audio: {}", e);
                return None;
            }
        };

        let audio = extract_audio(&body);
        if audio.is_none() {
            warn!("Speech service response carried no audio payload");
        } else {
            debug!("Synthesized {} bytes of audio", audio.as_ref().map_or(0, |a| a.data.len()));
        }
        audio
    }
}

/// Synthesizer used when no API key is configured: always degrades.
pub struct DisabledSpeech;

#[async_trait]
impl SpeechSynthesizer for DisabledSpeech {
    async fn synthesize(&self, _text: &str) -> Option<SpeechAudio> {
        debug!("Speech synthesis disabled, skipping audio");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_requests_audio_with_expected_voice() {
        let payload = build_payload("Hora do remédio, Maria!");
        assert_eq!(
            payload.pointer("/contents/0/parts/0/text").unwrap(),
            "Hora do remédio, Maria!"
        );
        assert_eq!(
            payload
                .pointer("/generationConfig/responseModalities/0")
                .unwrap(),
            "AUDIO"
        );
        assert_eq!(
            payload
                .pointer("/generationConfig/speechConfig/voiceConfig/prebuiltVoiceConfig/voiceName")
                .unwrap(),
            "Kore"
        );
    }

    #[test]
    fn test_extract_audio_decodes_inline_data() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"fake-pcm");
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "data": encoded } }] }
            }]
        });
        let audio = extract_audio(&response).unwrap();
        assert_eq!(audio.data, b"fake-pcm");
    }

    #[test]
    fn test_extract_audio_tolerates_unexpected_shapes() {
        assert!(extract_audio(&json!({})).is_none());
        assert!(extract_audio(&json!({ "candidates": [] })).is_none());
        assert!(extract_audio(&json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "%%%" } }] } }]
        }))
        .is_none());
    }

    #[tokio::test]
    async fn test_disabled_speech_returns_none() {
        assert!(DisabledSpeech.synthesize("anything").await.is_none());
    }
}
