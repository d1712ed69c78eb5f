//! Speech synthesis and voice-conversion gateways (ElevenLabs)

use futures::StreamExt;

use super::AudioPayload;
use crate::{Error, Result};

const ELEVENLABS_BASE: &str = "https://api.elevenlabs.io/v1";

#[derive(serde::Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Synthesizes and converts speech through the ElevenLabs streaming API
///
/// Both calls use a fixed voice identity, fixed models, and a fixed output
/// format, and accumulate the entire response stream into memory before
/// returning; nothing downstream ever consumes a partial clip.
pub struct SpeechGateway {
    client: reqwest::Client,
    api_key: String,
    voice_id: String,
    tts_model: String,
    sts_model: String,
    output_format: String,
}

impl SpeechGateway {
    /// Create a new speech gateway
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(
        api_key: String,
        voice_id: String,
        tts_model: String,
        sts_model: String,
        output_format: String,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for speech".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice_id,
            tts_model,
            sts_model,
            output_format,
        })
    }

    /// Synthesize text into a fully buffered audio clip
    ///
    /// # Errors
    ///
    /// Returns `Error::Upstream` if the remote call fails or yields no audio,
    /// including for empty or rejected input text.
    pub async fn synthesize(&self, text: &str) -> Result<AudioPayload> {
        let url = format!(
            "{ELEVENLABS_BASE}/text-to-speech/{}/stream?output_format={}",
            self.voice_id, self.output_format
        );

        let request = SynthesisRequest {
            text,
            model_id: &self.tts_model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "ElevenLabs TTS error {status}: {body}"
            )));
        }

        let payload = Self::buffer_stream(response).await?;
        tracing::debug!(text_len = text.len(), audio_bytes = payload.len(), "speech synthesized");
        Ok(payload)
    }

    /// Convert an uploaded audio clip to the gateway's voice
    ///
    /// The remote model validates that the input is acceptable audio; any
    /// rejection surfaces as `Error::Upstream`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Upstream` if the remote call fails or yields no audio.
    pub async fn convert(&self, source_audio: Vec<u8>) -> Result<AudioPayload> {
        let url = format!(
            "{ELEVENLABS_BASE}/speech-to-speech/{}/stream?output_format={}",
            self.voice_id, self.output_format
        );

        let source_len = source_audio.len();
        let audio_part = reqwest::multipart::Part::bytes(source_audio)
            .file_name("audio.mp3")
            .mime_str("audio/mpeg")
            .map_err(|e| Error::Upstream(format!("invalid audio part: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("audio", audio_part)
            .text("model_id", self.sts_model.clone());

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "ElevenLabs speech-to-speech error {status}: {body}"
            )));
        }

        let payload = Self::buffer_stream(response).await?;
        tracing::debug!(
            source_bytes = source_len,
            audio_bytes = payload.len(),
            "speech converted"
        );
        Ok(payload)
    }

    /// Accumulate a streamed response body into a complete payload
    async fn buffer_stream(response: reqwest::Response) -> Result<AudioPayload> {
        let mut stream = response.bytes_stream();
        let mut buffer = Vec::new();

        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        AudioPayload::new(buffer)
    }
}
