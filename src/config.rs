//! Configuration management for the Vocalink gateway

use crate::{Error, Result};

/// Default command prefix listened for in chat messages
pub const DEFAULT_PREFIX: &str = "!voca";

/// Default persona system prompt sent with every LLM request
const DEFAULT_PERSONA: &str = "You are Voca, a laid-back gamer who spends most \
of their time hanging out in this server's voice chat. Keep replies short, \
casual, and in character.";

/// Default phrase synthesized and played when a voice session activates
const DEFAULT_ACTIVATION_PHRASE: &str = "Vocalink online.";

/// Vocalink gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// `OpenAI` API key (chat completions)
    pub openai_api_key: String,

    /// `ElevenLabs` API key (TTS and speech-to-speech)
    pub elevenlabs_api_key: String,

    /// Discord bot token
    pub discord_token: String,

    /// Command prefix (e.g. `!voca`)
    pub command_prefix: String,

    /// LLM model identifier for chat completions
    pub llm_model: String,

    /// Persona system prompt for chat completions
    pub persona: String,

    /// `ElevenLabs` voice identity used for all synthesis
    pub voice_id: String,

    /// `ElevenLabs` TTS model
    pub tts_model: String,

    /// `ElevenLabs` speech-to-speech model
    pub sts_model: String,

    /// Output audio format requested from `ElevenLabs`
    pub output_format: String,

    /// Phrase spoken when a voice session activates
    pub activation_phrase: String,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any required secret is absent. This is a
    /// fatal startup condition, not a runtime one.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injectable variable lookup
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first missing required variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                Error::Config(format!("missing required environment variable: {key}"))
            })
        };
        let or_default = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            elevenlabs_api_key: required("ELEVENLABS_API_KEY")?,
            discord_token: required("DISCORD_TOKEN")?,
            command_prefix: or_default("VOCALINK_PREFIX", DEFAULT_PREFIX),
            llm_model: or_default("VOCALINK_LLM_MODEL", "gpt-4o-mini"),
            persona: or_default("VOCALINK_PERSONA", DEFAULT_PERSONA),
            voice_id: or_default("VOCALINK_VOICE_ID", "21m00Tcm4TlvDq8ikWAM"),
            tts_model: or_default("VOCALINK_TTS_MODEL", "eleven_multilingual_v2"),
            sts_model: or_default("VOCALINK_STS_MODEL", "eleven_multilingual_sts_v2"),
            output_format: or_default("VOCALINK_OUTPUT_FORMAT", "mp3_44100_128"),
            activation_phrase: or_default(
                "VOCALINK_ACTIVATION_PHRASE",
                DEFAULT_ACTIVATION_PHRASE,
            ),
        })
    }
}
