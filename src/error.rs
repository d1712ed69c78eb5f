//! Error types for the Vocalink gateway

use thiserror::Error;

/// Result type alias for Vocalink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Vocalink gateway
///
/// Command handlers render these to a single user-visible message at the
/// router boundary; only `Config` is fatal, and only at startup.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing secret, fatal at startup)
    #[error("configuration error: {0}")]
    Config(String),

    /// Activation requested by a user who is not in a voice channel
    #[error("you need to be in a voice channel to activate voice features")]
    NotInVoiceChannel,

    /// Deactivation or playback control with no active voice session
    #[error("no active voice session")]
    NoActiveSession,

    /// Discord voice connection attempt failed
    #[error("voice connection error: {0}")]
    Connection(String),

    /// Remote LLM/TTS/STS call failed
    #[error("upstream error: {0}")]
    Upstream(String),

    /// `repeat` invoked with a missing or unusable attachment
    #[error("invalid attachment: {0}")]
    InvalidAttachment(String),

    /// Voice driver refused a playback control operation
    #[error("playback error: {0}")]
    Playback(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages_are_readable() {
        assert_eq!(
            Error::NotInVoiceChannel.to_string(),
            "you need to be in a voice channel to activate voice features"
        );
        assert_eq!(Error::NoActiveSession.to_string(), "no active voice session");
        assert_eq!(
            Error::InvalidAttachment("please attach an MP3 file".to_string()).to_string(),
            "invalid attachment: please attach an MP3 file"
        );
    }

    #[test]
    fn upstream_error_carries_detail() {
        let err = Error::Upstream("ElevenLabs TTS error 401: unauthorized".to_string());
        assert!(err.to_string().contains("401"));
    }
}
