//! Voice session management
//!
//! Owns the bot's single logical connection to a Discord voice channel and
//! serializes playback against it.

mod backend;
mod session;

pub use backend::{SongbirdBackend, VoiceBackend, VoiceCall, VoiceTrack};
pub use session::VoiceSessionManager;
