//! Vocalink - Discord voice companion gateway
//!
//! Proxies chat subcommands to a remote language model and a remote speech
//! service, optionally streaming the synthesized audio into a Discord voice
//! channel. All substantive work happens upstream; this crate is the
//! command-routing glue plus one stateful piece, the voice session manager.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                Discord (serenity)             │
//! └───────────────────────┬──────────────────────┘
//!                         │
//! ┌───────────────────────▼──────────────────────┐
//! │               Command Router                  │
//! │  activate │ deactivate │ say │ talk │ chat │ repeat
//! └──────┬─────────────────┬─────────────┬───────┘
//!        │                 │             │
//! ┌──────▼──────┐   ┌──────▼──────┐  ┌───▼───────────┐
//! │ ChatGateway │   │SpeechGateway│  │ VoiceSession   │
//! │  (OpenAI)   │   │ (ElevenLabs)│  │   Manager      │
//! └─────────────┘   └─────────────┘  │  (songbird)    │
//!                                    └────────────────┘
//! ```

pub mod bot;
pub mod config;
pub mod error;
pub mod gateway;
pub mod router;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use gateway::{AudioPayload, ChatGateway, SpeechGateway};
pub use router::{Command, Router, help_text, validate_attachment_name};
pub use voice::{SongbirdBackend, VoiceBackend, VoiceCall, VoiceSessionManager, VoiceTrack};
