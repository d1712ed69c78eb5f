//! Voice session state machine and audio hand-off

use std::sync::Arc;

use serenity::model::id::{ChannelId, GuildId};
use songbird::Songbird;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use super::backend::{SongbirdBackend, VoiceBackend, VoiceCall, VoiceTrack};
use crate::gateway::AudioPayload;
use crate::{Error, Result};

/// The live voice connection and its in-flight track, if any
struct ActiveSession<C: VoiceCall> {
    guild_id: GuildId,
    call: C,
    current: Option<C::Track>,
}

/// Tracks the bot's single voice connection and serializes playback
///
/// At most one session exists process-wide; all mutation goes through the
/// internal mutex, so concurrent activate/deactivate/playback calls cannot
/// race on the connection handle.
pub struct VoiceSessionManager<B: VoiceBackend = SongbirdBackend> {
    backend: B,
    session: Mutex<Option<ActiveSession<B::Call>>>,
}

impl VoiceSessionManager {
    /// Create a session manager over a shared songbird driver
    #[must_use]
    pub fn new(driver: Arc<Songbird>) -> Self {
        Self::with_backend(SongbirdBackend::new(driver))
    }
}

impl<B: VoiceBackend> VoiceSessionManager<B> {
    /// Create a session manager over an arbitrary voice backend
    #[must_use]
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            session: Mutex::new(None),
        }
    }

    /// Whether a voice session is currently active
    pub async fn is_active(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Connect to a voice channel and mark the session active
    ///
    /// A second activation never leaves the previous connection dangling: the
    /// prior session is explicitly disconnected before the new join.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the voice join fails.
    pub async fn activate(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<()> {
        let mut slot = self.session.lock().await;

        if let Some(previous) = slot.take() {
            tracing::info!(guild_id = %previous.guild_id, "replacing active voice session");
            if let Some(track) = previous.current {
                track.stop();
            }
            if let Err(e) = self.backend.leave(previous.guild_id).await {
                tracing::warn!(error = %e, "failed to disconnect previous voice session");
            }
        }

        let call = self.backend.join(guild_id, channel_id).await?;

        *slot = Some(ActiveSession {
            guild_id,
            call,
            current: None,
        });

        tracing::info!(%guild_id, %channel_id, "voice session activated");
        Ok(())
    }

    /// Disconnect the active session and clear state
    ///
    /// # Errors
    ///
    /// Returns `Error::NoActiveSession` if nothing is active (no state is
    /// mutated in that case), or `Error::Connection` if leaving fails.
    pub async fn deactivate(&self) -> Result<()> {
        let mut slot = self.session.lock().await;

        let Some(session) = slot.take() else {
            return Err(Error::NoActiveSession);
        };

        if let Some(track) = session.current {
            track.stop();
        }

        self.backend.leave(session.guild_id).await?;

        tracing::info!(guild_id = %session.guild_id, "voice session deactivated");
        Ok(())
    }

    /// Play a clip in the active voice channel, waiting for it to finish
    ///
    /// A no-op when no session is active; playback is best-effort by design,
    /// and no transient file is created in that case. When active: a clip
    /// already playing is stopped first (last-request-wins, no queue), the
    /// payload is written to a transient file for the driver, and the call
    /// waits on the track-end signal before releasing the file. The session
    /// lock is not held across the wait, so a later call can pre-empt this
    /// clip mid-play.
    ///
    /// # Errors
    ///
    /// Returns error if the transient file cannot be written or the backend
    /// refuses the clip.
    pub async fn playback(&self, audio: &AudioPayload) -> Result<()> {
        let (finished, track_id, clip) = {
            let mut slot = self.session.lock().await;

            let Some(session) = slot.as_mut() else {
                tracing::debug!("playback skipped: no active voice session");
                return Ok(());
            };

            // Last request wins: a new clip always pre-empts the old one.
            if let Some(previous) = session.current.take() {
                previous.stop();
            }

            let clip = NamedTempFile::new()?;
            tokio::fs::write(clip.path(), audio.as_bytes()).await?;

            let (track, finished) = session.call.play(clip.path()).await?;
            let track_id = track.id();
            session.current = Some(track);

            tracing::debug!(audio_bytes = audio.len(), "voice playback started");
            (finished, track_id, clip)
        };

        finished.notified().await;
        drop(clip);

        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_mut() {
            if session
                .current
                .as_ref()
                .is_some_and(|current| current.id() == track_id)
            {
                session.current = None;
            }
        }

        tracing::debug!("voice playback finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_inactive() {
        let manager = VoiceSessionManager::new(Songbird::serenity());
        assert!(!manager.is_active().await);
    }

    #[tokio::test]
    async fn playback_without_session_is_a_noop() {
        let manager = VoiceSessionManager::new(Songbird::serenity());
        let clip = AudioPayload::new(vec![0xff, 0xfb, 0x90]).unwrap();

        manager.playback(&clip).await.unwrap();
        assert!(!manager.is_active().await);
    }

    #[tokio::test]
    async fn deactivate_without_session_reports_no_active_session() {
        let manager = VoiceSessionManager::new(Songbird::serenity());

        assert!(matches!(
            manager.deactivate().await,
            Err(Error::NoActiveSession)
        ));
        assert!(!manager.is_active().await);
    }
}
