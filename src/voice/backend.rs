//! Voice backend seam over the songbird driver

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::error::ControlError;
use songbird::input::{File as FileInput, Input};
use songbird::tracks::TrackHandle;
use songbird::{Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent};
use tokio::sync::Notify;

use crate::{Error, Result};

/// Connection management required of a voice backend
///
/// Songbird implements this in production; tests substitute a recording
/// double to observe disconnect and stop ordering.
#[async_trait]
pub trait VoiceBackend: Send + Sync + 'static {
    /// Live connection to one guild's voice channel
    type Call: VoiceCall;

    /// Join a voice channel
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<Self::Call>;

    /// Disconnect from a guild's voice channel
    async fn leave(&self, guild_id: GuildId) -> Result<()>;
}

/// Playback operations on a live voice connection
#[async_trait]
pub trait VoiceCall: Send + Sync + 'static {
    /// Handle to one in-flight track
    type Track: VoiceTrack;

    /// Start playing the clip at `path`
    ///
    /// The returned signal fires once, when the track ends, errors, or is
    /// stopped.
    async fn play(&self, path: &Path) -> Result<(Self::Track, Arc<Notify>)>;
}

/// Handle to one in-flight track
pub trait VoiceTrack: Send + Sync + 'static {
    /// Stop playback; harmless if the track already ended
    fn stop(&self);

    /// Identity for telling tracks apart
    fn id(&self) -> u128;
}

/// Production voice backend over the shared songbird driver
pub struct SongbirdBackend {
    driver: Arc<Songbird>,
}

impl SongbirdBackend {
    /// Wrap a shared songbird driver
    #[must_use]
    pub fn new(driver: Arc<Songbird>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl VoiceBackend for SongbirdBackend {
    type Call = SongbirdCall;

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<SongbirdCall> {
        let call = self
            .driver
            .join(guild_id, channel_id)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        Ok(SongbirdCall { call })
    }

    async fn leave(&self, guild_id: GuildId) -> Result<()> {
        self.driver
            .remove(guild_id)
            .await
            .map_err(|e| Error::Connection(e.to_string()))
    }
}

/// Live songbird call to one guild's voice channel
pub struct SongbirdCall {
    call: Arc<tokio::sync::Mutex<songbird::Call>>,
}

#[async_trait]
impl VoiceCall for SongbirdCall {
    type Track = SongbirdTrack;

    async fn play(&self, path: &Path) -> Result<(SongbirdTrack, Arc<Notify>)> {
        let input: Input = FileInput::new(path.to_path_buf()).into();
        let handle = {
            let mut call = self.call.lock().await;
            call.play_input(input)
        };

        let finished = Arc::new(Notify::new());
        let on_end = TrackEndNotifier {
            finished: Arc::clone(&finished),
        };

        match handle.add_event(Event::Track(TrackEvent::End), on_end) {
            Ok(()) => {}
            // Track ended before we could attach the handler.
            Err(ControlError::Finished) => finished.notify_one(),
            Err(e) => {
                handle.stop().ok();
                return Err(Error::Playback(e.to_string()));
            }
        }

        let on_error = TrackEndNotifier {
            finished: Arc::clone(&finished),
        };
        handle
            .add_event(Event::Track(TrackEvent::Error), on_error)
            .ok();

        Ok((SongbirdTrack { handle }, finished))
    }
}

/// Handle to one in-flight songbird track
pub struct SongbirdTrack {
    handle: TrackHandle,
}

impl VoiceTrack for SongbirdTrack {
    fn stop(&self) {
        // Fails only when the track already ended, which is the goal anyway.
        self.handle.stop().ok();
    }

    fn id(&self) -> u128 {
        self.handle.uuid().as_u128()
    }
}

/// Wakes the waiting playback call when its track ends or errors
struct TrackEndNotifier {
    finished: Arc<Notify>,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        self.finished.notify_one();
        None
    }
}
