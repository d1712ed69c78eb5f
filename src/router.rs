//! Command routing for chat-platform subcommands

use serenity::all::{Context, CreateAttachment, CreateMessage, Message};
use serenity::model::id::{ChannelId, GuildId};

use crate::config::Config;
use crate::gateway::{AudioPayload, ChatGateway, SpeechGateway};
use crate::voice::VoiceSessionManager;
use crate::{Error, Result};

/// A recognized chat subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Join the author's voice channel and activate playback
    Activate,
    /// Disconnect from the voice channel
    Deactivate,
    /// Synthesize the given text
    Say { text: String },
    /// Ask the language model, with synthesized reply
    Talk { question: String },
    /// Ask the language model, text only
    Chat { message: String },
    /// Convert an attached clip to the bot's voice
    Repeat,
    /// Unrecognized or incomplete input under the prefix
    Help,
}

impl Command {
    /// Parse a raw message into a subcommand
    ///
    /// Returns `None` when the message is not addressed to the bot at all.
    /// Anything under the prefix that is not a complete, recognized
    /// subcommand parses as [`Command::Help`].
    #[must_use]
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let rest = content.trim().strip_prefix(prefix)?;
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            // Prefix must be its own word: "!vocab" is not "!voca b".
            return None;
        }

        let rest = rest.trim_start();
        let (subcommand, args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(sub, args)| (sub, args.trim()));

        Some(match subcommand {
            "activate" => Self::Activate,
            "deactivate" => Self::Deactivate,
            "say" if !args.is_empty() => Self::Say {
                text: args.to_string(),
            },
            "talk" if !args.is_empty() => Self::Talk {
                question: args.to_string(),
            },
            "chat" if !args.is_empty() => Self::Chat {
                message: args.to_string(),
            },
            "repeat" => Self::Repeat,
            _ => Self::Help,
        })
    }

    /// Subcommand name for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Say { .. } => "say",
            Self::Talk { .. } => "talk",
            Self::Chat { .. } => "chat",
            Self::Repeat => "repeat",
            Self::Help => "help",
        }
    }

    /// Human-readable prefix for failure reports
    fn failure_context(&self) -> &'static str {
        match self {
            Self::Activate => "Error during voice activation",
            Self::Deactivate => "Error during voice deactivation",
            Self::Say { .. } => "Error generating audio",
            Self::Talk { .. } => "Error processing question",
            Self::Chat { .. } => "Error during chat",
            Self::Repeat => "Error converting audio",
            Self::Help => "Error",
        }
    }
}

/// Static help message listing the valid subcommands
#[must_use]
pub fn help_text(prefix: &str) -> String {
    format!(
        "Invalid command. Use one of: `{prefix} activate`, `{prefix} deactivate`, \
         `{prefix} say <text>`, `{prefix} talk <question>`, `{prefix} chat <message>`, \
         `{prefix} repeat` (with an MP3 file attached)."
    )
}

/// Check that a `repeat` command carries a usable audio attachment
///
/// `filename` is the first attachment's name, or `None` when the message has
/// no attachments. Runs before any gateway call.
///
/// # Errors
///
/// Returns `Error::InvalidAttachment` for a missing attachment or a
/// non-MP3 filename.
pub fn validate_attachment_name(filename: Option<&str>) -> Result<()> {
    let Some(name) = filename else {
        return Err(Error::InvalidAttachment(
            "please attach an MP3 audio file with your command".to_string(),
        ));
    };

    if !name.to_lowercase().ends_with(".mp3") {
        return Err(Error::InvalidAttachment(
            "please provide an MP3 file".to_string(),
        ));
    }

    Ok(())
}

/// Dispatches chat subcommands to the gateways and the voice session manager
pub struct Router {
    prefix: String,
    activation_phrase: String,
    chat: ChatGateway,
    speech: SpeechGateway,
    sessions: VoiceSessionManager,
}

impl Router {
    /// Build a router and its gateways from configuration
    ///
    /// # Errors
    ///
    /// Returns error if any gateway rejects its configuration.
    pub fn new(config: &Config, sessions: VoiceSessionManager) -> Result<Self> {
        let chat = ChatGateway::new(
            config.openai_api_key.clone(),
            config.llm_model.clone(),
            config.persona.clone(),
        )?;

        let speech = SpeechGateway::new(
            config.elevenlabs_api_key.clone(),
            config.voice_id.clone(),
            config.tts_model.clone(),
            config.sts_model.clone(),
            config.output_format.clone(),
        )?;

        Ok(Self {
            prefix: config.command_prefix.clone(),
            activation_phrase: config.activation_phrase.clone(),
            chat,
            speech,
            sessions,
        })
    }

    /// Route one incoming message, reporting any failure back to the channel
    ///
    /// Every failure inside a handler is caught here and rendered as a single
    /// user-visible message; nothing propagates further.
    pub async fn dispatch(&self, ctx: &Context, msg: &Message) {
        if msg.author.bot {
            return;
        }

        let Some(command) = Command::parse(&self.prefix, &msg.content) else {
            return;
        };

        tracing::debug!(
            command = command.name(),
            author = %msg.author.name,
            "dispatching command"
        );

        msg.channel_id.broadcast_typing(&ctx.http).await.ok();

        let result = match &command {
            Command::Activate => self.handle_activate(ctx, msg).await,
            Command::Deactivate => self.handle_deactivate(ctx, msg).await,
            Command::Say { text } => self.handle_say(ctx, msg, text).await,
            Command::Talk { question } => self.handle_talk(ctx, msg, question).await,
            Command::Chat { message } => self.handle_chat(ctx, msg, message).await,
            Command::Repeat => self.handle_repeat(ctx, msg).await,
            Command::Help => {
                self.send_text(ctx, msg.channel_id, &help_text(&self.prefix))
                    .await;
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!(command = command.name(), error = %e, "command failed");
            self.send_text(
                ctx,
                msg.channel_id,
                &format!("{}: {e}", command.failure_context()),
            )
            .await;
        }
    }

    async fn handle_activate(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let (guild_id, voice_channel) = author_voice_channel(ctx, msg)?;

        self.sessions.activate(guild_id, voice_channel).await?;

        let audio = self.speech.synthesize(&self.activation_phrase).await?;
        self.send_file(ctx, msg.channel_id, "activation.mp3", &audio)
            .await;
        self.sessions.playback(&audio).await?;

        self.send_text(
            ctx,
            msg.channel_id,
            "Voice activation successful. Connected to voice channel.",
        )
        .await;
        Ok(())
    }

    async fn handle_deactivate(&self, ctx: &Context, msg: &Message) -> Result<()> {
        self.sessions.deactivate().await?;
        self.send_text(
            ctx,
            msg.channel_id,
            "Voice deactivated and disconnected from voice channel.",
        )
        .await;
        Ok(())
    }

    async fn handle_say(&self, ctx: &Context, msg: &Message, text: &str) -> Result<()> {
        let audio = self.speech.synthesize(text).await?;

        self.send_text(ctx, msg.channel_id, &format!("📝 {text}")).await;
        self.send_file(ctx, msg.channel_id, "speech.mp3", &audio).await;
        self.play_or_note(ctx, msg.channel_id, &audio).await
    }

    async fn handle_talk(&self, ctx: &Context, msg: &Message, question: &str) -> Result<()> {
        let reply = self.chat.generate_reply(question).await?;
        let audio = self.speech.synthesize(&reply).await?;

        self.send_text(ctx, msg.channel_id, &reply).await;
        self.send_file(ctx, msg.channel_id, "response.mp3", &audio).await;
        self.play_or_note(ctx, msg.channel_id, &audio).await
    }

    async fn handle_chat(&self, ctx: &Context, msg: &Message, message: &str) -> Result<()> {
        let reply = self.chat.generate_reply(message).await?;
        self.send_text(ctx, msg.channel_id, &reply).await;
        Ok(())
    }

    async fn handle_repeat(&self, ctx: &Context, msg: &Message) -> Result<()> {
        validate_attachment_name(msg.attachments.first().map(|a| a.filename.as_str()))?;

        let attachment = &msg.attachments[0];
        let source = attachment
            .download()
            .await
            .map_err(|e| Error::Upstream(format!("attachment download failed: {e}")))?;

        let audio = self.speech.convert(source).await?;

        self.send_text(ctx, msg.channel_id, "Here's your audio in my voice:")
            .await;
        self.send_file(ctx, msg.channel_id, "repeated_audio.mp3", &audio)
            .await;
        self.play_or_note(ctx, msg.channel_id, &audio).await
    }

    /// Play the clip if a session is active, otherwise note that voice is off
    async fn play_or_note(
        &self,
        ctx: &Context,
        channel_id: ChannelId,
        audio: &AudioPayload,
    ) -> Result<()> {
        if self.sessions.is_active().await {
            self.sessions.playback(audio).await?;
        } else {
            self.send_text(
                ctx,
                channel_id,
                &format!(
                    "Note: voice playback is not active. Use `{} activate` to enable \
                     voice channel playback.",
                    self.prefix
                ),
            )
            .await;
        }
        Ok(())
    }

    async fn send_text(&self, ctx: &Context, channel_id: ChannelId, content: &str) {
        if let Err(e) = channel_id.say(&ctx.http, content).await {
            tracing::warn!(%channel_id, error = %e, "failed to send message");
        }
    }

    async fn send_file(
        &self,
        ctx: &Context,
        channel_id: ChannelId,
        filename: &str,
        audio: &AudioPayload,
    ) {
        let attachment = CreateAttachment::bytes(audio.as_bytes().to_vec(), filename);
        let builder = CreateMessage::new().add_file(attachment);

        if let Err(e) = channel_id.send_message(&ctx.http, builder).await {
            tracing::warn!(%channel_id, filename, error = %e, "failed to send attachment");
        }
    }
}

/// Resolve the message author's current voice channel from the guild cache
fn author_voice_channel(ctx: &Context, msg: &Message) -> Result<(GuildId, ChannelId)> {
    let guild = msg.guild(&ctx.cache).ok_or(Error::NotInVoiceChannel)?;

    let voice_channel = guild
        .voice_states
        .get(&msg.author.id)
        .and_then(|state| state.channel_id)
        .ok_or(Error::NotInVoiceChannel)?;

    Ok((guild.id, voice_channel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_unrelated_messages() {
        assert_eq!(Command::parse("!voca", "hello everyone"), None);
        assert_eq!(Command::parse("!voca", ""), None);
        // Prefix must be a whole word
        assert_eq!(Command::parse("!voca", "!vocabulary say hi"), None);
    }

    #[test]
    fn parse_recognizes_every_subcommand() {
        assert_eq!(Command::parse("!voca", "!voca activate"), Some(Command::Activate));
        assert_eq!(Command::parse("!voca", "!voca deactivate"), Some(Command::Deactivate));
        assert_eq!(
            Command::parse("!voca", "!voca say hello there"),
            Some(Command::Say {
                text: "hello there".to_string()
            })
        );
        assert_eq!(
            Command::parse("!voca", "!voca talk what is your favorite game"),
            Some(Command::Talk {
                question: "what is your favorite game".to_string()
            })
        );
        assert_eq!(
            Command::parse("!voca", "!voca chat how are you"),
            Some(Command::Chat {
                message: "how are you".to_string()
            })
        );
        assert_eq!(Command::parse("!voca", "!voca repeat"), Some(Command::Repeat));
    }

    #[test]
    fn parse_falls_back_to_help() {
        assert_eq!(Command::parse("!voca", "!voca"), Some(Command::Help));
        assert_eq!(Command::parse("!voca", "!voca dance"), Some(Command::Help));
        // Argument-taking subcommands with no argument
        assert_eq!(Command::parse("!voca", "!voca say"), Some(Command::Help));
        assert_eq!(Command::parse("!voca", "!voca talk  "), Some(Command::Help));
        assert_eq!(Command::parse("!voca", "!voca chat"), Some(Command::Help));
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        assert_eq!(
            Command::parse("!voca", "  !voca   say   hi  "),
            Some(Command::Say {
                text: "hi".to_string()
            })
        );
    }

    #[test]
    fn help_text_lists_all_subcommands() {
        let help = help_text("!voca");
        for subcommand in ["activate", "deactivate", "say", "talk", "chat", "repeat"] {
            assert!(help.contains(subcommand), "help missing {subcommand}");
        }
    }

    #[test]
    fn missing_attachment_is_invalid() {
        assert!(matches!(
            validate_attachment_name(None),
            Err(Error::InvalidAttachment(_))
        ));
    }

    #[test]
    fn non_mp3_attachment_is_invalid() {
        assert!(matches!(
            validate_attachment_name(Some("notes.txt")),
            Err(Error::InvalidAttachment(_))
        ));
        assert!(matches!(
            validate_attachment_name(Some("clip.wav")),
            Err(Error::InvalidAttachment(_))
        ));
    }

    #[test]
    fn mp3_attachment_is_accepted_case_insensitively() {
        assert!(validate_attachment_name(Some("clip.mp3")).is_ok());
        assert!(validate_attachment_name(Some("CLIP.MP3")).is_ok());
    }
}
