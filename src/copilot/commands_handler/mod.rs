mod avatar_command;
mod disconnect_command;
mod help_command_factory;
mod join_command;
mod music_commands;
mod on_ready;
mod ping_command;
mod prefix_command;
mod record_command;
mod voice_server_update;

use avatar_command::*;
use disconnect_command::*;
use help_command_factory::*;
use join_command::*;
use music_commands::*;
use on_ready::*;
use ping_command::*;
use prefix_command::*;
use record_command::*;
use voice_server_update::*;

use super::super::components::*;
use super::*;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;

const NEW_LINE: &str = "\n";

async fn guild_only<C: ChatContext>(
    l10n: &L10n,
    ctx: &C,
    params: &CommandParams<'_>,
) -> Option<GuildId> {
    if params.guild_id.is_none() {
        ctx.say(
            params.channel_id,
            l10n.string("guild-only-command", fluent_args![]),
        )
        .await;
    }
    params.guild_id
}

async fn author_voice_channel<C: ChatContext>(
    l10n: &L10n,
    ctx: &C,
    params: &CommandParams<'_>,
) -> Option<(GuildId, ChannelId)> {
    let guild_id = guild_only(l10n, ctx, params).await?;
    let Some(channel_id) = ctx.voice_channel(guild_id, params.author_id) else {
        ctx.say(
            params.channel_id,
            l10n.string("no-voice-channel", fluent_args![]),
        )
        .await;
        return None;
    };
    Some((guild_id, channel_id))
}

pub struct CopilotCommandsHandlerConstructor {
    pub prefix: Prefix,
    pub engine: Arc<dyn PlaybackEngine>,
    pub bridge: Arc<VoiceSessionBridge>,
    pub recorders: Arc<GuildsRecorders>,
    pub play_options: PlayOptions,
    pub l10n: L10n,
}

impl CopilotCommandsHandlerConstructor {
    pub fn build(self) -> Handler {
        Handler {
            on_ready: Box::new(CopilotOnReady {
                bridge: self.bridge.clone(),
                l10n: self.l10n.clone(),
            }),
            on_voice_server_update: Box::new(CopilotVoiceServerUpdate {
                bridge: self.bridge.clone(),
                recorders: self.recorders.clone(),
            }),
            router: self.router(),
        }
    }

    fn unknown_command(&self) -> PrintTextCommand {
        PrintTextCommand {
            help_info: None,
            text: self.l10n.string("unknown-command", fluent_args![]),
        }
    }

    fn music_group<C: ChatContext + 'static>(&self) -> CommandGroup<C> {
        let control = |command: PlayerCommand, success_msg_id: &'static str| PlayerControlCommand {
            command,
            success_msg_id,
            bridge: self.bridge.clone(),
            l10n: self.l10n.clone(),
        };
        CommandGroup {
            help_info: Some(HelpInfo {
                header_suffix: Some(
                    self.l10n
                        .string("music-command-help-suffix", fluent_args![]),
                ),
                description: self
                    .l10n
                    .string("music-command-help-description", fluent_args![]),
            }),
            table: CommandTable::new(self.unknown_command())
                .with(
                    "play",
                    PlayMusicCommand {
                        engine: self.engine.clone(),
                        bridge: self.bridge.clone(),
                        recorders: self.recorders.clone(),
                        play_options: self.play_options,
                        l10n: self.l10n.clone(),
                    },
                )
                .with(
                    "pause",
                    control(PlayerCommand::Pause, "music-pause-command-success"),
                )
                .with(
                    "resume",
                    control(PlayerCommand::Resume, "music-resume-command-success"),
                )
                .with(
                    "stop",
                    control(PlayerCommand::Stop, "music-stop-command-success"),
                ),
        }
    }

    pub fn router<C: ChatContext + 'static>(&self) -> CommandRouter<C> {
        let table = CommandTable::new(self.unknown_command())
            .with(
                "ping",
                PingCommand {
                    l10n: self.l10n.clone(),
                },
            )
            .with(
                "prefix",
                PrefixCommand {
                    prefix: self.prefix.clone(),
                    l10n: self.l10n.clone(),
                },
            )
            .with(
                "join",
                JoinCommand {
                    bridge: self.bridge.clone(),
                    recorders: self.recorders.clone(),
                    l10n: self.l10n.clone(),
                },
            )
            .with(
                "disconnect",
                DisconnectCommand {
                    bridge: self.bridge.clone(),
                    recorders: self.recorders.clone(),
                    l10n: self.l10n.clone(),
                },
            )
            .with(
                "avatar",
                AvatarCommand {
                    l10n: self.l10n.clone(),
                },
            )
            .with(
                "record",
                RecordCommand {
                    bridge: self.bridge.clone(),
                    recorders: self.recorders.clone(),
                    l10n: self.l10n.clone(),
                },
            )
            .with("music", self.music_group());
        let help = help_command(&self.l10n, table.help_entries());
        CommandRouter {
            prefix: self.prefix.clone(),
            table: table.with("help", help),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use serenity::model::id::UserId;

    struct Bot {
        engine: Arc<MockEngine>,
        transport: Arc<MockTransport>,
        bridge: Arc<VoiceSessionBridge>,
        router: CommandRouter<TestChat>,
        _output: tempfile::TempDir,
    }

    fn start_bot(engine: MockEngine) -> Bot {
        let output = tempfile::tempdir().unwrap();
        let engine = Arc::new(engine);
        let transport = Arc::new(MockTransport::default());
        let bridge = Arc::new(VoiceSessionBridge::new(
            engine.clone(),
            transport.clone(),
            8,
        ));
        let recorders = Arc::new(GuildsRecorders::new(
            transport.clone(),
            output.path().to_path_buf(),
        ));
        let router = CopilotCommandsHandlerConstructor {
            prefix: Prefix::new("!c"),
            engine: engine.clone(),
            bridge: bridge.clone(),
            recorders,
            play_options: PlayOptions { volume: 80 },
            l10n: test_l10n(),
        }
        .router();
        Bot {
            engine,
            transport,
            bridge,
            router,
            _output: output,
        }
    }

    fn in_voice() -> TestChat {
        TestChat::default().in_voice(TEST_GUILD, TEST_AUTHOR, 5)
    }

    #[tokio::test]
    async fn answers_ping_and_unknown() {
        let bot = start_bot(MockEngine::default());
        let chat = TestChat::default();
        bot.router.dispatch(&chat, &message("!c ping")).await;
        bot.router.dispatch(&chat, &message("!c bogus")).await;
        bot.router.dispatch(&chat, &message("x ping")).await;
        bot.router.dispatch(&chat, &message("!c music")).await;
        assert_eq!(
            chat.replies(),
            vec!["pong", "unknown command", "unknown command"]
        );
    }

    #[tokio::test]
    async fn shows_and_changes_prefix() {
        let bot = start_bot(MockEngine::default());
        let chat = TestChat::default();
        bot.router.dispatch(&chat, &message("!c prefix")).await;
        bot.router.dispatch(&chat, &message("!c prefix ?")).await;
        bot.router.dispatch(&chat, &message("? prefix")).await;
        assert_eq!(
            chat.replies(),
            vec!["prefix is **!c**", "prefix set to **?**", "prefix is **?**"]
        );
    }

    #[tokio::test]
    async fn avatar_prefers_first_mention() {
        let bot = start_bot(MockEngine::default());
        let chat = TestChat::default();
        let mut msg = message("!c avatar @someone");
        msg.mentions = vec![UserId(99), UserId(100)];
        bot.router.dispatch(&chat, &msg).await;
        bot.router.dispatch(&chat, &message("!c avatar")).await;
        assert_eq!(
            chat.replies(),
            vec![
                "https://cdn.example/avatars/99.png",
                "https://cdn.example/avatars/7.png"
            ]
        );
    }

    #[tokio::test]
    async fn help_lists_commands() {
        let bot = start_bot(MockEngine::default());
        let chat = TestChat::default();
        bot.router.dispatch(&chat, &message("!c help")).await;
        let help = &chat.replies()[0];
        assert!(help.starts_with("**Copilot Help**"));
        for verb in ["ping", "prefix", "join", "disconnect", "avatar", "record"] {
            assert!(help.contains(&format!("`{verb}")), "{verb} missing");
        }
        assert!(help.contains("`music play <query> | pause | resume | stop`"));
    }

    #[tokio::test]
    async fn play_loads_query_verbatim_and_queues_until_credentials() {
        let bot = start_bot(MockEngine::with_tracks(&["Lofi Beats"]));
        let chat = in_voice();
        bot.router
            .dispatch(&chat, &message("!c music play lofi  beats"))
            .await;
        assert_eq!(chat.replies(), vec!["Now playing Lofi Beats."]);
        assert_eq!(bot.transport.joins(), vec![(TEST_GUILD, 5)]);
        assert_eq!(
            bot.engine.calls(),
            vec![EngineCall::LoadTracks("lofi  beats".to_string())]
        );

        bot.bridge.on_ready("session".to_string()).await;
        bot.bridge
            .on_voice_server_update(GuildId(TEST_GUILD), "tok".into(), Some("ep".into()))
            .await
            .unwrap();
        assert_eq!(
            bot.engine.calls().last(),
            Some(&EngineCall::Play(TEST_GUILD, "track-0".to_string(), 80))
        );
    }

    #[tokio::test]
    async fn play_needs_query_results_and_voice_channel() {
        let bot = start_bot(MockEngine::default());
        bot.router.dispatch(&in_voice(), &message("!c music play")).await;
        let chat = in_voice();
        bot.router
            .dispatch(&chat, &message("!c music play nothing"))
            .await;
        assert_eq!(chat.replies(), vec!["nothing found for nothing"]);

        let bot = start_bot(MockEngine::with_tracks(&["Song"]));
        let chat = TestChat::default();
        bot.router.dispatch(&chat, &message("!c music play song")).await;
        assert_eq!(chat.replies(), vec!["join a voice channel first"]);
        assert!(bot.transport.joins().is_empty());
    }

    #[tokio::test]
    async fn player_controls_need_a_session() {
        let bot = start_bot(MockEngine::default());
        let chat = in_voice();
        bot.router.dispatch(&chat, &message("!c music pause")).await;
        bot.router.dispatch(&chat, &message("!c join")).await;
        bot.bridge.on_ready("session".to_string()).await;
        bot.bridge
            .on_voice_server_update(GuildId(TEST_GUILD), "tok".into(), Some("ep".into()))
            .await
            .unwrap();
        bot.router.dispatch(&chat, &message("!c music pause")).await;
        bot.router.dispatch(&chat, &message("!c music resume")).await;
        bot.router.dispatch(&chat, &message("!c music stop")).await;
        assert_eq!(
            chat.replies(),
            vec![
                "nothing is playing here",
                "joined <#5>",
                "music paused",
                "music resumed",
                "stopped music"
            ]
        );
        assert_eq!(
            bot.engine.calls()[1..],
            [
                EngineCall::SetPaused(TEST_GUILD, true),
                EngineCall::SetPaused(TEST_GUILD, false),
                EngineCall::Stop(TEST_GUILD)
            ]
        );
    }

    #[tokio::test]
    async fn record_then_disconnect_saves_files() {
        let bot = start_bot(MockEngine::default());
        let chat = in_voice();
        bot.router.dispatch(&chat, &message("!c record")).await;
        bot.router
            .dispatch(&chat, &message("!c music play song"))
            .await;
        bot.transport.push_packet(
            TEST_GUILD,
            Packet {
                source_id: 11,
                sequence: 1,
                timestamp: 0,
                payload: vec![0xfc, 0xff, 0xfe],
            },
        );
        bot.router.dispatch(&chat, &message("!c disconnect")).await;
        bot.router.dispatch(&chat, &message("!c disconnect")).await;

        let replies = chat.replies();
        assert!(replies[0].starts_with("recording into `"));
        assert_eq!(replies[1], "recording is running here, disconnect first");
        assert_eq!(replies[2], "recording saved: 1 speakers, 1 frames");
        assert_eq!(replies[3], "not connected to a voice channel");
        assert!(bot.engine.calls().is_empty());
    }

    #[tokio::test]
    async fn record_is_refused_while_music_session_exists() {
        let bot = start_bot(MockEngine::default());
        let chat = in_voice();
        bot.router.dispatch(&chat, &message("!c join")).await;
        bot.router.dispatch(&chat, &message("!c record")).await;
        assert_eq!(chat.replies()[1], "music is playing here, disconnect first");
    }
}
