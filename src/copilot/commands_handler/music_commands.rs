use super::*;

pub(super) struct PlayMusicCommand {
    pub(super) engine: Arc<dyn PlaybackEngine>,
    pub(super) bridge: Arc<VoiceSessionBridge>,
    pub(super) recorders: Arc<GuildsRecorders>,
    pub(super) play_options: PlayOptions,
    pub(super) l10n: L10n,
}

impl PlayMusicCommand {
    async fn play<C: ChatContext>(&self, ctx: &C, params: &CommandParams<'_>) -> String {
        let Some(guild_id) = params.guild_id else {
            return self.l10n.string("guild-only-command", fluent_args![]);
        };
        let query = params.text.trim();
        if query.is_empty() {
            return self
                .l10n
                .string("music-play-command-empty-query", fluent_args![]);
        }
        if self.recorders.is_recording(guild_id).await {
            return self.l10n.string("music-command-recording", fluent_args![]);
        }
        let tracks = match self.engine.load_tracks(query).await {
            Ok(tracks) => tracks,
            Err(error) => {
                error!("Loading tracks for {:?} failed: {}", query, error);
                return self
                    .l10n
                    .string("music-play-command-load-failure", fluent_args![]);
            }
        };
        let Some(track) = tracks.into_iter().next() else {
            return self.l10n.string(
                "music-play-command-no-results",
                fluent_args![
                    "query" => query
                ],
            );
        };
        debug!(
            "Loaded {:?} by {} ({} ms, {:?}) for {:?}.",
            track.title, track.author, track.length_ms, track.uri, query
        );
        let Some(channel_id) = ctx.voice_channel(guild_id, params.author_id) else {
            return self.l10n.string("no-voice-channel", fluent_args![]);
        };
        if self.bridge.join(guild_id, channel_id).await.is_err() {
            return self.l10n.string("join-command-failure", fluent_args![]);
        }
        let command = PlayerCommand::Play {
            track_id: track.id,
            options: self.play_options,
        };
        match self.bridge.submit(guild_id, command).await {
            Ok(submission) => {
                debug!("Play of {:?} on guild {}: {:?}.", track.title, guild_id, submission);
                self.l10n.string(
                    "music-play-command-now-playing",
                    fluent_args![
                        "title" => track.title
                    ],
                )
            }
            Err(error) => {
                error!("Play on guild {} failed: {}", guild_id, error);
                self.l10n.string("music-command-failure", fluent_args![])
            }
        }
    }
}

#[async_trait]
impl<C: ChatContext> Command<C> for PlayMusicCommand {
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        let answer_msg = self.play(ctx, &params).await;
        ctx.say(params.channel_id, answer_msg).await;
    }
}

/// Pause, resume and stop differ only in the player command and the reply.
pub(super) struct PlayerControlCommand {
    pub(super) command: PlayerCommand,
    pub(super) success_msg_id: &'static str,
    pub(super) bridge: Arc<VoiceSessionBridge>,
    pub(super) l10n: L10n,
}

#[async_trait]
impl<C: ChatContext> Command<C> for PlayerControlCommand {
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        let Some(guild_id) = guild_only(&self.l10n, ctx, &params).await else {
            return;
        };
        let answer_msg = match self.bridge.submit(guild_id, self.command.clone()).await {
            Ok(_) => self.l10n.string(self.success_msg_id, fluent_args![]),
            Err(SessionError::NotConnected(_)) => self
                .l10n
                .string("music-command-not-connected", fluent_args![]),
            Err(error) => {
                error!("{:?} on guild {} failed: {}", self.command, guild_id, error);
                self.l10n.string("music-command-failure", fluent_args![])
            }
        };
        ctx.say(params.channel_id, answer_msg).await;
    }
}
