use super::*;

pub(super) struct RecordCommand {
    pub(super) bridge: Arc<VoiceSessionBridge>,
    pub(super) recorders: Arc<GuildsRecorders>,
    pub(super) l10n: L10n,
}

#[async_trait]
impl<C: ChatContext> Command<C> for RecordCommand {
    fn help_info(&self) -> Option<HelpInfo> {
        Some(HelpInfo {
            header_suffix: None,
            description: self
                .l10n
                .string("record-command-help-description", fluent_args![]),
        })
    }
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        let Some((guild_id, channel_id)) = author_voice_channel(&self.l10n, ctx, &params).await
        else {
            return;
        };
        let answer_msg = if self.bridge.has_session(guild_id).await {
            self.l10n.string("record-command-busy", fluent_args![])
        } else {
            match self.recorders.start(guild_id, channel_id).await {
                Ok(directory) => self.l10n.string(
                    "record-command-started",
                    fluent_args![
                        "directory" => directory.display().to_string()
                    ],
                ),
                Err(RecordError::AlreadyRecording) => {
                    self.l10n.string("record-command-already", fluent_args![])
                }
                Err(_) => self.l10n.string("record-command-failure", fluent_args![]),
            }
        };
        ctx.say(params.channel_id, answer_msg).await;
    }
}
