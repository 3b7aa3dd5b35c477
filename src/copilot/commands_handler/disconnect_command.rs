use super::*;

pub(super) struct DisconnectCommand {
    pub(super) bridge: Arc<VoiceSessionBridge>,
    pub(super) recorders: Arc<GuildsRecorders>,
    pub(super) l10n: L10n,
}

#[async_trait]
impl<C: ChatContext> Command<C> for DisconnectCommand {
    fn help_info(&self) -> Option<HelpInfo> {
        Some(HelpInfo {
            header_suffix: None,
            description: self
                .l10n
                .string("disconnect-command-help-description", fluent_args![]),
        })
    }
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        let Some(guild_id) = guild_only(&self.l10n, ctx, &params).await else {
            return;
        };
        // Leaving closes the packet stream, so the recorder can drain.
        let left = self.bridge.leave(guild_id).await;
        let answer_msg = match (self.recorders.finish(guild_id).await, left) {
            (Some(summary), _) => self.l10n.string(
                "disconnect-command-recording-saved",
                fluent_args![
                    "sources" => summary.saved,
                    "frames" => summary.frames
                ],
            ),
            (None, Ok(_)) => self
                .l10n
                .string("disconnect-command-success", fluent_args![]),
            (None, Err(_)) => self
                .l10n
                .string("disconnect-command-not-connected", fluent_args![]),
        };
        ctx.say(params.channel_id, answer_msg).await;
    }
}
