use super::*;
use serenity::prelude::Mentionable;

pub(super) struct JoinCommand {
    pub(super) bridge: Arc<VoiceSessionBridge>,
    pub(super) recorders: Arc<GuildsRecorders>,
    pub(super) l10n: L10n,
}

#[async_trait]
impl<C: ChatContext> Command<C> for JoinCommand {
    fn help_info(&self) -> Option<HelpInfo> {
        Some(HelpInfo {
            header_suffix: None,
            description: self
                .l10n
                .string("join-command-help-description", fluent_args![]),
        })
    }
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        let Some((guild_id, channel_id)) = author_voice_channel(&self.l10n, ctx, &params).await
        else {
            return;
        };
        let answer_msg = if self.recorders.is_recording(guild_id).await {
            self.l10n.string("music-command-recording", fluent_args![])
        } else {
            match self.bridge.join(guild_id, channel_id).await {
                Ok(_) => self.l10n.string(
                    "join-command-success",
                    fluent_args![
                        "channel" => channel_id.mention().to_string()
                    ],
                ),
                Err(_) => self.l10n.string("join-command-failure", fluent_args![]),
            }
        };
        ctx.say(params.channel_id, answer_msg).await;
    }
}
