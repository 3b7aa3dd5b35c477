use super::*;

pub(super) struct PingCommand {
    pub(super) l10n: L10n,
}

#[async_trait]
impl<C: ChatContext> Command<C> for PingCommand {
    fn help_info(&self) -> Option<HelpInfo> {
        Some(HelpInfo {
            header_suffix: None,
            description: self
                .l10n
                .string("ping-command-help-description", fluent_args![]),
        })
    }
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        ctx.say(
            params.channel_id,
            self.l10n.string("ping-command-answer", fluent_args![]),
        )
        .await;
    }
}
