use super::*;

pub(super) struct AvatarCommand {
    pub(super) l10n: L10n,
}

#[async_trait]
impl<C: ChatContext> Command<C> for AvatarCommand {
    fn help_info(&self) -> Option<HelpInfo> {
        Some(HelpInfo {
            header_suffix: Some(
                self.l10n
                    .string("avatar-command-help-suffix", fluent_args![]),
            ),
            description: self
                .l10n
                .string("avatar-command-help-description", fluent_args![]),
        })
    }
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        let user_id = params
            .mentions
            .first()
            .copied()
            .unwrap_or(params.author_id);
        let answer_msg = match ctx.avatar_url(user_id).await {
            Some(url) => url,
            None => self
                .l10n
                .string("avatar-command-not-found", fluent_args![]),
        };
        ctx.say(params.channel_id, answer_msg).await;
    }
}
