use super::*;

pub(super) struct PrefixCommand {
    pub(super) prefix: Prefix,
    pub(super) l10n: L10n,
}

#[async_trait]
impl<C: ChatContext> Command<C> for PrefixCommand {
    fn help_info(&self) -> Option<HelpInfo> {
        Some(HelpInfo {
            header_suffix: Some(
                self.l10n
                    .string("prefix-command-help-suffix", fluent_args![]),
            ),
            description: self
                .l10n
                .string("prefix-command-help-description", fluent_args![]),
        })
    }
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        let answer_msg = match params.args().first() {
            Some(new_prefix) => {
                self.prefix.set(new_prefix.to_string()).await;
                info!("Prefix changed to {}.", new_prefix);
                self.l10n.string(
                    "prefix-command-set",
                    fluent_args![
                        "prefix" => new_prefix.to_string()
                    ],
                )
            }
            None => self.l10n.string(
                "prefix-command-current",
                fluent_args![
                    "prefix" => self.prefix.get().await
                ],
            ),
        };
        ctx.say(params.channel_id, answer_msg).await;
    }
}
