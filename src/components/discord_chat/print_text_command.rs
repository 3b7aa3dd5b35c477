use super::*;

pub struct PrintTextCommand {
    pub help_info: Option<HelpInfo>,
    pub text: String,
}

#[async_trait]
impl<C: ChatContext> Command<C> for PrintTextCommand {
    fn help_info(&self) -> Option<HelpInfo> {
        self.help_info.clone()
    }
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        ctx.say(params.channel_id, self.text.clone()).await;
    }
}
