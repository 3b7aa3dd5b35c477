use super::*;
use serenity::model::gateway::Activity;
use serenity::model::prelude::{OnlineStatus, Ready};
use serenity::prelude::Context;

pub(super) struct CopilotOnReady {
    pub(super) bridge: Arc<VoiceSessionBridge>,
    pub(super) l10n: L10n,
}

#[async_trait]
impl OnReady for CopilotOnReady {
    async fn process(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        ctx.set_presence(
            Some(Activity::listening(
                self.l10n.string("listening-text", fluent_args![]),
            )),
            OnlineStatus::Online,
        )
        .await;
        self.bridge.on_ready(ready.session_id).await;
    }
}
