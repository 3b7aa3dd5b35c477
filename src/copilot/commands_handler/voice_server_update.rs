use super::*;
use serenity::model::event::VoiceServerUpdateEvent;
use serenity::prelude::Context;

pub(super) struct CopilotVoiceServerUpdate {
    pub(super) bridge: Arc<VoiceSessionBridge>,
    pub(super) recorders: Arc<GuildsRecorders>,
}

#[async_trait]
impl OnVoiceServerUpdate for CopilotVoiceServerUpdate {
    async fn process(&self, _: Context, update: VoiceServerUpdateEvent) {
        let Some(guild_id) = update.guild_id else {
            warn!("Voice server update without guild ignored.");
            return;
        };
        // Recording connections are driven by songbird itself.
        if self.recorders.is_recording(guild_id).await {
            debug!("Voice server update of recorded guild {} skipped.", guild_id);
            return;
        }
        match self
            .bridge
            .on_voice_server_update(guild_id, update.token, update.endpoint)
            .await
        {
            Ok(_) => debug!(
                "Voice session of guild {} is {:?}.",
                guild_id,
                self.bridge.room_state(guild_id).await
            ),
            Err(error) => {
                debug!("Voice server update of guild {} not forwarded: {}", guild_id, error)
            }
        }
    }
}
