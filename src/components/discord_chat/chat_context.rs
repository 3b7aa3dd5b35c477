use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Context;

/// What command handlers need from the chat side.
#[async_trait]
pub trait ChatContext: Send + Sync {
    async fn say(&self, channel_id: ChannelId, text: String);
    async fn avatar_url(&self, user_id: UserId) -> Option<String>;
    fn voice_channel(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId>;
}

#[async_trait]
impl ChatContext for Context {
    async fn say(&self, channel_id: ChannelId, text: String) {
        if let Err(error) = channel_id.say(self, text).await {
            warn!("Sending message to channel {} failed: {}", channel_id, error);
        }
    }

    async fn avatar_url(&self, user_id: UserId) -> Option<String> {
        match user_id.to_user(self).await {
            Ok(user) => Some(user.face()),
            Err(error) => {
                warn!("Fetching user {} failed: {}", user_id, error);
                None
            }
        }
    }

    fn voice_channel(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
        self.cache
            .guild(guild_id)?
            .voice_states
            .get(&user_id)?
            .channel_id
    }
}
