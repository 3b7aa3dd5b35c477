use super::super::recording::Packet;
use super::*;
use serenity::model::id::{ChannelId, GuildId};
use songbird::error::JoinError;
use songbird::Songbird;
use std::collections::HashMap;
use std::ops::DerefMut;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("voice connection failed: {0}")]
    Join(#[from] JoinError),
    #[error("not connected to a voice channel")]
    NotConnected,
}

/// Voice attach/detach requests towards the gateway.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Gateway-level join; the audio connection itself is left to the playback node.
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), TransportError>;
    /// Full join with receive; the returned stream ends on `leave`.
    async fn record(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<UnboundedReceiver<Packet>, TransportError>;
    async fn leave(&self, guild_id: GuildId) -> Result<(), TransportError>;
}

pub struct SongbirdTransport {
    manager: Arc<Songbird>,
    forwarders: Mutex<HashMap<GuildId, PacketForwarder>>,
}

impl SongbirdTransport {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self {
            manager,
            forwarders: Default::default(),
        }
    }
}

#[async_trait]
impl VoiceTransport for SongbirdTransport {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), TransportError> {
        let (_, connection_result) = self.manager.join_gateway(guild_id, channel_id).await;
        connection_result?;
        Ok(())
    }

    async fn record(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<UnboundedReceiver<Packet>, TransportError> {
        let (handler_lock, connection_result) = self.manager.join(guild_id, channel_id).await;
        connection_result?;
        let (forwarder, packets) = PacketForwarder::channel();
        let mut handler = handler_lock.lock().await;
        if let Err(error) = handler.mute(true).await {
            warn!("Muting on guild {} failed: {}", guild_id, error);
        }
        forwarder.subscribe(handler.deref_mut());
        drop(handler);
        if let Some(previous) = self.forwarders.lock().await.insert(guild_id, forwarder) {
            previous.close().await;
        }
        Ok(packets)
    }

    async fn leave(&self, guild_id: GuildId) -> Result<(), TransportError> {
        if let Some(forwarder) = self.forwarders.lock().await.remove(&guild_id) {
            forwarder.close().await;
        }
        if self.manager.get(guild_id).is_none() {
            return Err(TransportError::NotConnected);
        }
        self.manager.remove(guild_id).await?;
        Ok(())
    }
}
