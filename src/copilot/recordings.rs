use super::super::components::*;
use chrono::Utc;
use serenity::model::id::{ChannelId, GuildId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("guild is already being recorded")]
    AlreadyRecording,
    #[error("failed to create {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

enum GuildRecorder {
    Starting,
    Running(JoinHandle<RecordingSummary>),
}

/// One running recorder per guild, each writing into its own session
/// directory.
pub struct GuildsRecorders {
    transport: Arc<dyn VoiceTransport>,
    output_dir: PathBuf,
    recorders: Mutex<HashMap<GuildId, GuildRecorder>>,
}

impl GuildsRecorders {
    pub fn new(transport: Arc<dyn VoiceTransport>, output_dir: PathBuf) -> Self {
        Self {
            transport,
            output_dir,
            recorders: Default::default(),
        }
    }

    pub async fn is_recording(&self, guild_id: GuildId) -> bool {
        self.recorders.lock().await.contains_key(&guild_id)
    }

    pub async fn start(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<PathBuf, RecordError> {
        let mut recorders = self.recorders.lock().await;
        if recorders.contains_key(&guild_id) {
            return Err(RecordError::AlreadyRecording);
        }
        recorders.insert(guild_id, GuildRecorder::Starting);
        drop(recorders);

        match self.spawn(guild_id, channel_id).await {
            Ok((directory, handle)) => {
                self.recorders
                    .lock()
                    .await
                    .insert(guild_id, GuildRecorder::Running(handle));
                info!(
                    "Recording guild {} into {}.",
                    guild_id,
                    directory.display()
                );
                Ok(directory)
            }
            Err(error) => {
                self.recorders.lock().await.remove(&guild_id);
                error!("Recording guild {} failed to start: {}", guild_id, error);
                Err(error)
            }
        }
    }

    async fn spawn(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<(PathBuf, JoinHandle<RecordingSummary>), RecordError> {
        let directory = self.output_dir.join(format!(
            "{}-{}",
            guild_id.0,
            Utc::now().format("%Y%m%dT%H%M%SZ")
        ));
        std::fs::create_dir_all(&directory).map_err(|source| RecordError::Directory {
            path: directory.clone(),
            source,
        })?;
        let packets = self.transport.record(guild_id, channel_id).await?;
        let recorder = PacketDemuxRecorder::new(OggOpusFactory::new(directory.clone()));
        Ok((directory, tokio::spawn(recorder.run(packets))))
    }

    /// Waits for the guild's recorder to drain. The packet stream must be
    /// closed first, which `VoiceTransport::leave` does.
    pub async fn finish(&self, guild_id: GuildId) -> Option<RecordingSummary> {
        let recorder = self.recorders.lock().await.remove(&guild_id)?;
        let GuildRecorder::Running(handle) = recorder else {
            return None;
        };
        match handle.await {
            Ok(summary) => {
                info!(
                    "Recording of guild {} finished: {} of {} sources saved, {} frames, failed {:?}.",
                    guild_id, summary.saved, summary.sources, summary.frames, summary.failed_sources
                );
                Some(summary)
            }
            Err(error) => {
                error!("Recorder of guild {} crashed: {}", guild_id, error);
                None
            }
        }
    }

    pub async fn stop_all(&self) {
        let guilds: Vec<GuildId> = self.recorders.lock().await.keys().copied().collect();
        for guild_id in guilds {
            if let Err(error) = self.transport.leave(guild_id).await {
                warn!("Leaving voice on guild {} failed: {}", guild_id, error);
            }
            self.finish(guild_id).await;
        }
    }
}
