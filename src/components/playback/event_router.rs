use super::*;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

#[async_trait]
pub trait PlaybackObserver: Send + Sync {
    async fn stats(&self, _stats: &EngineStats) {}
    async fn track_start(&self, _guild_id: GuildId, _track_id: &str) {}
    async fn track_stuck(&self, _guild_id: GuildId, _track_id: &str, _threshold_ms: u64) {}
    async fn track_end(&self, _guild_id: GuildId, _track_id: &str, _reason: &str) {}
    async fn track_exception(&self, _guild_id: GuildId, _track_id: &str, _error: &str) {}
}

pub struct PlaybackEventRouter {
    observers: Vec<Arc<dyn PlaybackObserver>>,
}

impl PlaybackEventRouter {
    pub fn new(observers: Vec<Arc<dyn PlaybackObserver>>) -> Self {
        Self { observers }
    }

    /// Runs until the engine side of `frames` is dropped.
    pub async fn run(self, mut frames: UnboundedReceiver<String>) {
        while let Some(frame) = frames.recv().await {
            match decode_frame(&frame) {
                Ok(event) => self.dispatch(&event).await,
                Err(error) if error.is_unrecognized() => {
                    debug!("Playback frame dropped: {}.", error);
                }
                Err(error) => {
                    warn!("Playback frame dropped: {}: {}", error, frame);
                }
            }
        }
        info!("Playback event stream closed.");
    }

    pub async fn dispatch(&self, event: &PlaybackEvent) {
        for observer in &self.observers {
            match event {
                PlaybackEvent::Stats(stats) => observer.stats(stats).await,
                PlaybackEvent::TrackStart { guild_id, track_id } => {
                    observer.track_start(*guild_id, track_id).await
                }
                PlaybackEvent::TrackStuck {
                    guild_id,
                    track_id,
                    threshold_ms,
                } => {
                    observer
                        .track_stuck(*guild_id, track_id, *threshold_ms)
                        .await
                }
                PlaybackEvent::TrackEnd {
                    guild_id,
                    track_id,
                    reason,
                } => observer.track_end(*guild_id, track_id, reason).await,
                PlaybackEvent::TrackException {
                    guild_id,
                    track_id,
                    error,
                } => {
                    observer
                        .track_exception(*guild_id, track_id, error)
                        .await
                }
            }
        }
    }
}
