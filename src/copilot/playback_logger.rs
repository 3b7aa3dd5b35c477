use super::super::components::*;
use serenity::model::id::GuildId;

pub struct PlaybackLogger;

#[async_trait]
impl PlaybackObserver for PlaybackLogger {
    async fn stats(&self, stats: &EngineStats) {
        debug!(
            "Playback node stats: {} of {} players playing, memory used {} / {}, cpu load {:.2}.",
            stats.playing_players,
            stats.players,
            stats.memory.used,
            stats.memory.allocated,
            stats.cpu.lavalink_load
        );
    }

    async fn track_start(&self, guild_id: GuildId, track_id: &str) {
        info!("Track {} started on guild {}.", track_id, guild_id);
    }

    async fn track_stuck(&self, guild_id: GuildId, track_id: &str, threshold_ms: u64) {
        warn!(
            "Track {} stuck on guild {} for {} ms.",
            track_id, guild_id, threshold_ms
        );
    }

    async fn track_end(&self, guild_id: GuildId, track_id: &str, reason: &str) {
        info!("Track {} ended on guild {}: {}.", track_id, guild_id, reason);
    }

    async fn track_exception(&self, guild_id: GuildId, track_id: &str, error: &str) {
        error!("Track {} failed on guild {}: {}", track_id, guild_id, error);
    }
}
