use crate::components::*;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub const TEST_GUILD: u64 = 42;
pub const TEST_CHANNEL: u64 = 100;
pub const TEST_AUTHOR: u64 = 7;

pub fn test_l10n() -> L10n {
    L10n::from_ftl("en-US", include_str!("../en-US.ftl").to_string()).unwrap()
}

pub fn message(content: &str) -> IncomingMessage {
    IncomingMessage {
        guild_id: Some(GuildId(TEST_GUILD)),
        channel_id: ChannelId(TEST_CHANNEL),
        author_id: UserId(TEST_AUTHOR),
        mentions: vec![],
        content: content.to_string(),
    }
}

#[derive(Default)]
pub struct TestChat {
    replies: Mutex<Vec<String>>,
    voice_channels: HashMap<(u64, u64), u64>,
}

impl TestChat {
    pub fn in_voice(mut self, guild_id: u64, user_id: u64, channel_id: u64) -> Self {
        self.voice_channels.insert((guild_id, user_id), channel_id);
        self
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatContext for TestChat {
    async fn say(&self, _channel_id: ChannelId, text: String) {
        self.replies.lock().unwrap().push(text);
    }

    async fn avatar_url(&self, user_id: UserId) -> Option<String> {
        Some(format!("https://cdn.example/avatars/{}.png", user_id.0))
    }

    fn voice_channel(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
        self.voice_channels
            .get(&(guild_id.0, user_id.0))
            .copied()
            .map(ChannelId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    LoadTracks(String),
    Play(u64, String, u16),
    SetPaused(u64, bool),
    Stop(u64),
    PushCredentials(u64, String, String, String),
}

#[derive(Default)]
pub struct MockEngine {
    pub tracks: Vec<Track>,
    slow_push: Option<(u64, Duration)>,
    calls: Mutex<Vec<EngineCall>>,
}

impl MockEngine {
    pub fn with_tracks(titles: &[&str]) -> Self {
        Self {
            tracks: titles
                .iter()
                .enumerate()
                .map(|(index, title)| Track {
                    id: format!("track-{index}"),
                    title: title.to_string(),
                    author: "someone".to_string(),
                    length_ms: 1000,
                    uri: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Credential pushes for `guild_id` take `delay`.
    pub fn with_slow_push(guild_id: u64, delay: Duration) -> Self {
        Self {
            slow_push: Some((guild_id, delay)),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlaybackEngine for MockEngine {
    async fn load_tracks(&self, query: &str) -> Result<Vec<Track>, EngineError> {
        self.record(EngineCall::LoadTracks(query.to_string()));
        Ok(self.tracks.clone())
    }

    async fn play(
        &self,
        guild_id: GuildId,
        track_id: &str,
        options: PlayOptions,
    ) -> Result<(), EngineError> {
        self.record(EngineCall::Play(guild_id.0, track_id.to_string(), options.volume));
        Ok(())
    }

    async fn set_paused(&self, guild_id: GuildId, paused: bool) -> Result<(), EngineError> {
        self.record(EngineCall::SetPaused(guild_id.0, paused));
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> Result<(), EngineError> {
        self.record(EngineCall::Stop(guild_id.0));
        Ok(())
    }

    async fn push_credentials(
        &self,
        guild_id: GuildId,
        session_id: &str,
        token: &str,
        endpoint: &str,
    ) -> Result<(), EngineError> {
        if let Some((slow_guild, delay)) = self.slow_push {
            if slow_guild == guild_id.0 {
                tokio::time::sleep(delay).await;
            }
        }
        self.record(EngineCall::PushCredentials(
            guild_id.0,
            session_id.to_string(),
            token.to_string(),
            endpoint.to_string(),
        ));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockTransport {
    fail_join: bool,
    joins: Mutex<Vec<(u64, u64)>>,
    leaves: Mutex<Vec<u64>>,
    connected: Mutex<HashSet<u64>>,
    streams: Mutex<HashMap<u64, UnboundedSender<Packet>>>,
}

impl MockTransport {
    pub fn failing() -> Self {
        Self {
            fail_join: true,
            ..Default::default()
        }
    }

    pub fn joins(&self) -> Vec<(u64, u64)> {
        self.joins.lock().unwrap().clone()
    }

    pub fn leaves(&self) -> Vec<u64> {
        self.leaves.lock().unwrap().clone()
    }

    pub fn push_packet(&self, guild_id: u64, packet: Packet) {
        if let Some(sender) = self.streams.lock().unwrap().get(&guild_id) {
            sender.send(packet).unwrap();
        }
    }

    fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), TransportError> {
        self.joins.lock().unwrap().push((guild_id.0, channel_id.0));
        if self.fail_join {
            return Err(TransportError::NotConnected);
        }
        self.connected.lock().unwrap().insert(guild_id.0);
        Ok(())
    }
}

#[async_trait]
impl VoiceTransport for MockTransport {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), TransportError> {
        self.connect(guild_id, channel_id)
    }

    async fn record(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<UnboundedReceiver<Packet>, TransportError> {
        self.connect(guild_id, channel_id)?;
        let (sender, packets) = unbounded_channel();
        self.streams.lock().unwrap().insert(guild_id.0, sender);
        Ok(packets)
    }

    async fn leave(&self, guild_id: GuildId) -> Result<(), TransportError> {
        self.streams.lock().unwrap().remove(&guild_id.0);
        if !self.connected.lock().unwrap().remove(&guild_id.0) {
            return Err(TransportError::NotConnected);
        }
        self.leaves.lock().unwrap().push(guild_id.0);
        Ok(())
    }
}
