use super::super::discord_voice::*;
use super::super::playback::*;
use serenity::model::id::{ChannelId, GuildId};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceServer {
    pub token: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Unjoined,
    VoiceServerKnown,
    CredentialsPushed,
    Joined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Play { track_id: String, options: PlayOptions },
    Pause,
    Resume,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Sent,
    Queued,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("gateway session id is not known yet")]
    MissingSessionId,
    #[error("no voice server endpoint assigned for guild {0}")]
    MissingEndpoint(GuildId),
    #[error("no voice session for guild {0}")]
    NotConnected(GuildId),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Default)]
struct RoomSession {
    voice_server: Option<VoiceServer>,
    credentials_pushed: bool,
    join_requested: bool,
    pending: VecDeque<PlayerCommand>,
}

impl RoomSession {
    fn is_idle(&self) -> bool {
        self.voice_server.is_none() && !self.join_requested && self.pending.is_empty()
    }

    fn state(&self) -> RoomState {
        if self.credentials_pushed {
            if self.join_requested {
                RoomState::Joined
            } else {
                RoomState::CredentialsPushed
            }
        } else if self.voice_server.is_some() {
            RoomState::VoiceServerKnown
        } else {
            RoomState::Unjoined
        }
    }
}

/// Owns all per-guild voice credentials and forwards them to the playback
/// node. Work on one guild is serialized by that guild's lock; guilds do not
/// wait on each other.
pub struct VoiceSessionBridge {
    engine: Arc<dyn PlaybackEngine>,
    transport: Arc<dyn VoiceTransport>,
    pending_limit: usize,
    session_id: RwLock<Option<String>>,
    rooms: RwLock<HashMap<GuildId, Arc<Mutex<RoomSession>>>>,
}

impl VoiceSessionBridge {
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        transport: Arc<dyn VoiceTransport>,
        pending_limit: usize,
    ) -> Self {
        Self {
            engine,
            transport,
            pending_limit: pending_limit.max(1),
            session_id: Default::default(),
            rooms: Default::default(),
        }
    }

    async fn room(&self, guild_id: GuildId) -> Arc<Mutex<RoomSession>> {
        if let Some(room) = self.rooms.read().await.get(&guild_id) {
            return room.clone();
        }
        self.rooms
            .write()
            .await
            .entry(guild_id)
            .or_default()
            .clone()
    }

    /// The gateway sends one ready per connection; a repeated call replaces
    /// the id.
    pub async fn on_ready(&self, session_id: String) {
        let mut current = self.session_id.write().await;
        if let Some(previous) = current.replace(session_id) {
            warn!("Gateway session id replaced, previous was {}.", previous);
        }
    }

    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    /// Whether a playback session was requested or announced for the guild.
    pub async fn has_session(&self, guild_id: GuildId) -> bool {
        self.rooms.read().await.contains_key(&guild_id)
    }

    pub async fn room_state(&self, guild_id: GuildId) -> RoomState {
        let room = self.rooms.read().await.get(&guild_id).cloned();
        match room {
            Some(room) => room.lock().await.state(),
            None => RoomState::Unjoined,
        }
    }

    pub async fn on_voice_server_update(
        &self,
        guild_id: GuildId,
        token: String,
        endpoint: Option<String>,
    ) -> Result<(), SessionError> {
        let room = self.room(guild_id).await;
        let mut room = room.lock().await;
        room.credentials_pushed = false;
        let Some(endpoint) = endpoint else {
            room.voice_server = None;
            warn!("Voice server of guild {} has no endpoint.", guild_id);
            return Err(SessionError::MissingEndpoint(guild_id));
        };
        room.voice_server = Some(VoiceServer { token, endpoint });
        self.push_credentials(guild_id, &mut room).await
    }

    async fn push_credentials(
        &self,
        guild_id: GuildId,
        room: &mut RoomSession,
    ) -> Result<(), SessionError> {
        let Some(session_id) = self.session_id().await else {
            warn!(
                "Updating voice server failed on guild {}: session id unknown.",
                guild_id
            );
            return Err(SessionError::MissingSessionId);
        };
        let Some(voice_server) = room.voice_server.as_ref() else {
            return Err(SessionError::MissingEndpoint(guild_id));
        };
        if let Err(error) = self
            .engine
            .push_credentials(
                guild_id,
                &session_id,
                &voice_server.token,
                &voice_server.endpoint,
            )
            .await
        {
            error!("Updating voice server failed on guild {}: {}", guild_id, error);
            return Err(error.into());
        }
        room.credentials_pushed = true;
        info!("Updated voice server of guild {}.", guild_id);
        while let Some(command) = room.pending.pop_front() {
            if let Err(error) = self.execute(guild_id, &command).await {
                error!(
                    "Queued {:?} failed on guild {}: {}",
                    command, guild_id, error
                );
            }
        }
        Ok(())
    }

    async fn execute(&self, guild_id: GuildId, command: &PlayerCommand) -> Result<(), EngineError> {
        match command {
            PlayerCommand::Play { track_id, options } => {
                self.engine.play(guild_id, track_id, *options).await
            }
            PlayerCommand::Pause => self.engine.set_paused(guild_id, true).await,
            PlayerCommand::Resume => self.engine.set_paused(guild_id, false).await,
            PlayerCommand::Stop => self.engine.stop(guild_id).await,
        }
    }

    /// Sends `command` once the node holds this guild's credentials, queues it
    /// while a join is in flight and rejects it otherwise.
    pub async fn submit(
        &self,
        guild_id: GuildId,
        command: PlayerCommand,
    ) -> Result<Submission, SessionError> {
        let Some(room) = self.rooms.read().await.get(&guild_id).cloned() else {
            return Err(SessionError::NotConnected(guild_id));
        };
        let mut room = room.lock().await;
        match room.state() {
            RoomState::CredentialsPushed | RoomState::Joined => {
                self.execute(guild_id, &command).await?;
                Ok(Submission::Sent)
            }
            RoomState::VoiceServerKnown => Ok(self.enqueue(guild_id, &mut room, command)),
            RoomState::Unjoined if room.join_requested => {
                Ok(self.enqueue(guild_id, &mut room, command))
            }
            RoomState::Unjoined => Err(SessionError::NotConnected(guild_id)),
        }
    }

    fn enqueue(
        &self,
        guild_id: GuildId,
        room: &mut RoomSession,
        command: PlayerCommand,
    ) -> Submission {
        if room.pending.len() >= self.pending_limit {
            if let Some(dropped) = room.pending.pop_front() {
                warn!("Dropped queued {:?} on guild {}.", dropped, guild_id);
            }
        }
        debug!("Queued {:?} on guild {} until credentials are pushed.", command, guild_id);
        room.pending.push_back(command);
        Submission::Queued
    }

    pub async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), SessionError> {
        let room = self.room(guild_id).await;
        room.lock().await.join_requested = true;
        if let Err(error) = self.transport.join(guild_id, channel_id).await {
            error!(
                "Joining channel {} on guild {} failed: {}",
                channel_id, guild_id, error
            );
            let mut room = room.lock().await;
            room.join_requested = false;
            if !room.pending.is_empty() {
                warn!(
                    "Dropped {} queued commands on guild {}.",
                    room.pending.len(),
                    guild_id
                );
                room.pending.clear();
            }
            drop(room);
            self.forget_idle_room(guild_id).await;
            return Err(error.into());
        }
        Ok(())
    }

    async fn forget_idle_room(&self, guild_id: GuildId) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get(&guild_id) else {
            return;
        };
        // A busy room is in use again, so it stays.
        let idle = match room.try_lock() {
            Ok(room) => room.is_idle(),
            Err(_) => false,
        };
        if idle {
            rooms.remove(&guild_id);
        }
    }

    pub async fn leave(&self, guild_id: GuildId) -> Result<(), SessionError> {
        let room = self.rooms.write().await.remove(&guild_id);
        if let Some(room) = room {
            let room = room.lock().await;
            if !room.pending.is_empty() {
                warn!(
                    "Dropped {} queued commands on guild {}.",
                    room.pending.len(),
                    guild_id
                );
            }
        }
        if let Err(error) = self.transport.leave(guild_id).await {
            warn!("Leaving voice on guild {} failed: {}", guild_id, error);
            return Err(error.into());
        }
        Ok(())
    }
}
