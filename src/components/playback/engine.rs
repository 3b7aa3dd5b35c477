use serenity::model::id::GuildId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub author: String,
    pub length_ms: u64,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOptions {
    pub volume: u16,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self { volume: 100 }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid header value: {0}")]
    Header(#[from] tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue),
    #[error("track loading failed: {0}")]
    LoadFailed(String),
    #[error("playback engine connection is closed")]
    ConnectionClosed,
}

/// Request side of the external playback node.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    async fn load_tracks(&self, query: &str) -> Result<Vec<Track>, EngineError>;
    async fn play(
        &self,
        guild_id: GuildId,
        track_id: &str,
        options: PlayOptions,
    ) -> Result<(), EngineError>;
    async fn set_paused(&self, guild_id: GuildId, paused: bool) -> Result<(), EngineError>;
    async fn stop(&self, guild_id: GuildId) -> Result<(), EngineError>;
    async fn push_credentials(
        &self,
        guild_id: GuildId,
        session_id: &str,
        token: &str,
        endpoint: &str,
    ) -> Result<(), EngineError>;
}
