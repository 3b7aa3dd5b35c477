use super::*;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serenity::model::id::GuildId;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

const CLIENT_NAME: &str = "voice-copilot";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LavalinkConfig {
    pub ws_url: String,
    pub rest_url: String,
    pub password: String,
}

#[derive(Serialize)]
struct VoiceServerPayload<'a> {
    token: &'a str,
    guild_id: String,
    endpoint: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum OutgoingOp<'a> {
    VoiceUpdate {
        #[serde(rename = "guildId")]
        guild_id: String,
        #[serde(rename = "sessionId")]
        session_id: &'a str,
        event: VoiceServerPayload<'a>,
    },
    Play {
        #[serde(rename = "guildId")]
        guild_id: String,
        track: &'a str,
        volume: u16,
        #[serde(rename = "noReplace")]
        no_replace: bool,
    },
    Pause {
        #[serde(rename = "guildId")]
        guild_id: String,
        pause: bool,
    },
    Stop {
        #[serde(rename = "guildId")]
        guild_id: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum LoadType {
    TrackLoaded,
    PlaylistLoaded,
    SearchResult,
    NoMatches,
    LoadFailed,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadedTrackInfo {
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    length: u64,
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoadedTrack {
    track: String,
    info: LoadedTrackInfo,
}

#[derive(Debug, Deserialize)]
struct LoadFailure {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadTracksResponse {
    load_type: LoadType,
    #[serde(default)]
    tracks: Vec<LoadedTrack>,
    #[serde(default)]
    exception: Option<LoadFailure>,
}

impl LoadTracksResponse {
    fn into_tracks(self) -> Result<Vec<Track>, EngineError> {
        match self.load_type {
            LoadType::LoadFailed => Err(EngineError::LoadFailed(
                self.exception
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "unknown reason".to_string()),
            )),
            LoadType::NoMatches => Ok(vec![]),
            LoadType::TrackLoaded | LoadType::PlaylistLoaded | LoadType::SearchResult => Ok(self
                .tracks
                .into_iter()
                .map(|loaded| Track {
                    id: loaded.track,
                    title: loaded.info.title,
                    author: loaded.info.author,
                    length_ms: loaded.info.length,
                    uri: loaded.info.uri,
                })
                .collect()),
        }
    }
}

/// Lavalink v3 node: REST for track loading, one WebSocket for player ops
/// and the event stream.
#[derive(Clone)]
pub struct LavalinkClient {
    config: LavalinkConfig,
    http: reqwest::Client,
    outgoing: UnboundedSender<Message>,
}

impl LavalinkClient {
    /// Returns the client and the raw event frames read from the socket. The
    /// frame stream ends when the socket closes.
    pub async fn connect(
        config: LavalinkConfig,
        user_id: u64,
    ) -> Result<(Self, UnboundedReceiver<String>), EngineError> {
        let mut request = config.ws_url.as_str().into_client_request()?;
        let headers = request.headers_mut();
        headers.insert("authorization", HeaderValue::from_str(&config.password)?);
        headers.insert("user-id", HeaderValue::from(user_id));
        headers.insert("client-name", HeaderValue::from_static(CLIENT_NAME));
        let (socket, _) = tokio_tungstenite::connect_async(request).await?;
        info!("Connected to playback node {}.", config.ws_url);
        let (mut sink, mut source) = socket.split();

        let (outgoing, mut outgoing_rx) = unbounded_channel::<Message>();
        tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                let is_close = matches!(message, Message::Close(_));
                if let Err(error) = sink.send(message).await {
                    error!("Playback node write failed: {}", error);
                    break;
                }
                if is_close {
                    break;
                }
            }
            if let Err(error) = sink.close().await {
                warn!("Closing playback node connection failed: {}", error);
            }
        });

        let (frames, frames_rx) = unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if frames.send(text.as_str().to_string()).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        info!("Playback node closed the connection: {:?}.", frame);
                        break;
                    }
                    Ok(_) => {}
                    Err(error) => {
                        error!("Playback node read failed: {}", error);
                        break;
                    }
                }
            }
        });

        Ok((
            Self {
                config,
                http: reqwest::Client::new(),
                outgoing,
            },
            frames_rx,
        ))
    }

    fn send(&self, op: &OutgoingOp<'_>) -> Result<(), EngineError> {
        let payload = serde_json::to_string(op)?;
        trace!("Playback node <- {}", payload);
        self.outgoing
            .send(Message::text(payload))
            .map_err(|_| EngineError::ConnectionClosed)
    }

    pub fn close(&self) {
        if self.outgoing.send(Message::Close(None)).is_err() {
            debug!("Playback node connection already closed.");
        }
    }
}

#[async_trait]
impl PlaybackEngine for LavalinkClient {
    async fn load_tracks(&self, query: &str) -> Result<Vec<Track>, EngineError> {
        let url = format!("{}/loadtracks", self.config.rest_url.trim_end_matches('/'));
        let response: LoadTracksResponse = self
            .http
            .get(url)
            .header("authorization", &self.config.password)
            .query(&[("identifier", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_tracks()
    }

    async fn play(
        &self,
        guild_id: GuildId,
        track_id: &str,
        options: PlayOptions,
    ) -> Result<(), EngineError> {
        self.send(&OutgoingOp::Play {
            guild_id: guild_id.0.to_string(),
            track: track_id,
            volume: options.volume,
            no_replace: false,
        })
    }

    async fn set_paused(&self, guild_id: GuildId, paused: bool) -> Result<(), EngineError> {
        self.send(&OutgoingOp::Pause {
            guild_id: guild_id.0.to_string(),
            pause: paused,
        })
    }

    async fn stop(&self, guild_id: GuildId) -> Result<(), EngineError> {
        self.send(&OutgoingOp::Stop {
            guild_id: guild_id.0.to_string(),
        })
    }

    async fn push_credentials(
        &self,
        guild_id: GuildId,
        session_id: &str,
        token: &str,
        endpoint: &str,
    ) -> Result<(), EngineError> {
        self.send(&OutgoingOp::VoiceUpdate {
            guild_id: guild_id.0.to_string(),
            session_id,
            event: VoiceServerPayload {
                token,
                guild_id: guild_id.0.to_string(),
                endpoint,
            },
        })
    }
}
