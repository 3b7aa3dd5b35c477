use serde::Deserialize;
use serde_json::Value;
use serenity::model::id::GuildId;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub free: u64,
    pub used: u64,
    pub allocated: u64,
    pub reservable: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub cores: u32,
    pub system_load: f64,
    pub lavalink_load: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub players: u32,
    pub playing_players: u32,
    pub uptime: u64,
    pub memory: MemoryStats,
    pub cpu: CpuStats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Stats(EngineStats),
    TrackStart {
        guild_id: GuildId,
        track_id: String,
    },
    TrackStuck {
        guild_id: GuildId,
        track_id: String,
        threshold_ms: u64,
    },
    TrackEnd {
        guild_id: GuildId,
        track_id: String,
        reason: String,
    },
    TrackException {
        guild_id: GuildId,
        track_id: String,
        error: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("frame without op")]
    MissingOp,
    #[error("unrecognized op {0:?}")]
    UnknownOp(String),
    #[error("unrecognized event type {0:?}")]
    UnknownEvent(String),
    #[error("invalid guild id {0:?}")]
    InvalidGuild(String),
}

impl DecodeError {
    /// Frames the engine is expected to send that carry nothing to route.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, DecodeError::UnknownOp(_) | DecodeError::UnknownEvent(_))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackFrame {
    guild_id: String,
    track: String,
    #[serde(default)]
    threshold_ms: u64,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    exception: Option<ExceptionFrame>,
}

#[derive(Deserialize)]
struct ExceptionFrame {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    cause: Option<String>,
}

impl ExceptionFrame {
    fn describe(self) -> String {
        let message = self
            .message
            .or(self.cause)
            .unwrap_or_else(|| "unknown error".to_string());
        match self.severity {
            Some(severity) => format!("{message} ({severity})"),
            None => message,
        }
    }
}

fn parse_guild_id(guild_id: &str) -> Result<GuildId, DecodeError> {
    guild_id
        .parse::<u64>()
        .map(GuildId)
        .map_err(|_| DecodeError::InvalidGuild(guild_id.to_string()))
}

fn field_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Decodes one text frame of the engine's event socket.
pub fn decode_frame(frame: &str) -> Result<PlaybackEvent, DecodeError> {
    let value: Value = serde_json::from_str(frame)?;
    let op = field_str(&value, "op")
        .ok_or(DecodeError::MissingOp)?
        .to_string();
    match op.as_str() {
        "stats" => Ok(PlaybackEvent::Stats(serde_json::from_value(value)?)),
        "event" => {
            let kind = field_str(&value, "type").unwrap_or_default().to_string();
            let known = matches!(
                kind.as_str(),
                "TrackStartEvent" | "TrackStuckEvent" | "TrackEndEvent" | "TrackExceptionEvent"
            );
            if !known {
                return Err(DecodeError::UnknownEvent(kind));
            }
            let track_frame: TrackFrame = serde_json::from_value(value)?;
            let guild_id = parse_guild_id(&track_frame.guild_id)?;
            let track_id = track_frame.track;
            Ok(match kind.as_str() {
                "TrackStartEvent" => PlaybackEvent::TrackStart { guild_id, track_id },
                "TrackStuckEvent" => PlaybackEvent::TrackStuck {
                    guild_id,
                    track_id,
                    threshold_ms: track_frame.threshold_ms,
                },
                "TrackEndEvent" => PlaybackEvent::TrackEnd {
                    guild_id,
                    track_id,
                    reason: track_frame.reason.unwrap_or_default(),
                },
                _ => PlaybackEvent::TrackException {
                    guild_id,
                    track_id,
                    error: track_frame
                        .exception
                        .map(ExceptionFrame::describe)
                        .or(track_frame.error)
                        .unwrap_or_else(|| "unknown error".to_string()),
                },
            })
        }
        other => Err(DecodeError::UnknownOp(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_stats() {
        let frame = r#"{"op":"stats","players":3,"playingPlayers":1,"uptime":1000,
            "memory":{"free":1,"used":2,"allocated":3,"reservable":4},
            "cpu":{"cores":8,"systemLoad":0.5,"lavalinkLoad":0.1}}"#;
        let PlaybackEvent::Stats(stats) = decode_frame(frame).unwrap() else {
            panic!("expected stats");
        };
        assert_eq!(stats.playing_players, 1);
        assert_eq!(stats.memory.used, 2);
        assert_eq!(stats.cpu.cores, 8);
    }

    #[test]
    fn decodes_track_events() {
        let start = r#"{"op":"event","type":"TrackStartEvent","guildId":"42","track":"t1"}"#;
        assert_eq!(
            decode_frame(start).unwrap(),
            PlaybackEvent::TrackStart {
                guild_id: GuildId(42),
                track_id: "t1".to_string()
            }
        );
        let end = r#"{"op":"event","type":"TrackEndEvent","guildId":"42","track":"t1","reason":"FINISHED"}"#;
        assert_eq!(
            decode_frame(end).unwrap(),
            PlaybackEvent::TrackEnd {
                guild_id: GuildId(42),
                track_id: "t1".to_string(),
                reason: "FINISHED".to_string()
            }
        );
        let stuck = r#"{"op":"event","type":"TrackStuckEvent","guildId":"7","track":"t2","thresholdMs":5000}"#;
        assert_eq!(
            decode_frame(stuck).unwrap(),
            PlaybackEvent::TrackStuck {
                guild_id: GuildId(7),
                track_id: "t2".to_string(),
                threshold_ms: 5000
            }
        );
    }

    #[test]
    fn decodes_both_exception_shapes() {
        let modern = r#"{"op":"event","type":"TrackExceptionEvent","guildId":"1","track":"t",
            "exception":{"message":"video unavailable","severity":"COMMON","cause":"x"}}"#;
        let PlaybackEvent::TrackException { error, .. } = decode_frame(modern).unwrap() else {
            panic!("expected exception");
        };
        assert_eq!(error, "video unavailable (COMMON)");

        let legacy = r#"{"op":"event","type":"TrackExceptionEvent","guildId":"1","track":"t","error":"boom"}"#;
        let PlaybackEvent::TrackException { error, .. } = decode_frame(legacy).unwrap() else {
            panic!("expected exception");
        };
        assert_eq!(error, "boom");
    }

    #[test]
    fn reports_unrecognized_and_malformed_frames() {
        let update = r#"{"op":"playerUpdate","guildId":"1","state":{"time":1,"position":2}}"#;
        assert!(decode_frame(update).unwrap_err().is_unrecognized());
        let closed = r#"{"op":"event","type":"WebSocketClosedEvent","guildId":"1","code":4006}"#;
        assert!(decode_frame(closed).unwrap_err().is_unrecognized());
        assert!(matches!(
            decode_frame("not json"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            decode_frame(r#"{"type":"TrackStartEvent"}"#),
            Err(DecodeError::MissingOp)
        ));
        assert!(matches!(
            decode_frame(r#"{"op":"event","type":"TrackStartEvent","guildId":"abc","track":"t"}"#),
            Err(DecodeError::InvalidGuild(_))
        ));
    }
}
