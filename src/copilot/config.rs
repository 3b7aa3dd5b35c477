use super::super::components::*;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

fn default_prefix() -> String {
    "!c".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_l10n_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("recordings")
}

fn default_volume() -> u16 {
    100
}

fn default_pending_commands_limit() -> usize {
    8
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordingConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_volume")]
    pub volume: u16,
    #[serde(default = "default_pending_commands_limit")]
    pub pending_commands_limit: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            pending_commands_limit: default_pending_commands_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CopilotConfig {
    pub discord_token: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_l10n_dir")]
    pub l10n_dir: PathBuf,
    pub lavalink: LavalinkConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl CopilotConfig {
    const CONFIG_NAME: &'static str = "copilot";
    const ENV_PREFIX: &'static str = "COPILOT";

    /// `copilot.{yaml,toml,json,...}` in the working directory, overridden by
    /// `COPILOT_*` variables (`__` separates nested keys).
    pub fn read() -> Result<Self, ConfigError> {
        Self::from_sources(Self::CONFIG_NAME, None)
    }

    fn from_sources(
        file_name: &str,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(file_name).required(false))
            .add_source(
                Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
