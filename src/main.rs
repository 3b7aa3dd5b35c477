#[macro_use]
extern crate log;
#[macro_use]
extern crate async_trait;
#[macro_use]
extern crate fluent;

mod components;
mod copilot;
#[cfg(test)]
mod test_utils;

use components::*;
use copilot::*;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use serenity::http::Http;
use serenity::prelude::GatewayIntents;
use serenity::Client;
use songbird::driver::DecodeMode;
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;

const LOG_CONFIG_PATH: &str = "log4rs.yaml";

fn init_logging() {
    let Err(error) = log4rs::init_file(LOG_CONFIG_PATH, Default::default()) else {
        return;
    };
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));
    match config.map(log4rs::init_config) {
        Ok(Ok(_)) => warn!(
            "{} not loaded ({}), logging to console.",
            LOG_CONFIG_PATH, error
        ),
        Ok(Err(error)) => eprintln!("Logger init failed: {error}"),
        Err(error) => eprintln!("Logger config invalid: {error}"),
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let config = match CopilotConfig::read() {
        Ok(config) => config,
        Err(error) => {
            error!("Configuration error: {}", error);
            return;
        }
    };
    let l10n = match L10n::load(&config.l10n_dir, &config.language) {
        Ok(l10n) => l10n,
        Err(error) => {
            error!("Localization error: {}", error);
            return;
        }
    };

    let bot_user = match Http::new(&config.discord_token).get_current_user().await {
        Ok(user) => user,
        Err(error) => {
            error!("Fetching bot user failed: {:?}", error);
            return;
        }
    };
    let (lavalink, frames) = match LavalinkClient::connect(config.lavalink.clone(), bot_user.id.0).await {
        Ok(connection) => connection,
        Err(error) => {
            error!("Connecting to playback node failed: {}", error);
            return;
        }
    };
    let event_router = tokio::spawn(
        PlaybackEventRouter::new(vec![Arc::new(PlaybackLogger)]).run(frames),
    );

    let songbird = Songbird::serenity_from_config(
        songbird::Config::default().decode_mode(DecodeMode::Decrypt),
    );
    let transport: Arc<dyn VoiceTransport> = Arc::new(SongbirdTransport::new(songbird.clone()));
    let engine: Arc<dyn PlaybackEngine> = Arc::new(lavalink.clone());
    let bridge = Arc::new(VoiceSessionBridge::new(
        engine.clone(),
        transport.clone(),
        config.playback.pending_commands_limit,
    ));
    let recorders = Arc::new(GuildsRecorders::new(
        transport,
        config.recording.output_dir.clone(),
    ));
    let handler = CopilotCommandsHandlerConstructor {
        prefix: Prefix::new(&config.prefix),
        engine,
        bridge,
        recorders: recorders.clone(),
        play_options: PlayOptions {
            volume: config.playback.volume,
        },
        l10n,
    }
    .build();

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;
    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await
    {
        Ok(client) => client,
        Err(error) => {
            error!("Creating client failed: {:?}", error);
            return;
        }
    };
    let shard_manager = client.shard_manager.clone();
    let mut client_task = tokio::spawn(async move {
        if let Err(error) = client.start().await {
            error!("Client error: {:?}", error);
        }
    });

    let client_stopped = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(error) = result {
                error!("Waiting for Ctrl-C failed: {}", error);
            }
            false
        }
        _ = &mut client_task => true,
    };
    info!("Shutting down.");
    recorders.stop_all().await;
    shard_manager.lock().await.shutdown_all().await;
    lavalink.close();
    if !client_stopped {
        _ = client_task.await;
    }
    _ = event_router.await;
}
