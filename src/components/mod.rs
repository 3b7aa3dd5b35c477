mod discord_chat;
mod discord_voice;
mod localization;
mod playback;
mod recording;
mod voice_session;

pub use discord_chat::*;
pub use discord_voice::*;
pub use localization::*;
pub use playback::*;
pub use recording::*;
pub use voice_session::*;
