mod commands_handler;
mod config;
mod playback_logger;
mod recordings;

pub use commands_handler::*;
pub use config::*;
pub use playback_logger::*;
pub use recordings::*;
