mod engine;
mod event_router;
mod events;
mod lavalink;

pub use engine::*;
pub use event_router::*;
pub use events::*;
pub use lavalink::*;
