mod packet_forwarder;
mod voice_transport;

pub use packet_forwarder::*;
pub use voice_transport::*;
