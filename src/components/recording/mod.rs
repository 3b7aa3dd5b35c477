mod demux_recorder;
mod ogg_writer;

pub use demux_recorder::*;
pub use ogg_writer::*;

use std::io;
use std::path::PathBuf;

pub const RTP_VERSION: u8 = 2;
// Discord voice sends Opus with this dynamic payload type.
pub const OPUS_PAYLOAD_TYPE: u8 = 0x78;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub source_id: u32,
    pub sequence: u16,
    pub timestamp: u32,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpHeader {
    pub version: u8,
    pub payload_type: u8,
    pub sequence: u16,
    pub timestamp: u32,
    pub ssrc: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpFrame {
    pub header: RtpHeader,
    pub payload: Vec<u8>,
}

impl From<Packet> for RtpFrame {
    fn from(packet: Packet) -> Self {
        Self {
            header: RtpHeader {
                version: RTP_VERSION,
                payload_type: OPUS_PAYLOAD_TYPE,
                sequence: packet.sequence,
                timestamp: packet.timestamp,
                ssrc: packet.source_id,
            },
            payload: packet.payload,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("failed to create {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error("failed to append frame to {}: {source}", path.display())]
    Append { path: PathBuf, source: io::Error },
    #[error("failed to finalize {}: {source}", path.display())]
    Close { path: PathBuf, source: io::Error },
}

pub trait ContainerWriter: Send {
    fn append(&mut self, frame: &RtpFrame) -> Result<(), RecordingError>;
    fn close(&mut self) -> Result<(), RecordingError>;
}

pub trait ContainerFactory: Send {
    type Writer: ContainerWriter;
    fn create(&self, source_id: u32) -> Result<Self::Writer, RecordingError>;
}
