use super::*;
use byteorder::{LittleEndian, WriteBytesExt};
use ogg::writing::{PacketWriteEndInfo, PacketWriter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

pub const SAMPLE_RATE: u32 = 48_000;
pub const CHANNELS: u8 = 2;

const OPUS_VENDOR: &str = "voice-copilot";

fn opus_head(sample_rate: u32, channels: u8) -> io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(19);
    head.write_all(b"OpusHead")?;
    head.write_u8(1)?;
    head.write_u8(channels)?;
    // pre-skip
    head.write_u16::<LittleEndian>(0)?;
    head.write_u32::<LittleEndian>(sample_rate)?;
    // output gain
    head.write_i16::<LittleEndian>(0)?;
    // channel mapping family
    head.write_u8(0)?;
    Ok(head)
}

fn opus_tags() -> io::Result<Vec<u8>> {
    let mut tags = Vec::with_capacity(16 + OPUS_VENDOR.len());
    tags.write_all(b"OpusTags")?;
    tags.write_u32::<LittleEndian>(OPUS_VENDOR.len() as u32)?;
    tags.write_all(OPUS_VENDOR.as_bytes())?;
    // user comment list length
    tags.write_u32::<LittleEndian>(0)?;
    Ok(tags)
}

/// Ogg/Opus container for a single RTP source. One page per frame, granule
/// position driven by RTP timestamp deltas.
///
/// The newest packet is held back until the next one arrives so that `close`
/// can flag it as the end of the stream. Before any frame that packet is the
/// OpusTags header.
pub struct OggOpusWriter {
    path: PathBuf,
    serial: u32,
    packets: Option<PacketWriter<'static, BufWriter<File>>>,
    held: Option<(Vec<u8>, u64)>,
    granule_position: u64,
    last_timestamp: Option<u32>,
}

impl OggOpusWriter {
    pub fn create(
        path: impl Into<PathBuf>,
        serial: u32,
        sample_rate: u32,
        channels: u8,
    ) -> Result<Self, RecordingError> {
        let path = path.into();
        let create_error = |source| RecordingError::Create {
            path: path.clone(),
            source,
        };
        let file = File::create(&path).map_err(create_error)?;
        let mut packets = PacketWriter::new(BufWriter::new(file));
        packets
            .write_packet(
                opus_head(sample_rate, channels).map_err(create_error)?,
                serial,
                PacketWriteEndInfo::EndPage,
                0,
            )
            .map_err(create_error)?;
        let tags = opus_tags().map_err(create_error)?;
        Ok(Self {
            path,
            serial,
            packets: Some(packets),
            held: Some((tags, 0)),
            granule_position: 0,
            last_timestamp: None,
        })
    }
}

impl ContainerWriter for OggOpusWriter {
    fn append(&mut self, frame: &RtpFrame) -> Result<(), RecordingError> {
        if frame.payload.is_empty() {
            return Ok(());
        }
        let Some(packets) = self.packets.as_mut() else {
            return Err(RecordingError::Append {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::BrokenPipe, "container already closed"),
            });
        };
        if let Some(last_timestamp) = self.last_timestamp {
            self.granule_position += u64::from(frame.header.timestamp.wrapping_sub(last_timestamp));
        }
        self.last_timestamp = Some(frame.header.timestamp);
        let previous = self
            .held
            .replace((frame.payload.clone(), self.granule_position));
        let Some((data, granule_position)) = previous else {
            return Ok(());
        };
        packets
            .write_packet(data, self.serial, PacketWriteEndInfo::EndPage, granule_position)
            .map_err(|source| RecordingError::Append {
                path: self.path.clone(),
                source,
            })
    }

    fn close(&mut self) -> Result<(), RecordingError> {
        let Some(mut packets) = self.packets.take() else {
            return Ok(());
        };
        let close_error = |source| RecordingError::Close {
            path: self.path.clone(),
            source,
        };
        if let Some((data, granule_position)) = self.held.take() {
            packets
                .write_packet(data, self.serial, PacketWriteEndInfo::EndStream, granule_position)
                .map_err(close_error)?;
        }
        let mut file = packets.into_inner();
        file.flush().map_err(close_error)?;
        file.get_ref().sync_all().map_err(close_error)
    }
}

impl Drop for OggOpusWriter {
    fn drop(&mut self) {
        if self.packets.is_some() {
            if let Err(error) = self.close() {
                warn!("Container dropped without finalization: {}", error);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct OggOpusFactory {
    directory: PathBuf,
}

impl OggOpusFactory {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, source_id: u32) -> PathBuf {
        self.directory.join(format!("{source_id}.ogg"))
    }
}

impl ContainerFactory for OggOpusFactory {
    type Writer = OggOpusWriter;
    fn create(&self, source_id: u32) -> Result<Self::Writer, RecordingError> {
        OggOpusWriter::create(self.path_for(source_id), source_id, SAMPLE_RATE, CHANNELS)
    }
}
