use super::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedReceiver;

struct Recording<W: ContainerWriter> {
    writer: Option<W>,
    frame_count: u64,
    failed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSummary {
    pub sources: usize,
    /// Containers that were created and finalized cleanly.
    pub saved: usize,
    pub frames: u64,
    pub failed_sources: Vec<u32>,
}

/// Splits one interleaved packet stream into one container per source id.
pub struct PacketDemuxRecorder<F: ContainerFactory> {
    factory: F,
    recordings: HashMap<u32, Recording<F::Writer>>,
}

impl<F: ContainerFactory> PacketDemuxRecorder<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            recordings: HashMap::new(),
        }
    }

    pub async fn run(mut self, mut packets: UnboundedReceiver<Packet>) -> RecordingSummary {
        while let Some(packet) = packets.recv().await {
            self.route(packet);
        }
        self.finalize()
    }

    fn route(&mut self, packet: Packet) {
        let source_id = packet.source_id;
        let recording = match self.recordings.entry(source_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let writer = match self.factory.create(source_id) {
                    Ok(writer) => {
                        info!("Recording of source {} started.", source_id);
                        Some(writer)
                    }
                    Err(error) => {
                        error!("{}, giving up on source {}.", error, source_id);
                        None
                    }
                };
                let failed = writer.is_none();
                entry.insert(Recording {
                    writer,
                    frame_count: 0,
                    failed,
                })
            }
        };
        if recording.failed {
            trace!("Dropping packet of failed source {}.", source_id);
            return;
        }
        let Some(writer) = recording.writer.as_mut() else {
            return;
        };
        match writer.append(&RtpFrame::from(packet)) {
            Ok(_) => recording.frame_count += 1,
            Err(error) => {
                error!("{}, giving up on source {}.", error, source_id);
                recording.failed = true;
            }
        }
    }

    fn finalize(self) -> RecordingSummary {
        let mut summary = RecordingSummary {
            sources: self.recordings.len(),
            ..Default::default()
        };
        for (source_id, mut recording) in self.recordings {
            summary.frames += recording.frame_count;
            if let Some(mut writer) = recording.writer.take() {
                if let Err(error) = writer.close() {
                    error!("{}.", error);
                    recording.failed = true;
                } else {
                    summary.saved += 1;
                    debug!(
                        "Recording of source {} finalized with {} frames.",
                        source_id, recording.frame_count
                    );
                }
            }
            if recording.failed {
                summary.failed_sources.push(source_id);
            }
        }
        summary.failed_sources.sort_unstable();
        summary
    }
}
