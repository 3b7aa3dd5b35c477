use super::super::recording::Packet;
use songbird::events::context_data::VoiceData;
use songbird::packet::rtp::Rtp;
use songbird::{Call, CoreEvent, Event, EventContext, EventHandler as VoiceEventHandler};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Bridges songbird's receive events into a packet stream. Every clone shares
/// the one sender, so `close` ends the stream for all of them.
#[derive(Clone)]
pub struct PacketForwarder {
    sender: Arc<Mutex<Option<UnboundedSender<Packet>>>>,
}

impl PacketForwarder {
    pub fn channel() -> (PacketForwarder, UnboundedReceiver<Packet>) {
        let (tx, rx) = unbounded_channel();
        (
            Self {
                sender: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    pub fn subscribe(&self, handler: &mut Call) {
        handler.add_global_event(CoreEvent::VoicePacket.into(), self.clone());
        handler.add_global_event(CoreEvent::SpeakingStateUpdate.into(), self.clone());
        handler.add_global_event(CoreEvent::ClientDisconnect.into(), self.clone());
        handler.add_global_event(CoreEvent::DriverDisconnect.into(), self.clone());
        handler.add_global_event(CoreEvent::DriverReconnect.into(), self.clone());
    }

    pub async fn close(&self) {
        if self.sender.lock().await.take().is_some() {
            debug!("Packet stream closed.");
        }
    }

    async fn forward<'a>(&self, data: &VoiceData<'a>) {
        let rtp = data.packet;
        let packet = packet_from_rtp(rtp, data.payload_offset, data.payload_end_pad);
        let sender = self.sender.lock().await;
        let Some(sender) = sender.as_ref() else {
            return;
        };
        if sender.send(packet).is_err() {
            warn!("Packet of source {} dropped, recorder is gone.", rtp.ssrc);
        }
    }
}

/// Cuts the Opus frame out of the RTP body, dropping header extensions and
/// trailing padding.
fn packet_from_rtp(rtp: &Rtp, payload_offset: usize, payload_end_pad: usize) -> Packet {
    let end = rtp.payload.len().saturating_sub(payload_end_pad);
    let payload = rtp
        .payload
        .get(payload_offset..end)
        .unwrap_or_default()
        .to_vec();
    Packet {
        source_id: rtp.ssrc,
        sequence: rtp.sequence.0 .0,
        timestamp: rtp.timestamp.0 .0,
        payload,
    }
}

#[async_trait]
impl VoiceEventHandler for PacketForwarder {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        use EventContext as Ctx;
        let event_uuid = Uuid::new_v4();
        match ctx {
            Ctx::VoicePacket(data) => {
                trace!("[{}] VoiceEvent ENTER VoicePacket.", event_uuid);
                self.forward(data).await;
                trace!("[{}] VoiceEvent EXIT VoicePacket.", event_uuid);
            }
            Ctx::SpeakingStateUpdate(speaking) => {
                debug!(
                    "[{}] VoiceEvent SpeakingStateUpdate: source {} is user {:?}.",
                    event_uuid, speaking.ssrc, speaking.user_id
                );
            }
            Ctx::ClientDisconnect(disconnect) => {
                debug!(
                    "[{}] VoiceEvent ClientDisconnect: {:?}.",
                    event_uuid, disconnect
                );
            }
            Ctx::DriverDisconnect(data) => {
                warn!("[{}] VoiceEvent DriverDisconnect: {:?}.", event_uuid, data);
            }
            Ctx::DriverReconnect(data) => {
                info!("[{}] VoiceEvent DriverReconnect: {:?}.", event_uuid, data);
            }
            _ => {}
        }
        None
    }
}
