use crate::midi::{
    ByteSink, ControllerChange, MidiError, NoteMessage, OutboundMessage, SongPosition,
    TimingClock, ToPacket, TransportCommand, TransportEvent,
};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, error, info, trace, warn};
use std::time::Duration;

/// Creates the outbound FIFO: a producer handle and the receiving end for the
/// transmit thread.
pub fn outbound_queue(capacity: usize) -> (MidiSender, Receiver<OutboundMessage>) {
    let (tx, rx) = bounded(capacity.max(1));
    (MidiSender { tx }, rx)
}

/// Non-blocking producer handle for the outbound queue. Cheap to clone; every
/// send returns `false` when the message was dropped.
#[derive(Clone)]
pub struct MidiSender {
    tx: Sender<OutboundMessage>,
}

impl MidiSender {
    /// Encodes and enqueues any sendable event.
    pub fn send<E: ToPacket + ?Sized>(&self, event: &E) -> bool {
        match OutboundMessage::encode(event) {
            Ok(message) => self.enqueue(message),
            Err(e) => {
                warn!("Refusing to queue {:?}: {}", event.to_packet(), e);
                false
            }
        }
    }

    pub fn enqueue(&self, message: OutboundMessage) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => {
                trace!("Queued {:02X?}", message.as_bytes());
                true
            }
            Err(TrySendError::Full(message)) => {
                warn!(
                    "MIDI output queue full, dropping {:02X?}",
                    message.as_bytes()
                );
                false
            }
            Err(TrySendError::Disconnected(message)) => {
                warn!(
                    "MIDI output thread gone, dropping {:02X?}",
                    message.as_bytes()
                );
                false
            }
        }
    }

    pub fn send_note(&self, note: NoteMessage) -> bool {
        debug!(
            "Sending MIDI Note {}: ch={}, note={}, vel={}",
            if note.on { "On" } else { "Off" },
            note.channel,
            note.note,
            note.velocity
        );
        self.send(&note)
    }

    pub fn send_controller_change(&self, change: ControllerChange) -> bool {
        debug!(
            "Sending Control Change: ch={}, cc={}, value={}",
            change.channel, change.controller, change.value
        );
        self.send(&change)
    }

    pub fn send_song_position(&self, position: SongPosition) -> bool {
        debug!("Sending Song Position: {}", position.position);
        self.send(&position)
    }

    pub fn send_transport(&self, command: TransportCommand) -> bool {
        debug!("Sending transport {:?}", command);
        self.send(&TransportEvent::new(command))
    }

    pub fn send_timing_clock(&self) -> bool {
        self.send(&TimingClock)
    }

    pub fn queued(&self) -> usize {
        self.tx.len()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.tx.capacity()
    }
}

// Writes one message and waits for it to leave the wire. Failures are
// logged and the message is lost.
fn transmit<K: ByteSink>(sink: &mut K, message: &OutboundMessage, flush_timeout: Duration) {
    let bytes = message.as_bytes();
    match sink.write(bytes) {
        Ok(written) if written < bytes.len() => {
            warn!(
                "Short MIDI write: {} of {} bytes of {:02X?}",
                written,
                bytes.len(),
                bytes
            );
        }
        Ok(_) => trace!("Sent {:02X?}", bytes),
        Err(e) => {
            error!("Failed to send MIDI message {:02X?}: {}", bytes, e);
            return;
        }
    }

    match sink.wait_flush(flush_timeout) {
        Ok(()) => {}
        Err(MidiError::FlushTimeout(timeout)) => {
            warn!("MIDI flush exceeded {:?}, continuing", timeout);
        }
        Err(e) => warn!("MIDI flush failed: {}", e),
    }
}

/// Transmit loop: sends queued messages one at a time, in order, until every
/// [`MidiSender`] has been dropped.
pub fn process_midi_messages<K: ByteSink>(
    sink: &mut K,
    rx: Receiver<OutboundMessage>,
    flush_timeout: Duration,
) {
    info!("MIDI output thread started");

    while let Ok(message) = rx.recv() {
        transmit(sink, &message, flush_timeout);
    }

    info!("MIDI output thread stopping");
}
