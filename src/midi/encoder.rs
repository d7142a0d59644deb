//! Serializes typed events back into wire bytes.

use super::engine::{MidiError, Result};
use super::event::{ControllerChange, NoteMessage, SongPosition, TransportEvent};
use super::protocol::{is_status_byte, MessageType, Packet4};

// USB-MIDI code index numbers, carried in the reserved slot for diagnostics.
const CIN_SYSTEM_COMMON_3: u8 = 0x3;
const CIN_SINGLE_BYTE: u8 = 0x5;
const CIN_NOTE_OFF: u8 = 0x8;
const CIN_NOTE_ON: u8 = 0x9;
const CIN_CONTROL_CHANGE: u8 = 0xB;

/// Anything that can be sent on the wire.
pub trait ToPacket {
    fn to_packet(&self) -> Packet4;

    /// Number of packet bytes after the reserved slot that go on the wire.
    fn wire_len(&self) -> usize;
}

impl ToPacket for ControllerChange {
    fn to_packet(&self) -> Packet4 {
        Packet4::new(
            CIN_CONTROL_CHANGE,
            MessageType::ControlChange as u8 | (self.channel & 0x0F),
            self.controller & 0x7F,
            self.value & 0x7F,
        )
    }

    fn wire_len(&self) -> usize {
        3
    }
}

impl ToPacket for NoteMessage {
    fn to_packet(&self) -> Packet4 {
        let (cin, ty) = if self.on {
            (CIN_NOTE_ON, MessageType::NoteOn)
        } else {
            (CIN_NOTE_OFF, MessageType::NoteOff)
        };
        Packet4::new(
            cin,
            ty as u8 | (self.channel & 0x0F),
            self.note & 0x7F,
            self.velocity & 0x7F,
        )
    }

    fn wire_len(&self) -> usize {
        3
    }
}

impl ToPacket for SongPosition {
    fn to_packet(&self) -> Packet4 {
        Packet4::new(
            CIN_SYSTEM_COMMON_3,
            MessageType::SongPosition as u8,
            (self.position & 0x7F) as u8,
            ((self.position >> 7) & 0x7F) as u8,
        )
    }

    fn wire_len(&self) -> usize {
        3
    }
}

impl ToPacket for TransportEvent {
    fn to_packet(&self) -> Packet4 {
        Packet4::new(CIN_SINGLE_BYTE, self.command as u8, 0, 0)
    }

    // system real-time messages carry no data bytes
    fn wire_len(&self) -> usize {
        1
    }
}

/// The timing clock real-time message, 0xF8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimingClock;

impl ToPacket for TimingClock {
    fn to_packet(&self) -> Packet4 {
        Packet4::new(CIN_SINGLE_BYTE, MessageType::TimingClock as u8, 0, 0)
    }

    fn wire_len(&self) -> usize {
        1
    }
}

/// One queued wire message: a status byte plus zero or two data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundMessage {
    bytes: [u8; 3],
    len: usize,
}

impl OutboundMessage {
    /// Takes the first `wire_len` bytes after the reserved slot. Only 1 and 3
    /// byte messages are produced; a packet without a status byte is refused.
    pub fn from_packet(packet: Packet4, wire_len: usize) -> Result<Self> {
        if !is_status_byte(packet.status()) {
            return Err(MidiError::InvalidMessage(packet.status()));
        }
        let len = if wire_len <= 1 { 1 } else { 3 };
        let mut bytes = [packet.status(), packet.data1(), packet.data2()];
        if len == 1 {
            bytes[1] = 0;
            bytes[2] = 0;
        }
        Ok(Self { bytes, len })
    }

    pub fn encode<E: ToPacket + ?Sized>(event: &E) -> Result<Self> {
        Self::from_packet(event.to_packet(), event.wire_len())
    }

    /// The wire bytes; always 1 or 3 of them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::event::TransportCommand;

    #[test]
    fn test_controller_change_encoding() {
        let msg = OutboundMessage::encode(&ControllerChange::new(5, 7, 100)).unwrap();
        assert_eq!(msg.as_bytes(), &[0xB5, 7, 100]);
    }

    #[test]
    fn test_note_encoding() {
        let on = OutboundMessage::encode(&NoteMessage::new(1, true, 3, 127)).unwrap();
        assert_eq!(on.as_bytes(), &[0x91, 3, 127]);
        let off = OutboundMessage::encode(&NoteMessage::new(15, false, 60, 64)).unwrap();
        assert_eq!(off.as_bytes(), &[0x8F, 60, 64]);
    }

    #[test]
    fn test_song_position_encoding() {
        let msg = OutboundMessage::encode(&SongPosition::new(0x1234)).unwrap();
        assert_eq!(msg.as_bytes(), &[0xF2, 0x34, 0x24]);
    }

    #[test]
    fn test_single_byte_messages() {
        let start =
            OutboundMessage::encode(&TransportEvent::new(TransportCommand::Start)).unwrap();
        assert_eq!(start.as_bytes(), &[0xFA]);
        assert_eq!(start.as_bytes().len(), 1);
        let clock = OutboundMessage::encode(&TimingClock).unwrap();
        assert_eq!(clock.as_bytes(), &[0xF8]);
    }

    #[test]
    fn test_packet_carries_code_index() {
        assert_eq!(NoteMessage::new(0, true, 60, 1).to_packet().reserved(), 0x9);
        assert_eq!(SongPosition::new(0).to_packet().reserved(), 0x3);
    }

    #[test]
    fn test_unknown_transport_is_refused() {
        let result = OutboundMessage::encode(&TransportEvent::new(TransportCommand::Unknown));
        assert_eq!(result, Err(MidiError::InvalidMessage(0x00)));
    }
}
