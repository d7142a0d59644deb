//! Reassembles a raw serial byte stream into complete MIDI messages.

use super::protocol::{is_realtime, is_status_byte, message_length, MessageType, Packet4};
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    Idle,
    Collecting { expected: usize },
}

/// Byte framer with running status support.
///
/// System real-time bytes are emitted as soon as they arrive and leave any
/// message in progress untouched. After a message completes its status byte
/// is kept, so data bytes that follow without a new status byte start the
/// next message under the same status.
#[derive(Debug)]
pub struct FrameAssembler {
    state: FrameState,
    buffer: [u8; 3],
    count: usize,
    running_status: Option<u8>,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            state: FrameState::Idle,
            buffer: [0; 3],
            count: 0,
            running_status: None,
        }
    }

    /// Feeds one byte, returning a packet when it completes a message.
    pub fn push(&mut self, byte: u8) -> Option<Packet4> {
        if is_realtime(byte) {
            return Some(Packet4::single_byte(byte));
        }

        if is_status_byte(byte) {
            return self.begin(byte);
        }

        match self.state {
            FrameState::Collecting { expected } => {
                self.buffer[self.count] = byte;
                self.count += 1;
                if self.count == expected {
                    return Some(self.complete());
                }
                None
            }
            FrameState::Idle => {
                let Some(status) = self.running_status else {
                    trace!("Dropping data byte {:#04X} with no status", byte);
                    return None;
                };
                // message_length is at least 2 for anything kept as running status
                let expected = message_length(status).unwrap_or(1);
                self.buffer = [status, byte, 0];
                self.count = 2;
                if self.count == expected {
                    return Some(self.complete());
                }
                self.state = FrameState::Collecting { expected };
                None
            }
        }
    }

    /// Feeds a slice of bytes, handing every completed packet to `on_packet`
    /// in arrival order.
    pub fn feed<F>(&mut self, bytes: &[u8], mut on_packet: F)
    where
        F: FnMut(Packet4),
    {
        for &byte in bytes {
            if let Some(packet) = self.push(byte) {
                on_packet(packet);
            }
        }
    }

    /// Drops any partial message and the running status.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.state, FrameState::Collecting { .. })
    }

    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    fn begin(&mut self, status: u8) -> Option<Packet4> {
        self.buffer = [status, 0, 0];
        self.count = 1;

        let expected = match message_length(status) {
            Some(len) if len > 0 => len,
            _ => {
                debug!(
                    "Discarding unsupported {} status {:#04X} ({:08b})",
                    MessageType::from_status(status),
                    status,
                    status
                );
                self.state = FrameState::Idle;
                self.count = 0;
                self.running_status = None;
                return None;
            }
        };

        self.running_status = if expected > 1 { Some(status) } else { None };

        if expected == 1 {
            return Some(self.complete());
        }
        self.state = FrameState::Collecting { expected };
        None
    }

    fn complete(&mut self) -> Packet4 {
        let packet = Packet4::new(0, self.buffer[0], self.buffer[1], self.buffer[2]);
        trace!("Framed {}", packet);
        self.state = FrameState::Idle;
        self.count = 0;
        packet
    }
}
