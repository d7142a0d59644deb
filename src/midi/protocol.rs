//! Wire-level MIDI definitions: status classes, message lengths and the
//! fixed 4-byte packet passed between the framer, dispatcher and encoder.

use std::fmt;

/// Status byte classes, valued by their status byte (channel nibble cleared
/// for channel voice messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    NoteOff = 0x80,
    NoteOn = 0x90,
    PolyAftertouch = 0xA0,
    ControlChange = 0xB0,
    ProgramChange = 0xC0,
    ChannelPressure = 0xD0,
    PitchBend = 0xE0,

    // System messages (0xF0–0xFF)
    SystemExclusive = 0xF0,
    TimeCodeQuarter = 0xF1,
    SongPosition = 0xF2,
    SongSelect = 0xF3,
    TuneRequest = 0xF6,
    EndOfExclusive = 0xF7,
    TimingClock = 0xF8,
    Start = 0xFA,
    Continue = 0xFB,
    Stop = 0xFC,
    ActiveSensing = 0xFE,
    SystemReset = 0xFF,

    Unknown = 0x00,
}

impl MessageType {
    /// Classifies a status byte. System messages are matched on the exact
    /// byte, channel voice messages on the high nibble. Data bytes and
    /// undefined system bytes map to [`MessageType::Unknown`].
    pub fn from_status(status: u8) -> Self {
        if status >= 0xF0 {
            return Self::from_system(status);
        }
        match status & 0xF0 {
            0x80 => Self::NoteOff,
            0x90 => Self::NoteOn,
            0xA0 => Self::PolyAftertouch,
            0xB0 => Self::ControlChange,
            0xC0 => Self::ProgramChange,
            0xD0 => Self::ChannelPressure,
            0xE0 => Self::PitchBend,
            _ => Self::Unknown,
        }
    }

    fn from_system(status: u8) -> Self {
        match status {
            0xF0 => Self::SystemExclusive,
            0xF1 => Self::TimeCodeQuarter,
            0xF2 => Self::SongPosition,
            0xF3 => Self::SongSelect,
            0xF6 => Self::TuneRequest,
            0xF7 => Self::EndOfExclusive,
            0xF8 => Self::TimingClock,
            0xFA => Self::Start,
            0xFB => Self::Continue,
            0xFC => Self::Stop,
            0xFE => Self::ActiveSensing,
            0xFF => Self::SystemReset,
            _ => Self::Unknown,
        }
    }

    /// Total wire length (status plus data bytes), or `None` for System
    /// Exclusive, whose length is not fixed.
    pub fn message_length(self) -> Option<usize> {
        use MessageType as T;
        match self {
            // 3-byte channel voice messages
            T::NoteOff | T::NoteOn | T::PolyAftertouch | T::ControlChange | T::PitchBend => {
                Some(3)
            }

            // 2-byte channel voice messages
            T::ProgramChange | T::ChannelPressure => Some(2),

            // System Common
            T::SongPosition => Some(3),
            T::TimeCodeQuarter | T::SongSelect => Some(2),
            T::TuneRequest | T::EndOfExclusive => Some(1),

            // System Real-Time
            T::TimingClock
            | T::Start
            | T::Continue
            | T::Stop
            | T::ActiveSensing
            | T::SystemReset => Some(1),

            T::SystemExclusive => None,

            T::Unknown => Some(1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageType::NoteOff => "Note Off",
            MessageType::NoteOn => "Note On",
            MessageType::PolyAftertouch => "Poly Aftertouch",
            MessageType::ControlChange => "Control Change",
            MessageType::ProgramChange => "Program Change",
            MessageType::ChannelPressure => "Channel Pressure",
            MessageType::PitchBend => "Pitch Bend",
            MessageType::SystemExclusive => "System Exclusive",
            MessageType::TimeCodeQuarter => "Time Code Quarter",
            MessageType::SongPosition => "Song Position",
            MessageType::SongSelect => "Song Select",
            MessageType::TuneRequest => "Tune Request",
            MessageType::EndOfExclusive => "End of SysEx",
            MessageType::TimingClock => "Timing Clock",
            MessageType::Start => "Start",
            MessageType::Continue => "Continue",
            MessageType::Stop => "Stop",
            MessageType::ActiveSensing => "Active Sensing",
            MessageType::SystemReset => "System Reset",
            MessageType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire length of the message introduced by `status`.
pub fn message_length(status: u8) -> Option<usize> {
    MessageType::from_status(status).message_length()
}

pub fn is_status_byte(byte: u8) -> bool {
    byte & 0x80 != 0
}

/// System real-time bytes may appear between the bytes of any other message.
pub fn is_realtime(byte: u8) -> bool {
    byte >= 0xF8
}

/// A complete message in fixed-shape form: `[reserved, status, data1, data2]`.
///
/// The reserved slot historically holds a USB-MIDI code index. Decoding never
/// looks at it; packets built by the framer always carry 0 there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Packet4([u8; 4]);

impl Packet4 {
    pub const fn new(reserved: u8, status: u8, data1: u8, data2: u8) -> Self {
        Packet4([reserved, status, data1, data2])
    }

    /// Single-byte system message (real-time or 1-byte common), `[0, status, 0, 0]`.
    pub const fn single_byte(status: u8) -> Self {
        Packet4([0, status, 0, 0])
    }

    pub fn reserved(&self) -> u8 {
        self.0[0]
    }

    pub fn status(&self) -> u8 {
        self.0[1]
    }

    pub fn data1(&self) -> u8 {
        self.0[2]
    }

    pub fn data2(&self) -> u8 {
        self.0[3]
    }

    pub fn message_type(&self) -> MessageType {
        MessageType::from_status(self.status())
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for Packet4 {
    fn from(bytes: [u8; 4]) -> Self {
        Packet4(bytes)
    }
}

impl fmt::Display for Packet4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:02X} {:02X} {:02X} {:02X}]",
            self.message_type(),
            self.0[0],
            self.0[1],
            self.0[2],
            self.0[3]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_voice_classification_ignores_channel() {
        assert_eq!(MessageType::from_status(0x93), MessageType::NoteOn);
        assert_eq!(MessageType::from_status(0x8F), MessageType::NoteOff);
        assert_eq!(MessageType::from_status(0xBA), MessageType::ControlChange);
        assert_eq!(MessageType::from_status(0xE0), MessageType::PitchBend);
    }

    #[test]
    fn test_system_classification_uses_exact_byte() {
        assert_eq!(MessageType::from_status(0xF2), MessageType::SongPosition);
        assert_eq!(MessageType::from_status(0xF8), MessageType::TimingClock);
        assert_eq!(MessageType::from_status(0xFC), MessageType::Stop);
        assert_eq!(MessageType::from_status(0xF4), MessageType::Unknown);
        assert_eq!(MessageType::from_status(0xFD), MessageType::Unknown);
    }

    #[test]
    fn test_message_lengths() {
        assert_eq!(message_length(0x90), Some(3));
        assert_eq!(message_length(0xC5), Some(2));
        assert_eq!(message_length(0xD0), Some(2));
        assert_eq!(message_length(0xF2), Some(3));
        assert_eq!(message_length(0xF1), Some(2));
        assert_eq!(message_length(0xF3), Some(2));
        assert_eq!(message_length(0xF6), Some(1));
        assert_eq!(message_length(0xF7), Some(1));
        assert_eq!(message_length(0xF8), Some(1));
        assert_eq!(message_length(0xFF), Some(1));
        assert_eq!(message_length(0xF0), None);
        // data bytes fall back to a single byte
        assert_eq!(message_length(0x40), Some(1));
    }

    #[test]
    fn test_packet_display_names_type() {
        let packet = Packet4::new(0, 0x91, 60, 100);
        assert_eq!(packet.to_string(), "Note On [00 91 3C 64]");
        assert_eq!(MessageType::EndOfExclusive.to_string(), "End of SysEx");
    }
}
