//! Typed domain events produced by the dispatcher and consumed by the encoder.

/// Note On / Note Off on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteMessage {
    pub channel: u8,
    pub on: bool,
    pub note: u8,
    pub velocity: u8,
}

impl NoteMessage {
    /// Builds a note message. A Note On with velocity 0 is a Note Off.
    pub fn new(channel: u8, on: bool, note: u8, velocity: u8) -> Self {
        Self {
            channel: channel & 0x0F,
            on: on && velocity > 0,
            note: note & 0x7F,
            velocity: velocity & 0x7F,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerChange {
    pub channel: u8,
    pub controller: u8,
    pub value: u8,
}

impl ControllerChange {
    pub fn new(channel: u8, controller: u8, value: u8) -> Self {
        Self {
            channel: channel & 0x0F,
            controller,
            value,
        }
    }
}

/// Song position pointer, in MIDI beats (sixteenth notes), 14 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SongPosition {
    pub position: u16,
}

impl SongPosition {
    pub const MAX: u16 = 0x3FFF;

    pub fn new(position: u16) -> Self {
        Self {
            position: position & Self::MAX,
        }
    }

    /// Assembles the position from its two 7-bit halves, LSB first.
    pub fn from_data(lsb: u8, msb: u8) -> Self {
        Self {
            position: (u16::from(msb & 0x7F) << 7) | u16::from(lsb & 0x7F),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransportCommand {
    Start = 0xFA,
    Continue = 0xFB,
    Stop = 0xFC,
    Unknown = 0x00,
}

impl From<u8> for TransportCommand {
    fn from(status: u8) -> Self {
        match status {
            0xFA => TransportCommand::Start,
            0xFB => TransportCommand::Continue,
            0xFC => TransportCommand::Stop,
            _ => TransportCommand::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportEvent {
    pub command: TransportCommand,
}

impl TransportEvent {
    pub fn new(command: TransportCommand) -> Self {
        Self { command }
    }
}

/// The closed set of events delivered to application handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidiEvent {
    Note(NoteMessage),
    Controller(ControllerChange),
    SongPosition(SongPosition),
    Transport(TransportEvent),
    /// Smoothed tempo, rounded to whole beats per minute.
    Bpm(u8),
}

impl From<NoteMessage> for MidiEvent {
    fn from(msg: NoteMessage) -> Self {
        MidiEvent::Note(msg)
    }
}

impl From<ControllerChange> for MidiEvent {
    fn from(msg: ControllerChange) -> Self {
        MidiEvent::Controller(msg)
    }
}

impl From<SongPosition> for MidiEvent {
    fn from(msg: SongPosition) -> Self {
        MidiEvent::SongPosition(msg)
    }
}

impl From<TransportEvent> for MidiEvent {
    fn from(msg: TransportEvent) -> Self {
        MidiEvent::Transport(msg)
    }
}
