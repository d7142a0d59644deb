//! MIDI functionality for the serial bridge
//!
//! This module provides:
//! - Wire protocol definitions and the 4-byte packet form
//! - The byte framer with running status
//! - Event decoding, dispatch and tempo estimation from timing clock
//! - Event encoding for the outbound queue
//! - Byte source/sink traits with midir-backed and mock implementations
//!
//! The main components are:
//! - [`FrameAssembler`] turning raw bytes into [`Packet4`]s
//! - [`EventDispatcher`] turning packets into [`MidiEvent`]s
//! - [`TempoEstimator`] deriving BPM from timing clock ticks
//! - [`OutboundMessage`] and [`ToPacket`] for the transmit side
//!
mod clock;
mod dispatcher;
mod encoder;
mod engine;
mod event;
mod framer;
pub mod midir_engine;
pub mod mock_engine;
pub mod protocol;

pub use engine::{
    offer_chunk, ByteSink, ByteSource, ChannelByteSource, MidiError, MonotonicClock, Result,
    TimeSource,
};

pub use event::{
    ControllerChange, MidiEvent, NoteMessage, SongPosition, TransportCommand, TransportEvent,
};

pub use protocol::{MessageType, Packet4};

pub use framer::FrameAssembler;

pub use clock::TempoEstimator;

pub use dispatcher::{decode, Decoded, EventDispatcher, EventHandlers, Handler};

pub use encoder::{OutboundMessage, TimingClock, ToPacket};

pub use midir_engine::{MidirByteSink, MidirByteSource};
pub use mock_engine::{ManualClock, MockByteSink};
