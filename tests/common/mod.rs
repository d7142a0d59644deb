#![allow(dead_code)]

use crossbeam::channel::{unbounded, Receiver};
use midibridge::midi::{EventDispatcher, EventHandlers, FrameAssembler, MidiEvent, Packet4};

pub const TICKS_PER_BEAT: u64 = 24;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Dispatcher whose events all land in the returned channel.
pub fn recording_dispatcher() -> (EventDispatcher, Receiver<MidiEvent>) {
    let (tx, rx) = unbounded();
    (EventDispatcher::new(EventHandlers::forward_to(tx)), rx)
}

/// Frames `bytes` and dispatches every packet at timestamp 0.
pub fn decode_bytes(bytes: &[u8]) -> Vec<MidiEvent> {
    let (mut dispatcher, rx) = recording_dispatcher();
    let mut assembler = FrameAssembler::new();
    assembler.feed(bytes, |packet| dispatcher.dispatch(packet, 0));
    rx.try_iter().collect()
}

/// Dispatches `beats` beats worth of timing clock ticks, evenly spaced at
/// `beat_us` per beat, starting after `start_us`. Returns the timestamp of
/// the last tick.
pub fn feed_clock(
    dispatcher: &mut EventDispatcher,
    start_us: u64,
    beat_us: u64,
    beats: u64,
) -> u64 {
    let mut last = start_us;
    for tick in 1..=beats * TICKS_PER_BEAT {
        last = start_us + tick * beat_us / TICKS_PER_BEAT;
        dispatcher.dispatch(Packet4::single_byte(0xF8), last);
    }
    last
}

pub fn bpm_events(rx: &Receiver<MidiEvent>) -> Vec<u8> {
    rx.try_iter()
        .filter_map(|event| match event {
            MidiEvent::Bpm(bpm) => Some(bpm),
            _ => None,
        })
        .collect()
}
