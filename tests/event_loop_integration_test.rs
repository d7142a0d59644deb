mod common;

use common::init_logging;
use crossbeam::channel::unbounded;
use midibridge::event_loop::EventLoop;
use midibridge::midi::{
    ByteSource, ChannelByteSource, EventDispatcher, EventHandlers, ManualClock, MidiError,
    MidiEvent, MockByteSink, NoteMessage, SongPosition, TransportCommand, TransportEvent,
};
use midibridge::{create_scheduler, Bridge, BridgeConfig};
use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

/// Replays a fixed list of wake-ups, then reports a disconnect.
struct ScriptedSource {
    steps: VecDeque<Result<Vec<u8>, MidiError>>,
    pending: Vec<u8>,
}

impl ScriptedSource {
    fn new(steps: Vec<Result<Vec<u8>, MidiError>>) -> Self {
        Self {
            steps: steps.into(),
            pending: Vec::new(),
        }
    }
}

impl ByteSource for ScriptedSource {
    fn wait_for_data(&mut self) -> Result<(), MidiError> {
        match self.steps.pop_front() {
            Some(Ok(chunk)) => {
                self.pending = chunk;
                Ok(())
            }
            Some(Err(e)) => Err(e),
            None => Err(MidiError::Disconnected),
        }
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, MidiError> {
        let count = buf.len().min(self.pending.len());
        buf[..count].copy_from_slice(&self.pending[..count]);
        self.pending.drain(..count);
        Ok(count)
    }
}

#[test]
fn integration_test_messages_split_across_reads() {
    init_logging();
    let (byte_tx, byte_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();

    let dispatcher = EventDispatcher::new(EventHandlers::forward_to(event_tx));
    // a tiny read buffer forces partial messages across reads
    let mut event_loop = EventLoop::new(
        ChannelByteSource::new(byte_rx),
        ManualClock::new(0),
        dispatcher,
        2,
    );

    let handle = thread::spawn(move || event_loop.run());

    byte_tx.send(vec![0x90]).unwrap();
    byte_tx.send(vec![0x40]).unwrap();
    byte_tx.send(vec![0x7F, 0x41]).unwrap();
    byte_tx.send(vec![0x00, 0xF2, 0x05]).unwrap();
    byte_tx.send(vec![0x01, 0xFA]).unwrap();

    // closing the source ends the loop
    drop(byte_tx);
    handle.join().expect("Event loop thread panicked");

    let events: Vec<MidiEvent> = event_rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            MidiEvent::Note(NoteMessage::new(0, true, 0x40, 0x7F)),
            MidiEvent::Note(NoteMessage::new(0, false, 0x41, 0x00)),
            MidiEvent::SongPosition(SongPosition::new(0x85)),
            MidiEvent::Transport(TransportEvent::new(TransportCommand::Start)),
        ]
    );
}

#[test]
fn integration_test_input_error_does_not_stop_the_loop() {
    init_logging();
    let (event_tx, event_rx) = unbounded();
    let source = ScriptedSource::new(vec![
        Ok(vec![0xFA]),
        Err(MidiError::Read("uart overrun".to_string())),
        Ok(vec![0xFC]),
    ]);
    let mut event_loop = EventLoop::new(
        source,
        ManualClock::new(0),
        EventDispatcher::new(EventHandlers::forward_to(event_tx)),
        16,
    );

    event_loop.run();

    let events: Vec<MidiEvent> = event_rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            MidiEvent::Transport(TransportEvent::new(TransportCommand::Start)),
            MidiEvent::Transport(TransportEvent::new(TransportCommand::Stop)),
        ]
    );
}

#[test]
fn integration_test_clock_bytes_produce_bpm() {
    init_logging();
    let (byte_tx, byte_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();
    let clock = ManualClock::new(0);

    let mut event_loop = EventLoop::new(
        ChannelByteSource::new(byte_rx),
        clock.clone(),
        EventDispatcher::new(EventHandlers::forward_to(event_tx)),
        256,
    );

    // 5 beats at 90 BPM, one tick per read
    for _ in 0..(5 * 24) {
        clock.advance(666_667 / 24);
        event_loop.process_bytes(&[0xF8]);
    }
    drop(byte_tx);
    event_loop.run();

    let events: Vec<MidiEvent> = event_rx.try_iter().collect();
    assert_eq!(events, vec![MidiEvent::Bpm(90)]);
}

#[test]
fn integration_test_bridge_end_to_end() {
    init_logging();
    let (byte_tx, byte_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();
    let sink = MockByteSink::new();
    let config = BridgeConfig {
        demo_interval: None,
        ..BridgeConfig::default()
    };

    let bridge = Bridge::start(
        &config,
        &create_scheduler(),
        ChannelByteSource::new(byte_rx),
        sink.clone(),
        ManualClock::new(0),
        EventHandlers::forward_to(event_tx),
    )
    .unwrap();

    // echo every received note back out
    byte_tx.send(vec![0x95, 0x30, 0x60]).unwrap();
    let received = event_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("no event received");
    let MidiEvent::Note(note) = received else {
        panic!("expected a note, got {:?}", received);
    };
    assert!(bridge.sender().send_note(note));

    drop(byte_tx);
    bridge.join();

    assert_eq!(sink.written(), vec![vec![0x95, 0x30, 0x60]]);
}
