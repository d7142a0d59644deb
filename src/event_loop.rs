// event_loop.rs

use crate::midi::{ByteSource, EventDispatcher, FrameAssembler, MidiError, TimeSource};
use log::{error, info, trace, warn};

/// Receive flow: drains the byte source, frames bytes and dispatches every
/// completed packet on this thread, in arrival order.
pub struct EventLoop<S: ByteSource, C: TimeSource> {
    source: S,
    clock: C,
    assembler: FrameAssembler,
    dispatcher: EventDispatcher,
    read_buffer: Vec<u8>,
}

impl<S: ByteSource, C: TimeSource> EventLoop<S, C> {
    pub fn new(
        source: S,
        clock: C,
        dispatcher: EventDispatcher,
        read_buffer_size: usize,
    ) -> Self {
        EventLoop {
            source,
            clock,
            assembler: FrameAssembler::new(),
            dispatcher,
            read_buffer: vec![0; read_buffer_size.max(1)],
        }
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Runs until the byte source disconnects. Any other error is logged and
    /// the loop keeps waiting.
    pub fn run(&mut self) {
        info!("MIDI input loop started");
        loop {
            // Block until the source signals data.
            match self.source.wait_for_data() {
                Ok(()) => self.drain(),
                Err(MidiError::Disconnected) => {
                    info!("MIDI byte source disconnected, stopping input loop");
                    break;
                }
                Err(e) => warn!("MIDI input error, continuing: {}", e),
            }
        }
    }

    /// Reads until the source has nothing buffered.
    pub fn drain(&mut self) {
        loop {
            let count = match self.source.read_available(&mut self.read_buffer) {
                Ok(0) => return,
                Ok(count) => count,
                Err(MidiError::Disconnected) => return,
                Err(e) => {
                    error!("MIDI read failed: {}", e);
                    return;
                }
            };
            trace!("Read {} bytes", count);
            self.process_bytes_at(count);
        }
    }

    /// Frames and dispatches bytes that did not come from the source.
    pub fn process_bytes(&mut self, bytes: &[u8]) {
        frame_and_dispatch(&mut self.assembler, &mut self.dispatcher, &self.clock, bytes);
    }

    fn process_bytes_at(&mut self, count: usize) {
        frame_and_dispatch(
            &mut self.assembler,
            &mut self.dispatcher,
            &self.clock,
            &self.read_buffer[..count],
        );
    }
}

fn frame_and_dispatch<C: TimeSource>(
    assembler: &mut FrameAssembler,
    dispatcher: &mut EventDispatcher,
    clock: &C,
    bytes: &[u8],
) {
    for &byte in bytes {
        if let Some(packet) = assembler.push(byte) {
            dispatcher.dispatch(packet, clock.now_micros());
        }
    }
}
