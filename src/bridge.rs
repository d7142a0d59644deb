//! Application context tying the receive and transmit flows together.

use crate::config::BridgeConfig;
use crate::event_loop::EventLoop;
use crate::midi::{ByteSink, ByteSource, EventDispatcher, EventHandlers, TimeSource};
use crate::midi_output::{outbound_queue, process_midi_messages, MidiSender};
use crate::scheduler::Scheduler;
use log::{error, info};
use std::io;
use std::thread::JoinHandle;

/// Owns the outbound producer handle and both flow threads.
///
/// The transmit thread runs until every [`MidiSender`] clone, including the
/// one held here, is dropped; the receive thread runs until its byte source
/// disconnects.
pub struct Bridge {
    sender: MidiSender,
    receive: JoinHandle<()>,
    transmit: JoinHandle<()>,
}

impl Bridge {
    pub fn start<T, S, K, C>(
        config: &BridgeConfig,
        scheduler: &T,
        source: S,
        sink: K,
        clock: C,
        handlers: EventHandlers,
    ) -> io::Result<Self>
    where
        T: Scheduler,
        S: ByteSource + 'static,
        K: ByteSink + 'static,
        C: TimeSource + 'static,
    {
        let (sender, rx) = outbound_queue(config.queue_capacity);

        let flush_timeout = config.flush_timeout;
        let mut sink = sink;
        let transmit = scheduler.spawn("midi-out", move || {
            process_midi_messages(&mut sink, rx, flush_timeout);
        })?;

        let dispatcher = EventDispatcher::new(handlers);
        let mut event_loop = EventLoop::new(source, clock, dispatcher, config.read_buffer_size);
        let receive = scheduler.spawn("midi-in", move || {
            event_loop.run();
        })?;

        info!(
            "MIDI bridge started (queue capacity {}, flush timeout {:?})",
            config.queue_capacity, config.flush_timeout
        );

        Ok(Bridge {
            sender,
            receive,
            transmit,
        })
    }

    /// A producer handle for the outbound queue, usable from any thread.
    pub fn sender(&self) -> MidiSender {
        self.sender.clone()
    }

    /// Waits for both flows to end. Other [`MidiSender`] clones must be dropped
    /// first or the transmit flow keeps waiting.
    pub fn join(self) {
        drop(self.sender);
        if self.receive.join().is_err() {
            error!("MIDI input thread panicked");
        }
        if self.transmit.join().is_err() {
            error!("MIDI output thread panicked");
        }
    }
}
