//! Classifies framed packets and delivers typed events to registered handlers.

use super::clock::TempoEstimator;
use super::event::{
    ControllerChange, MidiEvent, NoteMessage, SongPosition, TransportCommand, TransportEvent,
};
use super::protocol::{MessageType, Packet4};
use crossbeam::channel::{Sender, TrySendError};
use log::{debug, trace, warn};

pub type Handler<T> = Box<dyn FnMut(T) + Send>;

/// Optional sink per event kind. Kinds without a handler are skipped.
///
/// Handlers run on the receive thread and must return quickly.
#[derive(Default)]
pub struct EventHandlers {
    note: Option<Handler<NoteMessage>>,
    controller: Option<Handler<ControllerChange>>,
    song_position: Option<Handler<SongPosition>>,
    transport: Option<Handler<TransportEvent>>,
    bpm: Option<Handler<u8>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_note<F>(mut self, handler: F) -> Self
    where
        F: FnMut(NoteMessage) + Send + 'static,
    {
        self.note = Some(Box::new(handler));
        self
    }

    pub fn on_controller_change<F>(mut self, handler: F) -> Self
    where
        F: FnMut(ControllerChange) + Send + 'static,
    {
        self.controller = Some(Box::new(handler));
        self
    }

    pub fn on_song_position<F>(mut self, handler: F) -> Self
    where
        F: FnMut(SongPosition) + Send + 'static,
    {
        self.song_position = Some(Box::new(handler));
        self
    }

    pub fn on_transport<F>(mut self, handler: F) -> Self
    where
        F: FnMut(TransportEvent) + Send + 'static,
    {
        self.transport = Some(Box::new(handler));
        self
    }

    pub fn on_bpm<F>(mut self, handler: F) -> Self
    where
        F: FnMut(u8) + Send + 'static,
    {
        self.bpm = Some(Box::new(handler));
        self
    }

    /// Routes every event kind into `tx`. Sends never block; events that do
    /// not fit are dropped with a warning.
    pub fn forward_to(tx: Sender<MidiEvent>) -> Self {
        let note_tx = tx.clone();
        let controller_tx = tx.clone();
        let position_tx = tx.clone();
        let transport_tx = tx.clone();
        Self::new()
            .on_note(move |msg| forward(&note_tx, msg.into()))
            .on_controller_change(move |msg| forward(&controller_tx, msg.into()))
            .on_song_position(move |msg| forward(&position_tx, msg.into()))
            .on_transport(move |msg| forward(&transport_tx, msg.into()))
            .on_bpm(move |bpm| forward(&tx, MidiEvent::Bpm(bpm)))
    }

    pub fn has_bpm_handler(&self) -> bool {
        self.bpm.is_some()
    }

    /// Invokes the handler registered for the event's kind. Returns whether
    /// one was registered.
    pub fn deliver(&mut self, event: MidiEvent) -> bool {
        match event {
            MidiEvent::Note(msg) => call(&mut self.note, msg),
            MidiEvent::Controller(msg) => call(&mut self.controller, msg),
            MidiEvent::SongPosition(msg) => call(&mut self.song_position, msg),
            MidiEvent::Transport(msg) => call(&mut self.transport, msg),
            MidiEvent::Bpm(bpm) => call(&mut self.bpm, bpm),
        }
    }
}

fn call<T>(handler: &mut Option<Handler<T>>, value: T) -> bool {
    match handler {
        Some(handler) => {
            handler(value);
            true
        }
        None => false,
    }
}

fn forward(tx: &Sender<MidiEvent>, event: MidiEvent) {
    match tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => warn!("Event channel full, dropping {:?}", event),
        Err(TrySendError::Disconnected(event)) => {
            debug!("Event channel closed, dropping {:?}", event)
        }
    }
}

/// What a single packet means to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Event(MidiEvent),
    ClockTick,
    Unrecognized(MessageType),
}

/// Decodes a packet without side effects.
pub fn decode(packet: &Packet4) -> Decoded {
    let status = packet.status();

    match MessageType::from_status(status) {
        MessageType::Start | MessageType::Continue | MessageType::Stop => {
            Decoded::Event(TransportEvent::new(TransportCommand::from(status)).into())
        }
        MessageType::TimingClock => Decoded::ClockTick,
        MessageType::SongPosition => {
            Decoded::Event(SongPosition::from_data(packet.data1(), packet.data2()).into())
        }
        MessageType::ControlChange => Decoded::Event(
            ControllerChange::new(status & 0x0F, packet.data1(), packet.data2()).into(),
        ),
        ty @ (MessageType::NoteOn | MessageType::NoteOff) => Decoded::Event(
            NoteMessage::new(
                status & 0x0F,
                ty == MessageType::NoteOn,
                packet.data1(),
                packet.data2(),
            )
            .into(),
        ),
        other => Decoded::Unrecognized(other),
    }
}

/// Turns framed packets into events, feeding timing clock ticks to the
/// tempo estimator.
pub struct EventDispatcher {
    handlers: EventHandlers,
    tempo: TempoEstimator,
}

impl EventDispatcher {
    pub fn new(handlers: EventHandlers) -> Self {
        Self {
            handlers,
            tempo: TempoEstimator::new(),
        }
    }

    pub fn tempo(&self) -> &TempoEstimator {
        &self.tempo
    }

    /// Dispatches one packet. `timestamp_us` is the arrival time used for
    /// timing clock ticks.
    pub fn dispatch(&mut self, packet: Packet4, timestamp_us: u64) {
        trace!("Dispatching {}", packet);

        match decode(&packet) {
            Decoded::ClockTick => self.tick(timestamp_us),
            Decoded::Event(MidiEvent::Controller(msg)) => {
                self.apply_tempo_control(&msg);
                self.handlers.deliver(MidiEvent::Controller(msg));
            }
            Decoded::Event(event) => {
                self.handlers.deliver(event);
            }
            Decoded::Unrecognized(ty) => {
                debug!(
                    "Unknown MIDI message: {}, {}, {}, {}, {}",
                    ty,
                    packet.reserved(),
                    packet.status(),
                    packet.data1(),
                    packet.data2()
                );
            }
        }
    }

    fn tick(&mut self, timestamp_us: u64) {
        if !self.handlers.has_bpm_handler() {
            return;
        }
        if let Some(bpm) = self.tempo.on_tick(timestamp_us) {
            self.handlers.deliver(MidiEvent::Bpm(bpm));
        }
    }

    // Controller numbers equal to the Stop/Start status bytes switch tempo
    // estimation off and on.
    fn apply_tempo_control(&mut self, msg: &ControllerChange) {
        if msg.controller == MessageType::Stop as u8 && msg.value == 0 {
            self.tempo.stop();
        } else if msg.controller == MessageType::Start as u8 && msg.value > 0 {
            self.tempo.start();
        }
    }
}
