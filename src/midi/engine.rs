use crossbeam::channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use log::warn;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

/// Custom error type for MIDI byte I/O
#[derive(Debug, Clone, PartialEq)]
pub enum MidiError {
    /// Error when reading from the byte source
    Read(String),
    /// Error when writing to the byte sink
    Write(String),
    /// Error when connecting to a MIDI device
    Connection(String),
    /// Every producer feeding the byte source is gone
    Disconnected,
    /// Bytes were handed to the sink but not flushed in time
    FlushTimeout(Duration),
    /// A packet whose status slot does not hold a status byte
    InvalidMessage(u8),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::Read(msg) => write!(f, "MIDI read error: {}", msg),
            MidiError::Write(msg) => write!(f, "MIDI write error: {}", msg),
            MidiError::Connection(msg) => write!(f, "MIDI connection error: {}", msg),
            MidiError::Disconnected => write!(f, "MIDI byte source disconnected"),
            MidiError::FlushTimeout(timeout) => {
                write!(f, "MIDI flush did not complete within {:?}", timeout)
            }
            MidiError::InvalidMessage(status) => {
                write!(f, "Invalid MIDI status byte: {:#04X}", status)
            }
        }
    }
}

impl Error for MidiError {}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Incoming raw bytes, e.g. a UART receive buffer
pub trait ByteSource: Send {
    /// Blocks until at least one byte can be read.
    fn wait_for_data(&mut self) -> Result<()>;

    /// Copies whatever is buffered into `buf` without blocking. Zero is a valid result.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Outgoing raw bytes
pub trait ByteSink: Send {
    /// Hands bytes to the transmitter, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Waits until written bytes have physically left the device.
    fn wait_flush(&mut self, timeout: Duration) -> Result<()>;
}

/// Monotonic microsecond clock
pub trait TimeSource: Send {
    fn now_micros(&self) -> u64;
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Byte source fed with chunks over a channel.
///
/// Chunks may split messages anywhere; bytes that do not fit the caller's
/// buffer stay queued for the next read.
pub struct ChannelByteSource {
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

impl ChannelByteSource {
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: VecDeque::with_capacity(256),
        }
    }

    /// A source behind a channel holding at most `capacity` chunks. Feed it
    /// with [`offer_chunk`].
    pub fn bounded(capacity: usize) -> (Sender<Vec<u8>>, Self) {
        let (tx, rx) = bounded(capacity.max(1));
        (tx, Self::new(rx))
    }
}

/// Hands a chunk to a [`ChannelByteSource`] without blocking. A chunk that
/// does not fit is dropped with a warning; returns whether it was queued.
pub fn offer_chunk(tx: &Sender<Vec<u8>>, bytes: &[u8]) -> bool {
    match tx.try_send(bytes.to_vec()) {
        Ok(()) => true,
        Err(TrySendError::Full(chunk)) => {
            warn!("MIDI input queue full, dropping {:02X?}", chunk);
            false
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

impl ByteSource for ChannelByteSource {
    fn wait_for_data(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            return Ok(());
        }
        match self.rx.recv() {
            Ok(chunk) => {
                self.pending.extend(chunk);
                Ok(())
            }
            Err(_) => Err(MidiError::Disconnected),
        }
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) if self.pending.is_empty() => {
                    return Err(MidiError::Disconnected)
                }
                Err(TryRecvError::Disconnected) => break,
            }
        }

        let count = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}
