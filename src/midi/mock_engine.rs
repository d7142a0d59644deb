use crate::midi::engine::{ByteSink, MidiError, Result, TimeSource};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sink that records every write. Clones share the same recording.
#[derive(Clone, Default)]
pub struct MockByteSink {
    written: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
    fail_flush: Arc<AtomicBool>,
}

impl MockByteSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages written so far, one entry per write.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.written.lock().unwrap().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_flush(&self, fail: bool) {
        self.fail_flush.store(fail, Ordering::SeqCst);
    }
}

impl ByteSink for MockByteSink {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MidiError::Write("mock write failure".to_string()));
        }
        self.written.lock().unwrap().push(bytes.to_vec());
        Ok(bytes.len())
    }

    fn wait_flush(&mut self, timeout: Duration) -> Result<()> {
        if self.fail_flush.load(Ordering::SeqCst) {
            return Err(MidiError::FlushTimeout(timeout));
        }
        Ok(())
    }
}

/// Clock that only moves when told to.
#[derive(Clone, Default)]
pub struct ManualClock {
    now_us: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_us: u64) -> Self {
        Self {
            now_us: Arc::new(AtomicU64::new(start_us)),
        }
    }

    pub fn set(&self, now_us: u64) {
        self.now_us.store(now_us, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_us: u64) {
        self.now_us.fetch_add(delta_us, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now_micros(&self) -> u64 {
        self.now_us.load(Ordering::SeqCst)
    }
}
