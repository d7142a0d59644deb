//! Tempo estimation from MIDI timing clock ticks

use crate::config::{BPM_WINDOW, TICKS_PER_BEAT};
use log::{debug, info};

const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// Derives a smoothed BPM from timing clock ticks (24 per quarter note).
///
/// Each completed beat yields one instantaneous sample; the reported value is
/// the rounded mean of the last [`BPM_WINDOW`] samples and is only reported
/// when it changes.
#[derive(Debug)]
pub struct TempoEstimator {
    tick_count: u32,
    last_beat_us: Option<u64>,
    history: [f64; BPM_WINDOW],
    history_sum: f64,
    history_index: usize,
    samples: usize,
    current_bpm: Option<u8>,
    active: bool,
}

impl Default for TempoEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoEstimator {
    pub fn new() -> Self {
        Self {
            tick_count: 0,
            last_beat_us: None,
            history: [0.0; BPM_WINDOW],
            history_sum: 0.0,
            history_index: 0,
            samples: 0,
            current_bpm: None,
            active: true,
        }
    }

    /// Processes one timing clock tick. Returns the new BPM when the smoothed
    /// value changes.
    pub fn on_tick(&mut self, timestamp_us: u64) -> Option<u8> {
        if !self.active {
            return None;
        }

        self.tick_count += 1;
        if self.tick_count < TICKS_PER_BEAT {
            return None;
        }
        self.tick_count = 0;

        let Some(last_beat) = self.last_beat_us.replace(timestamp_us) else {
            debug!("First beat at {} us, waiting for the next", timestamp_us);
            return None;
        };

        let delta_us = timestamp_us.saturating_sub(last_beat);
        if delta_us == 0 {
            return None;
        }

        let instant_bpm = MICROS_PER_MINUTE / delta_us as f64;
        self.push_sample(instant_bpm);

        if self.samples < BPM_WINDOW {
            return None;
        }

        let average = self.history_sum / BPM_WINDOW as f64;
        let rounded = average.round().min(f64::from(u8::MAX)) as u8;

        if self.current_bpm == Some(rounded) {
            return None;
        }
        self.current_bpm = Some(rounded);
        debug!("Tempo changed to {} BPM (avg {:.2})", rounded, average);
        Some(rounded)
    }

    /// Suspends tick counting. The last reported BPM and sample history are kept.
    pub fn stop(&mut self) {
        self.active = false;
        self.reset_counters();
        info!("Tempo estimation stopped");
    }

    /// Resumes tick counting. A new value is reported only after a full
    /// window of fresh beats.
    pub fn start(&mut self) {
        self.active = true;
        self.reset_counters();
        info!("Tempo estimation started");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The last reported BPM, if any.
    pub fn current_bpm(&self) -> Option<u8> {
        self.current_bpm
    }

    fn reset_counters(&mut self) {
        self.tick_count = 0;
        self.last_beat_us = None;
        self.samples = 0;
    }

    fn push_sample(&mut self, bpm: f64) {
        self.history_sum -= self.history[self.history_index];
        self.history[self.history_index] = bpm;
        self.history_sum += bpm;
        self.history_index = (self.history_index + 1) % BPM_WINDOW;
        if self.samples < BPM_WINDOW {
            self.samples += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_beats(
        estimator: &mut TempoEstimator,
        start_us: u64,
        beat_us: u64,
        beats: u64,
    ) -> Vec<u8> {
        let ticks = u64::from(TICKS_PER_BEAT);
        (1..=beats * ticks)
            .filter_map(|tick| estimator.on_tick(start_us + tick * beat_us / ticks))
            .collect()
    }

    #[test]
    fn test_first_beat_only_sets_baseline() {
        let mut estimator = TempoEstimator::new();
        assert!(feed_beats(&mut estimator, 0, 500_000, 1).is_empty());
        assert_eq!(estimator.current_bpm(), None);
    }

    #[test]
    fn test_zero_delta_is_skipped() {
        let mut estimator = TempoEstimator::new();
        for _ in 0..(TICKS_PER_BEAT * 10) {
            assert_eq!(estimator.on_tick(1_000), None);
        }
        assert_eq!(estimator.current_bpm(), None);
    }

    #[test]
    fn test_rounds_to_nearest() {
        let mut estimator = TempoEstimator::new();
        // 60_000_000 / 480_000 = 125.0, / 485_000 ~= 123.7
        let bpms = feed_beats(&mut estimator, 0, 485_000, 5);
        assert_eq!(bpms, vec![124]);
    }

    #[test]
    fn test_no_report_when_value_unchanged() {
        let mut estimator = TempoEstimator::new();
        let bpms = feed_beats(&mut estimator, 0, 500_000, 12);
        assert_eq!(bpms, vec![120]);
    }

    #[test]
    fn test_stopped_estimator_ignores_ticks() {
        let mut estimator = TempoEstimator::new();
        estimator.stop();
        assert!(!estimator.is_active());
        assert!(feed_beats(&mut estimator, 0, 500_000, 8).is_empty());
    }
}
