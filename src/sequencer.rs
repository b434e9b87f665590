//! Beat sequencer — the generative music loop.
//!
//! A periodic tick plays notes from a fixed ascending scale. How many
//! notes fire per tick, how loud, and how fast the ticks come all follow
//! the canvas fill percentage. The sequencer owns its own deadline and is
//! polled from the UI loop rather than running on a timer thread, so its
//! state is only ever touched between frames.

use std::time::{Duration, Instant};

/// One ascending C major octave, as MIDI note numbers.
pub const SCALE: [u8; 8] = [60, 62, 64, 65, 67, 69, 71, 72];

/// Beats per cycle; the beat index wraps at this.
pub const BEATS: usize = 8;

pub const MIN_BPM: f32 = 80.0;
pub const MAX_BPM: f32 = 140.0;

/// Notes per tick for a given fill fraction: 1 on an empty canvas, up to
/// 4 when it is full.
pub fn notes_for_fill(p: f32) -> usize {
    ((p * 4.0).floor() as usize).max(1)
}

/// Linear fill→tempo map: empty canvas 80 BPM, full canvas 140 BPM.
pub fn tempo_for_fill(p: f32) -> f32 {
    MIN_BPM + p * (MAX_BPM - MIN_BPM)
}

/// What one tick decided to play.
pub struct Tick {
    pub notes: Vec<u8>,
    pub volume: f32,
    /// New tempo, when this tick crossed a fill decile upward.
    pub retuned: Option<f32>,
}

pub struct Sequencer {
    beat: usize,
    bpm: f32,
    /// Fill value observed at the most recent retune. Tempo only moves
    /// when the fill crosses a new 10% threshold above this.
    last_fill: f32,
    next_tick: Instant,
}

impl Sequencer {
    pub fn new(now: Instant) -> Self {
        let mut seq = Self {
            beat: 0,
            bpm: MIN_BPM,
            last_fill: 0.0,
            next_tick: now,
        };
        seq.next_tick = now + seq.period();
        seq
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn beat(&self) -> usize {
        self.beat
    }

    /// Tick period at the current tempo (60000/bpm ms).
    pub fn period(&self) -> Duration {
        Duration::from_secs_f32(60.0 / self.bpm)
    }

    /// Time left until the pending tick.
    pub fn until_next_tick(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }

    /// Poll the timer. Fires at most one tick per call; a late poll
    /// schedules the following tick from now rather than bursting to
    /// catch up.
    pub fn poll(&mut self, now: Instant, fill: f32) -> Option<Tick> {
        if now < self.next_tick {
            return None;
        }
        let tick = self.advance(fill);
        // Retuning happened inside advance, so the pending deadline is
        // swapped in the same step: a tempo change can neither
        // double-fire nor skip a beat.
        self.next_tick = now + self.period();
        Some(tick)
    }

    fn advance(&mut self, fill: f32) -> Tick {
        let count = notes_for_fill(fill);
        let notes = (0..count)
            .map(|i| SCALE[(self.beat + 2 * i) % SCALE.len()])
            .collect();
        let volume = 0.12 + 0.18 * fill;
        self.beat = (self.beat + 1) % BEATS;

        let retuned = if (fill * 10.0).floor() > (self.last_fill * 10.0).floor() {
            self.bpm = tempo_for_fill(fill);
            self.last_fill = fill;
            Some(self.bpm)
        } else {
            None
        };

        Tick { notes, volume, retuned }
    }

    /// Canvas cleared: tempo back to the floor, retune threshold
    /// rearmed, timer restarted. The beat index keeps running.
    pub fn reset(&mut self, now: Instant) {
        self.bpm = MIN_BPM;
        self.last_fill = 0.0;
        self.next_tick = now + self.period();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_notes_for_fill() {
        assert_eq!(notes_for_fill(0.0), 1);
        assert_eq!(notes_for_fill(0.2), 1);
        assert_eq!(notes_for_fill(0.5), 2);
        assert_eq!(notes_for_fill(0.75), 3);
        assert_eq!(notes_for_fill(1.0), 4);
    }

    #[test]
    fn test_tempo_for_fill() {
        assert_eq!(tempo_for_fill(0.0), 80.0);
        assert_eq!(tempo_for_fill(1.0), 140.0);
        assert_eq!(tempo_for_fill(0.5), 110.0);
    }

    #[test]
    fn test_initial_state() {
        let seq = Sequencer::new(Instant::now());
        assert_eq!(seq.bpm(), 80.0);
        assert_eq!(seq.beat(), 0);
        assert!((seq.period().as_secs_f32() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_poll_before_deadline_is_none() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        assert!(seq.poll(start, 0.0).is_none());
        assert!(seq.poll(start + ms(100), 0.0).is_none());
    }

    #[test]
    fn test_tick_fires_once_per_period() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        let at = start + seq.period();
        assert!(seq.poll(at, 0.0).is_some());
        // immediately after firing, the next deadline is a full period away
        assert!(seq.poll(at, 0.0).is_none());
        assert!((seq.until_next_tick(at).as_secs_f32() - 0.75).abs() < 1e-3);
    }

    #[test]
    fn test_note_selection_pattern() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        // beat 0, full canvas: indices 0, 2, 4, 6 of the scale
        let tick = seq.poll(start + seq.period(), 1.0).unwrap();
        assert_eq!(tick.notes, vec![60, 64, 67, 71]);
        assert_eq!(seq.beat(), 1);
    }

    #[test]
    fn test_beat_wraps() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        let mut now = start;
        for _ in 0..9 {
            now += seq.period() + ms(1);
            assert!(seq.poll(now, 0.0).is_some());
        }
        assert_eq!(seq.beat(), 1);
    }

    #[test]
    fn test_decile_crossing_retunes_once() {
        // fill jumped from 0 to exactly 0.3 between ticks: one retune,
        // straight to 80 + 0.3*60 = 98 BPM
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        let tick = seq.poll(start + seq.period(), 0.3).unwrap();
        assert_eq!(tick.retuned, Some(98.0));
        assert_eq!(seq.bpm(), 98.0);
        assert!((seq.period().as_secs_f32() - 60.0 / 98.0).abs() < 1e-5);

        // same fill on the next tick: no further retune
        let at = start + seq.period() * 3;
        let tick = seq.poll(at, 0.3).unwrap();
        assert_eq!(tick.retuned, None);
        assert_eq!(seq.bpm(), 98.0);
    }

    #[test]
    fn test_no_retune_within_same_decile() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        let tick = seq.poll(start + seq.period(), 0.05).unwrap();
        assert_eq!(tick.retuned, None);
        assert_eq!(seq.bpm(), 80.0);
    }

    #[test]
    fn test_tempo_non_decreasing() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        let mut now = start;
        let mut last_bpm = seq.bpm();
        for fill in [0.05, 0.15, 0.15, 0.4, 0.4, 0.72, 0.95, 1.0] {
            now += seq.period() + ms(1);
            seq.poll(now, fill).unwrap();
            assert!(seq.bpm() >= last_bpm);
            assert!((MIN_BPM..=MAX_BPM).contains(&seq.bpm()));
            last_bpm = seq.bpm();
        }
        assert_eq!(last_bpm, 140.0);
    }

    #[test]
    fn test_retune_swaps_deadline() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        let at = start + seq.period();
        seq.poll(at, 0.5).unwrap();
        // new period scheduled from the firing instant at the new tempo
        let expected = 60.0 / 110.0;
        assert!((seq.until_next_tick(at).as_secs_f32() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_late_poll_does_not_burst() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        // window slept through ten periods
        let late = start + seq.period() * 10;
        assert!(seq.poll(late, 0.0).is_some());
        assert!(seq.poll(late, 0.0).is_none());
        assert!((seq.until_next_tick(late).as_secs_f32() - 0.75).abs() < 1e-3);
    }

    #[test]
    fn test_reset_restores_floor_tempo() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        let mut now = start + seq.period();
        seq.poll(now, 0.8).unwrap();
        assert_eq!(seq.bpm(), 128.0);
        let beat_before = seq.beat();

        now += ms(10);
        seq.reset(now);
        assert_eq!(seq.bpm(), 80.0);
        assert_eq!(seq.beat(), beat_before);
        assert!((seq.until_next_tick(now).as_secs_f32() - 0.75).abs() < 1e-3);

        // retune threshold rearmed: crossing 0.1 again fires again
        now += seq.period() + ms(1);
        let tick = seq.poll(now, 0.1).unwrap();
        assert_eq!(tick.retuned, Some(86.0));
    }

    #[test]
    fn test_volume_scales_with_fill() {
        let start = Instant::now();
        let mut seq = Sequencer::new(start);
        let quiet = seq.poll(start + seq.period(), 0.0).unwrap();
        let mut now = start + seq.period() * 2;
        now += ms(1);
        let loud = seq.poll(now, 1.0).unwrap();
        assert!(loud.volume > quiet.volume);
        assert!(loud.volume <= 0.3 + 1e-6);
    }
}
