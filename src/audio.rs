//! Audio engine — synthesized sound over rodio.
//!
//! Everything is generated; no sound files are loaded, so there is
//! nothing that can fail to load. When no output device is available
//! every method is a silent no-op and the toy keeps working.
//!
//! Three layers share the output:
//! - a fixed pool of note voices for discrete triggers (sequencer beats,
//!   palette clicks, the clear/save runs),
//! - one always-running brush tone whose pitch and loudness are steered
//!   from the UI thread through atomics,
//! - a quiet low drone underneath everything.

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44_100;

/// Reusable note voices. A trigger that finds none idle is dropped.
const NOTE_VOICES: usize = 8;

/// Envelope ramp length in samples (~11 ms), enough to avoid clicks.
const RAMP_SAMPLES: usize = 500;

/// Loudness of the brush tone while drawing.
const BRUSH_AMP: f32 = 0.1;
/// Loudness of the background drone.
const DRONE_AMP: f32 = 0.05;
/// The drone pitch: C two octaves below middle C.
const DRONE_NOTE: u8 = 36;

/// Convert a MIDI note number to frequency.
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// A single enveloped sine note of fixed length.
struct NoteWave {
    freq: f32,
    num_samples: usize,
    pos: usize,
}

impl NoteWave {
    fn new(freq: f32, duration_ms: u32) -> Self {
        let num_samples = (SAMPLE_RATE as u64 * duration_ms as u64 / 1000) as usize;
        Self { freq, num_samples, pos: 0 }
    }
}

impl Iterator for NoteWave {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos >= self.num_samples {
            return None;
        }
        let t = self.pos as f32 / SAMPLE_RATE as f32;
        self.pos += 1;

        // Attack/decay ramps at both ends
        let envelope = if self.pos < RAMP_SAMPLES {
            self.pos as f32 / RAMP_SAMPLES as f32
        } else if self.pos + RAMP_SAMPLES > self.num_samples {
            (self.num_samples - self.pos) as f32 / RAMP_SAMPLES as f32
        } else {
            1.0
        };

        let sample = (t * self.freq * std::f32::consts::TAU).sin() * 0.25 * envelope;
        // Soft limiter to protect speakers
        Some(sample.tanh())
    }
}

impl Source for NoteWave {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(
            self.num_samples as u64 * 1000 / SAMPLE_RATE as u64,
        ))
    }
}

/// Live controls for a continuously running tone. Written from the UI
/// thread, read by rodio's mixer thread; f32 values travel as bits in
/// atomics, so no locking on the audio path.
struct ToneControl {
    freq: AtomicU32,
    target_amp: AtomicU32,
}

impl ToneControl {
    fn new(freq: f32) -> Self {
        Self {
            freq: AtomicU32::new(freq.to_bits()),
            target_amp: AtomicU32::new(0f32.to_bits()),
        }
    }

    fn set_freq(&self, freq: f32) {
        self.freq.store(freq.to_bits(), Ordering::Relaxed);
    }

    fn set_amp(&self, amp: f32) {
        self.target_amp.store(amp.to_bits(), Ordering::Relaxed);
    }

    fn freq(&self) -> f32 {
        f32::from_bits(self.freq.load(Ordering::Relaxed))
    }

    fn amp(&self) -> f32 {
        f32::from_bits(self.target_amp.load(Ordering::Relaxed))
    }
}

/// Per-sample easing coefficient for an exponential approach over
/// roughly `seconds`.
fn ease_coeff(seconds: f32) -> f32 {
    1.0 - (-1.0 / (seconds * SAMPLE_RATE as f32)).exp()
}

/// An endless sine whose pitch and loudness follow a [`ToneControl`].
/// The amplitude eases toward its target so changes fade instead of
/// clicking; the phase accumulator keeps pitch changes continuous.
struct ToneWave {
    control: Arc<ToneControl>,
    phase: f32,
    amp: f32,
    attack: f32,
    release: f32,
}

impl ToneWave {
    fn new(control: Arc<ToneControl>, attack_secs: f32, release_secs: f32) -> Self {
        Self {
            control,
            phase: 0.0,
            amp: 0.0,
            attack: ease_coeff(attack_secs),
            release: ease_coeff(release_secs),
        }
    }
}

impl Iterator for ToneWave {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let target = self.control.amp();
        let coeff = if target > self.amp { self.attack } else { self.release };
        self.amp += (target - self.amp) * coeff;
        self.phase = (self.phase + self.control.freq() / SAMPLE_RATE as f32).fract();
        Some((self.phase * std::f32::consts::TAU).sin() * self.amp)
    }
}

impl Source for ToneWave {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

pub struct AudioEngine {
    _stream: Option<OutputStream>,
    voices: Vec<Sink>,
    brush: Arc<ToneControl>,
    _brush_sink: Option<Sink>,
    _drone_sink: Option<Sink>,
}

impl AudioEngine {
    pub fn new() -> Self {
        let (stream, handle): (Option<OutputStream>, Option<OutputStreamHandle>) =
            OutputStream::try_default().ok().unzip();

        let mut voices = Vec::new();
        if let Some(ref handle) = handle {
            for _ in 0..NOTE_VOICES {
                if let Ok(sink) = Sink::try_new(handle) {
                    voices.push(sink);
                }
            }
        }

        // Brush tone: 50 ms attack, 500 ms release, silent until drawing
        let brush = Arc::new(ToneControl::new(440.0));
        let brush_sink = handle.as_ref().and_then(|h| Sink::try_new(h).ok()).map(|sink| {
            sink.append(ToneWave::new(brush.clone(), 0.05, 0.5));
            sink
        });

        // The drone fades in once at startup and stays put
        let drone_sink = handle.as_ref().and_then(|h| Sink::try_new(h).ok()).map(|sink| {
            let control = Arc::new(ToneControl::new(midi_to_freq(DRONE_NOTE)));
            control.set_amp(DRONE_AMP);
            sink.append(ToneWave::new(control, 2.0, 2.0));
            sink
        });

        Self {
            _stream: stream,
            voices,
            brush,
            _brush_sink: brush_sink,
            _drone_sink: drone_sink,
        }
    }

    fn idle_voice(&self) -> Option<&Sink> {
        self.voices.iter().find(|v| v.empty())
    }

    /// Trigger one note on an idle pooled voice. Dropped silently when
    /// the pool is saturated or audio is unavailable.
    pub fn play_note(&self, pitch: u8, duration_ms: u32, volume: f32) {
        if let Some(voice) = self.idle_voice() {
            voice.set_volume(volume);
            voice.append(NoteWave::new(midi_to_freq(pitch), duration_ms));
        }
    }

    /// Queue a short run of notes back to back on one voice.
    pub fn play_run(&self, pitches: &[u8], note_ms: u32, volume: f32) {
        if let Some(voice) = self.idle_voice() {
            voice.set_volume(volume);
            for &pitch in pitches {
                voice.append(NoteWave::new(midi_to_freq(pitch), note_ms));
            }
        }
    }

    pub fn set_brush_pitch(&self, freq: f32) {
        self.brush.set_freq(freq);
    }

    pub fn brush_on(&self) {
        self.brush.set_amp(BRUSH_AMP);
    }

    pub fn brush_off(&self) {
        self.brush.set_amp(0.0);
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_to_freq() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_freq(60) - 261.626).abs() < 1e-2);
        assert!((midi_to_freq(81) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn test_note_wave_length_and_bounds() {
        let wave = NoteWave::new(440.0, 100);
        let samples: Vec<f32> = wave.collect();
        assert_eq!(samples.len(), 4410);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_note_wave_envelope_ramps() {
        let samples: Vec<f32> = NoteWave::new(440.0, 100).collect();
        // first and last samples are inside the ramps, so near-silent
        assert!(samples[0].abs() < 0.01);
        assert!(samples[samples.len() - 1].abs() < 0.01);
        // somewhere mid-note the tone is audible
        assert!(samples.iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn test_tone_wave_fades_toward_target() {
        let control = Arc::new(ToneControl::new(440.0));
        let mut wave = ToneWave::new(control.clone(), 0.05, 0.5);

        // silent while the target is zero
        for _ in 0..1000 {
            assert_eq!(wave.next(), Some(0.0));
        }

        control.set_amp(0.1);
        let after_attack: Vec<f32> = (&mut wave).take(SAMPLE_RATE as usize / 2).collect();
        let peak = after_attack.iter().fold(0.0f32, |a, &s| a.max(s.abs()));
        assert!(peak > 0.05 && peak <= 0.1 + 1e-3);

        // fades back out after release
        control.set_amp(0.0);
        let tail: Vec<f32> = (&mut wave).take(SAMPLE_RATE as usize * 4).collect();
        let tail_peak = tail[tail.len() - 100..]
            .iter()
            .fold(0.0f32, |a, &s| a.max(s.abs()));
        assert!(tail_peak < 0.01);
    }

    #[test]
    fn test_tone_control_roundtrip() {
        let control = ToneControl::new(440.0);
        control.set_freq(523.25);
        control.set_amp(0.1);
        assert_eq!(control.freq(), 523.25);
        assert_eq!(control.amp(), 0.1);
    }
}
