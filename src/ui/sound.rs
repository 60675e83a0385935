/// Sound engine: procedural terminal beeps via rodio.
///
/// All effects are synthesized into in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use std::f32::consts::TAU;

const SAMPLE_RATE: u32 = 22050;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::debug;

    use super::{encode_wav, synth_buzz, synth_fail, synth_key, synth_success, synth_tone};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_key: Arc<Vec<u8>>,
        sfx_help: Arc<Vec<u8>>,
        sfx_error: Arc<Vec<u8>>,
        sfx_alarm: Arc<Vec<u8>>,
        sfx_success: Arc<Vec<u8>>,
        sfx_fail: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// None when no audio device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    debug!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_key: Arc::new(encode_wav(&synth_key())),
                sfx_help: Arc::new(encode_wav(&synth_tone(&[880.0, 1320.0], 0.06, 0.2))),
                sfx_error: Arc::new(encode_wav(&synth_buzz())),
                sfx_alarm: Arc::new(encode_wav(&synth_tone(&[1200.0], 0.05, 0.2))),
                sfx_success: Arc::new(encode_wav(&synth_success())),
                sfx_fail: Arc::new(encode_wav(&synth_fail())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_key(&self) { self.play(&self.sfx_key); }
        pub fn play_help(&self) { self.play(&self.sfx_help); }
        pub fn play_error(&self) { self.play(&self.sfx_error); }
        pub fn play_alarm(&self) { self.play(&self.sfx_alarm); }
        pub fn play_success(&self) { self.play(&self.sfx_success); }
        pub fn play_fail(&self) { self.play(&self.sfx_fail); }
    }
}

// ════════════════════════════════════════════════════════════
//  Synthesis — mono f32 samples in [-1, 1]
// ════════════════════════════════════════════════════════════

fn sample_count(seconds: f32) -> usize {
    (SAMPLE_RATE as f32 * seconds) as usize
}

/// Sequence of sine notes, each with a linear fade.
fn synth_tone(notes: &[f32], note_secs: f32, volume: f32) -> Vec<f32> {
    let n = sample_count(note_secs);
    let mut out = Vec::with_capacity(n * notes.len());
    for &freq in notes {
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - i as f32 / n as f32;
            out.push((t * freq * TAU).sin() * env * volume);
        }
    }
    out
}

/// Keyboard click: very short square-ish tick.
fn synth_key() -> Vec<f32> {
    let n = sample_count(0.012);
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = (1.0 - i as f32 / n as f32).powi(2);
            (t * 2400.0 * TAU).sin().signum() * env * 0.08
        })
        .collect()
}

/// Wrong code / unknown command: low double buzz.
fn synth_buzz() -> Vec<f32> {
    let n = sample_count(0.11);
    let gap = sample_count(0.04);
    let mut out = Vec::with_capacity(n * 2 + gap);
    for pass in 0..2 {
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let square = (t * 140.0 * TAU).sin().signum();
            out.push(square * 0.18);
        }
        if pass == 0 {
            out.extend(std::iter::repeat(0.0).take(gap));
        }
    }
    out
}

/// Access granted: rising arpeggio with a held top note.
fn synth_success() -> Vec<f32> {
    let mut out = synth_tone(&[523.0, 659.0, 784.0], 0.09, 0.3);
    out.extend(synth_tone(&[1047.0], 0.35, 0.3));
    out
}

/// System locked: slow descending slide.
fn synth_fail() -> Vec<f32> {
    let n = sample_count(0.9);
    let mut phase = 0.0_f32;
    (0..n)
        .map(|i| {
            let p = i as f32 / n as f32;
            let freq = 392.0 - p * 250.0;
            phase += freq * TAU / SAMPLE_RATE as f32;
            let wobble = 1.0 + 0.15 * (p * 30.0).sin();
            phase.sin() * wobble * (1.0 - p) * 0.3
        })
        .collect()
}

// ════════════════════════════════════════════════════════════
//  WAV encoder — 16-bit PCM mono
// ════════════════════════════════════════════════════════════

fn encode_wav(samples: &[f32]) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS: u16 = 16;
    let block_align = CHANNELS * BITS / 8;
    let byte_rate = SAMPLE_RATE * u32::from(block_align);
    let data_len = (samples.len() * usize::from(block_align)) as u32;

    let mut buf = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVEfmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
#[allow(dead_code)]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_key(&self) {}
    pub fn play_help(&self) {}
    pub fn play_error(&self) {}
    pub fn play_alarm(&self) {}
    pub fn play_success(&self) {}
    pub fn play_fail(&self) {}
}
