/// Sound engine: procedural blips via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_step: Arc<Vec<u8>>,
        sfx_push: Arc<Vec<u8>>,
        sfx_target: Arc<Vec<u8>>,
        sfx_undo: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_all_complete: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_step: Arc::new(make_wav(&gen_step())),
                sfx_push: Arc::new(make_wav(&gen_push())),
                sfx_target: Arc::new(make_wav(&gen_target())),
                sfx_undo: Arc::new(make_wav(&gen_undo())),
                sfx_clear: Arc::new(make_wav(&gen_clear())),
                sfx_all_complete: Arc::new(make_wav(&gen_all_complete())),
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

        pub fn play_step(&self) { self.play(&self.sfx_step); }
        pub fn play_push(&self) { self.play(&self.sfx_push); }
        pub fn play_target(&self) { self.play(&self.sfx_target); }
        pub fn play_undo(&self) { self.play(&self.sfx_undo); }
        pub fn play_clear(&self) { self.play(&self.sfx_clear); }
        pub fn play_all_complete(&self) { self.play(&self.sfx_all_complete); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn sample_count(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Sine sweep from `f0` to `f1` with a linear fade out.
    fn sweep(f0: f32, f1: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = f0 + (f1 - f0) * t;
                phase += freq / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t) * volume
            })
            .collect()
    }

    /// Notes played back to back, sine plus a touch of octave for brightness.
    fn arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(note_dur);
        let mut samples = Vec::with_capacity(n * notes.len());
        for &freq in notes {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 2.0 * TAU).sin() * 0.25;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Held note that decays to silence.
    fn sustain(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(duration);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powf(1.5);
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Step: very short soft tick.
    fn gen_step() -> Vec<f32> {
        sweep(420.0, 360.0, 0.025, 0.12)
    }

    /// Push: low scrape, tone plus noise, falling.
    fn gen_push() -> Vec<f32> {
        let n = sample_count(0.09);
        let mut rng: u32 = 0x2545_F491;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 160.0 - t * 60.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * TAU).sin();
                rng = rng.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let noise = (rng >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                (tone * 0.6 + noise * 0.4) * (1.0 - t) * 0.28
            })
            .collect()
    }

    /// Box on target: bright rising triad G5 B5 D6.
    fn gen_target() -> Vec<f32> {
        arpeggio(&[784.0, 988.0, 1175.0], 0.05, 0.25)
    }

    /// Undo: quick upward whoosh.
    fn gen_undo() -> Vec<f32> {
        sweep(300.0, 520.0, 0.07, 0.18)
    }

    /// Level complete: C5 E5 G5 C6 with the top note held.
    fn gen_clear() -> Vec<f32> {
        let mut samples = arpeggio(&[523.0, 659.0, 784.0, 1047.0], 0.09, 0.3);
        samples.extend(sustain(1047.0, 0.25, 0.3));
        samples
    }

    /// Whole journey complete: longer fanfare ending on a low-high pair.
    fn gen_all_complete() -> Vec<f32> {
        let mut samples = arpeggio(&[523.0, 659.0, 784.0, 659.0, 784.0, 1047.0], 0.11, 0.3);
        samples.extend(arpeggio(&[1319.0], 0.15, 0.3));
        samples.extend(sustain(1568.0, 0.45, 0.3));
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit PCM buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_and_length() {
            let wav = make_wav(&[0.0, 1.0, -1.0, 2.0]);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + 8);
            // clamped full scale
            assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
            assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), 32767);
        }

        #[test]
        fn generated_effects_stay_in_range() {
            for samples in [gen_step(), gen_push(), gen_target(), gen_undo(), gen_clear(), gen_all_complete()] {
                assert!(!samples.is_empty());
                assert!(samples.iter().all(|s| s.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_step(&self) {}
    pub fn play_push(&self) {}
    pub fn play_target(&self) {}
    pub fn play_undo(&self) {}
    pub fn play_clear(&self) {}
    pub fn play_all_complete(&self) {}
}
