//! Sound effects synthesized at startup and the sinks that play them.
//!
//! All three effects are closed-form waveforms rendered once into 16-bit
//! stereo buffers; nothing is loaded from disk.

use std::f64::consts::TAU;

use log::{info, warn};
use rand::Rng;
use rodio::{OutputStream, OutputStreamHandle, Sink, buffer::SamplesBuffer};

use crate::constants::*;

/// The gameplay moments that make a sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Ship thrusting this tick.
    Move,
    /// Ship fired a bullet pair.
    Shoot,
    /// A bullet struck an asteroid.
    Hit,
}

/// Interleaved-ready 16-bit stereo PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    pub sample_rate: u32,
    pub frames: Vec<[i16; 2]>,
}

impl Waveform {
    fn from_mono(sample_rate: u32, mono: impl Iterator<Item = f64>) -> Self {
        let frames = mono
            .map(|sample| {
                // Truncates toward zero like a plain integer cast of the scaled sample.
                let pcm = (sample * i16::MAX as f64) as i16;
                [pcm, pcm]
            })
            .collect();
        Waveform { sample_rate, frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn interleaved(&self) -> Vec<i16> {
        self.frames.iter().flat_map(|frame| *frame).collect()
    }
}

fn sample_count(sample_rate: u32, duration: f64) -> usize {
    (sample_rate as f64 * duration) as usize
}

/// Sine carrier at `frequency`, amplitude-modulated by a slower sine at `modulation`.
pub fn synthesize_tone(frequency: f64, duration: f64, sample_rate: u32, modulation: f64) -> Waveform {
    let n = sample_count(sample_rate, duration);
    let samples = (0..n).map(|i| {
        let t = i as f64 * duration / n as f64;
        let carrier = 0.5 * (TAU * frequency * t).sin();
        let modulator = 0.5 * (1.0 + (TAU * modulation * t).sin());
        carrier * modulator
    });
    Waveform::from_mono(sample_rate, samples)
}

/// Uniform white noise under a linear fade from full `depth` to silence.
pub fn synthesize_white_noise(duration: f64, sample_rate: u32, depth: f64, rng: &mut impl Rng) -> Waveform {
    let n = sample_count(sample_rate, duration);
    let last = n.saturating_sub(1).max(1) as f64;
    let samples: Vec<f64> = (0..n)
        .map(|i| {
            let envelope = 1.0 - i as f64 / last;
            rng.gen_range(-1.0..1.0) * envelope * depth
        })
        .collect();
    Waveform::from_mono(sample_rate, samples.into_iter())
}

/// The three effects the game uses, rendered once.
#[derive(Clone, Debug)]
pub struct SoundBank {
    pub movement: Waveform,
    pub shoot: Waveform,
    pub hit: Waveform,
}

impl SoundBank {
    pub fn synthesize(rng: &mut impl Rng) -> Self {
        SoundBank {
            movement: synthesize_tone(MOVE_TONE_HZ, TONE_DURATION, SAMPLE_RATE, DEFAULT_MODULATION_HZ),
            shoot: synthesize_tone(SHOOT_TONE_HZ, TONE_DURATION, SAMPLE_RATE, DEFAULT_MODULATION_HZ),
            hit: synthesize_white_noise(HIT_NOISE_DURATION, SAMPLE_RATE, HIT_NOISE_DEPTH, rng),
        }
    }

    pub fn waveform(&self, cue: SoundCue) -> &Waveform {
        match cue {
            SoundCue::Move => &self.movement,
            SoundCue::Shoot => &self.shoot,
            SoundCue::Hit => &self.hit,
        }
    }
}

/// Fire-and-forget playback. Overlapping cues are allowed.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);

    /// True when cues are discarded rather than played.
    fn is_silent(&self) -> bool {
        false
    }
}

/// Discards every cue; used when muted or when no output device exists.
#[derive(Debug, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, _cue: SoundCue) {}

    fn is_silent(&self) -> bool {
        true
    }
}

pub struct RodioSink {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    bank: SoundBank,
}

impl RodioSink {
    pub fn new(bank: SoundBank) -> Result<Self, rodio::StreamError> {
        let (stream, handle) = OutputStream::try_default()?;
        info!("Audio output stream opened.");
        Ok(RodioSink { _stream: stream, handle, bank })
    }
}

impl AudioSink for RodioSink {
    fn play(&mut self, cue: SoundCue) {
        let waveform = self.bank.waveform(cue);
        match Sink::try_new(&self.handle) {
            Ok(sink) => {
                sink.append(SamplesBuffer::new(2, waveform.sample_rate, waveform.interleaved()));
                sink.detach();
            }
            Err(e) => warn!("Failed to play {:?}: {}", cue, e),
        }
    }
}

/// Opens the default device unless muted, falling back to silence.
pub fn open_sink(bank: SoundBank, mute: bool) -> Box<dyn AudioSink> {
    if mute {
        info!("Audio muted.");
        return Box::new(SilentSink);
    }
    match RodioSink::new(bank) {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            warn!("No audio output available, continuing silently: {}", e);
            Box::new(SilentSink)
        }
    }
}

impl<T: AudioSink + ?Sized> AudioSink for Box<T> {
    fn play(&mut self, cue: SoundCue) {
        (**self).play(cue);
    }

    fn is_silent(&self) -> bool {
        (**self).is_silent()
    }
}
