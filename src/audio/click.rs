//! Metronome click synthesis and audio output via cpal.

use std::sync::Arc;
use std::sync::mpsc::{self, Sender};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::warn;

/// Plays the metronome click through the default output device.
///
/// Opening the device can fail for any number of reasons (headless host, no
/// backend, exotic sample format); none of them are fatal to playback. The
/// click degrades to a silent no-op and the reason is logged exactly once.
pub struct MetronomeAudio {
    inner: Option<ClickOutput>,
}

struct ClickOutput {
    _stream: cpal::Stream,
    trigger: Sender<bool>,
}

struct Voice {
    samples: Arc<Vec<f32>>,
    position: usize,
}

impl MetronomeAudio {
    /// A permanently silent click (metronome disabled in settings).
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Open the default output device, degrading to a no-op on failure.
    pub fn open(volume: f32) -> Self {
        match Self::try_open(volume.clamp(0.0, 1.0)) {
            Ok(output) => Self {
                inner: Some(output),
            },
            Err(reason) => {
                warn!("metronome click disabled: {reason}");
                Self { inner: None }
            }
        }
    }

    /// `true` when a real output stream is running.
    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    /// Schedule one click; accented clicks are higher-pitched.
    pub fn click(&self, accent: bool) {
        if let Some(output) = &self.inner {
            let _ = output.trigger.send(accent);
        }
    }

    fn try_open(volume: f32) -> Result<ClickOutput, String> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| "no default output device".to_owned())?;
        let supported = device
            .default_output_config()
            .map_err(|e| format!("no default output config: {e}"))?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(format!(
                "unsupported sample format {:?}",
                supported.sample_format()
            ));
        }
        let config: cpal::StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;

        let beat = Arc::new(synth_click(sample_rate, 800.0, 0.02, volume));
        let accent = Arc::new(synth_click(sample_rate, 1200.0, 0.03, volume));

        let (trigger, pending) = mpsc::channel::<bool>();
        let mut voices: Vec<Voice> = Vec::new();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    while let Ok(is_accent) = pending.try_recv() {
                        voices.push(Voice {
                            samples: if is_accent { accent.clone() } else { beat.clone() },
                            position: 0,
                        });
                    }
                    for frame in data.chunks_mut(channels) {
                        let mut sum = 0.0f32;
                        for voice in voices.iter_mut() {
                            if let Some(&s) = voice.samples.get(voice.position) {
                                sum += s;
                                voice.position += 1;
                            }
                        }
                        voices.retain(|v| v.position < v.samples.len());
                        let sample = sum.clamp(-1.0, 1.0);
                        for channel in frame.iter_mut() {
                            *channel = sample;
                        }
                    }
                },
                |e| warn!("metronome output stream error: {e}"),
                None,
            )
            .map_err(|e| format!("failed to build output stream: {e}"))?;
        stream.play().map_err(|e| format!("failed to start output stream: {e}"))?;

        Ok(ClickOutput {
            _stream: stream,
            trigger,
        })
    }
}

/// A short sine burst with an exponential decay envelope.
fn synth_click(sample_rate: u32, freq: f32, duration: f32, volume: f32) -> Vec<f32> {
    let count = (sample_rate as f32 * duration) as usize;
    (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            volume * (-t * 100.0).exp() * (std::f32::consts::TAU * freq * t).sin()
        })
        .collect()
}
