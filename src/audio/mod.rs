//! Audio speed adjustment and loudness post-processing.
//!
//! The synthesized narration is time-stretched by a fixed factor. The
//! primary path keeps pitch via ffmpeg's `atempo` filter; if that fails, a
//! naive fix-length resample (duration-correct, pitch-incorrect) is the
//! fallback. Either way the result is peak-normalized, boosted, and
//! hard-clipped to [-1, 1] before re-encoding as WAV.

use crate::config::AudioSettings;
use crate::error::{RasiError, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Speed adjuster for synthesized speech.
pub struct SpeedAdjuster {
    speed_factor: f64,
    volume_gain: f32,
}

impl SpeedAdjuster {
    pub fn new(settings: &AudioSettings) -> Self {
        Self {
            speed_factor: settings.speed_factor,
            volume_gain: settings.volume_gain,
        }
    }

    /// Time-stretch `input` into `output` and post-process loudness.
    ///
    /// Returns the output duration in seconds.
    #[instrument(skip(self), fields(input = %input.display()))]
    pub async fn adjust(&self, input: &Path, output: &Path) -> Result<f64> {
        info!("Adjusting audio speed by {}x", self.speed_factor);

        let (samples, spec) = match self.stretch_with_ffmpeg(input).await {
            Ok(stretched) => stretched,
            Err(e) => {
                warn!("Pitch-preserving stretch failed ({}), using fix-length resample", e);
                let (samples, spec) = read_wav_f32(input)?;
                let new_len = (samples.len() as f64 / self.speed_factor) as usize;
                (fix_length(samples, new_len), spec)
            }
        };

        let mut samples = samples;
        normalize_boost_clip(&mut samples, self.volume_gain);
        debug!("Volume boosted by {}x factor and clipped", self.volume_gain);

        write_wav_f32(output, &samples, spec)?;

        let duration = samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);
        info!("Stretched audio duration: {:.2}s", duration);
        Ok(duration)
    }

    /// Primary stretch path: ffmpeg `atempo` (pitch-preserving).
    async fn stretch_with_ffmpeg(&self, input: &Path) -> Result<(Vec<f32>, hound::WavSpec)> {
        let stretched = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .map_err(RasiError::Io)?;

        let result = Command::new("ffmpeg")
            .arg("-i").arg(input)
            .arg("-filter:a").arg(atempo_filter(self.speed_factor))
            .arg("-acodec").arg("pcm_s16le")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(stretched.path())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => read_wav_f32(stretched.path()),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(RasiError::Audio(format!("atempo failed: {}", err)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RasiError::ToolNotFound("ffmpeg".into()))
            }
            Err(e) => Err(RasiError::Audio(format!("ffmpeg error: {}", e))),
        }
    }
}

/// Build an `atempo` filter chain for an arbitrary factor.
///
/// A single atempo stage only accepts 0.5..=2.0, so factors outside that
/// range are decomposed into stages.
fn atempo_filter(factor: f64) -> String {
    let mut stages: Vec<String> = Vec::new();
    let mut remaining = factor;

    while remaining > 2.0 {
        stages.push("atempo=2.0".to_string());
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        stages.push("atempo=0.5".to_string());
        remaining /= 0.5;
    }
    stages.push(format!("atempo={}", remaining));
    stages.join(",")
}

/// Truncate or zero-pad to exactly `new_len` samples.
fn fix_length(mut samples: Vec<f32>, new_len: usize) -> Vec<f32> {
    if samples.len() > new_len {
        samples.truncate(new_len);
    } else {
        samples.resize(new_len, 0.0);
    }
    samples
}

/// Peak-normalize, multiply by `gain`, hard-clip to [-1, 1].
///
/// The clip step caps over-gain rather than wrapping or erroring.
fn normalize_boost_clip(samples: &mut [f32], gain: f32) {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        let scale = gain / peak;
        for s in samples.iter_mut() {
            *s = (*s * scale).clamp(-1.0, 1.0);
        }
    }
}

/// Read a WAV file into normalized f32 samples (interleaved).
pub fn read_wav_f32(path: &Path) -> Result<(Vec<f32>, hound::WavSpec)> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    Ok((samples, spec))
}

/// Write f32 samples as a 16-bit PCM WAV file.
pub fn write_wav_f32(path: &Path, samples: &[f32], spec: hound::WavSpec) -> Result<()> {
    let out_spec = hound::WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, out_spec)?;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Duration in seconds of a WAV file.
pub fn wav_duration_seconds(path: &Path) -> Result<f64> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let frames = reader.len() as f64 / spec.channels as f64;
    Ok(frames / spec.sample_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_spec(sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_fix_length_truncates() {
        let samples = vec![0.5f32; 1000];
        let out = fix_length(samples, 400);
        assert_eq!(out.len(), 400);
    }

    #[test]
    fn test_fix_length_pads_with_silence() {
        let samples = vec![0.5f32; 100];
        let out = fix_length(samples, 150);
        assert_eq!(out.len(), 150);
        assert_eq!(out[149], 0.0);
    }

    #[test]
    fn test_fallback_duration_ratio() {
        // 22s of audio at 1.5x should come out at ~14.67s.
        let sr = 22_050u32;
        let samples = vec![0.1f32; (22.0 * sr as f64) as usize];
        let new_len = (samples.len() as f64 / 1.5) as usize;
        let out = fix_length(samples, new_len);
        let duration = out.len() as f64 / sr as f64;
        assert!((duration - 22.0 / 1.5).abs() < 0.01, "duration: {}", duration);
    }

    #[test]
    fn test_normalize_boost_clip_caps_at_one() {
        let mut samples = vec![0.1, -0.4, 0.25];
        normalize_boost_clip(&mut samples, 2.0);
        for s in &samples {
            assert!(s.abs() <= 1.0);
        }
        // Peak was 0.4; gain 2.0 drives it to the clip ceiling.
        assert_eq!(samples[1], -1.0);
    }

    #[test]
    fn test_normalize_silence_is_noop() {
        let mut samples = vec![0.0f32; 10];
        normalize_boost_clip(&mut samples, 2.0);
        assert!(samples.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_atempo_filter_in_range() {
        assert_eq!(atempo_filter(1.5), "atempo=1.5");
    }

    #[test]
    fn test_atempo_filter_chains_large_factors() {
        let chain = atempo_filter(3.0);
        assert!(chain.starts_with("atempo=2.0,"));
        assert_eq!(chain.matches("atempo=").count(), 2);
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let spec = mono_spec(8000);
        let samples: Vec<f32> = (0..8000)
            .map(|i| (i as f32 * 0.01).sin() * 0.5)
            .collect();
        write_wav_f32(&path, &samples, spec).unwrap();

        let (read_back, read_spec) = read_wav_f32(&path).unwrap();
        assert_eq!(read_back.len(), samples.len());
        assert_eq!(read_spec.sample_rate, 8000);
        assert!((read_back[100] - samples[100]).abs() < 0.001);

        let duration = wav_duration_seconds(&path).unwrap();
        assert!((duration - 1.0).abs() < 0.001);
    }
}
