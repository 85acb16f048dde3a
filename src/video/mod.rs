//! Video composition.
//!
//! Loops the template clip enough times to cover the narration, attaches the
//! audio track, trims to exactly the audio duration, and re-encodes. All
//! intermediates live in a scoped temp directory so they are removed on
//! every exit path.

use crate::error::{RasiError, Result};
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Outcome of a composition run.
#[derive(Debug)]
pub struct ComposeReport {
    /// Template clip duration in seconds.
    pub template_duration: f64,
    /// Narration duration in seconds (also the final video duration).
    pub audio_duration: f64,
    /// How many copies of the template were concatenated.
    pub repeat_count: u32,
}

/// Number of template repetitions needed to cover the audio.
pub fn repeat_count(audio_duration: f64, video_duration: f64) -> Result<u32> {
    if video_duration <= 0.0 {
        return Err(RasiError::Video(
            "template clip has zero duration".to_string(),
        ));
    }
    Ok((audio_duration / video_duration).ceil().max(1.0) as u32)
}

/// Compose the final video from the template clip and the narration WAV.
#[instrument(skip_all, fields(template = %template.display(), output = %output.display()))]
pub async fn compose(template: &Path, audio: &Path, output: &Path) -> Result<ComposeReport> {
    if !template.exists() {
        return Err(RasiError::Video(format!(
            "template video not found: {}",
            template.display()
        )));
    }

    let template_duration = probe_duration(template).await?;
    let audio_duration = probe_duration(audio).await?;
    info!(
        "Template duration: {:.2}s, audio duration: {:.2}s",
        template_duration, audio_duration
    );

    let repeats = repeat_count(audio_duration, template_duration)?;
    info!("Number of template repeats needed: {}", repeats);

    // Scoped temp dir: the concat list is removed even on failure.
    let temp_dir = tempfile::tempdir()?;
    let concat_list = temp_dir.path().join("files.txt");
    {
        let template_abs = std::fs::canonicalize(template)?;
        let mut f = std::fs::File::create(&concat_list)?;
        for _ in 0..repeats {
            writeln!(f, "file '{}'", template_abs.display())?;
        }
    }
    debug!("Created concat list with {} entries", repeats);

    // Concatenate, attach the narration, and trim to exactly the audio
    // duration in one encode pass (may cut mid-loop).
    let result = Command::new("ffmpeg")
        .arg("-f").arg("concat")
        .arg("-safe").arg("0")
        .arg("-i").arg(&concat_list)
        .arg("-i").arg(audio)
        .arg("-map").arg("0:v:0")
        .arg("-map").arg("1:a:0")
        .arg("-c:v").arg("libx264")
        .arg("-c:a").arg("aac")
        .arg("-t").arg(format!("{:.3}", audio_duration))
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => {}
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            return Err(RasiError::Video(format!("ffmpeg mux failed: {}", err)));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RasiError::ToolNotFound("ffmpeg".into()));
        }
        Err(e) => return Err(RasiError::Video(format!("ffmpeg error: {}", e))),
    }

    info!("Final video duration: {:.2}s", audio_duration);
    Ok(ComposeReport {
        template_duration,
        audio_duration,
        repeat_count: repeats,
    })
}

/// Queries the duration of a media file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RasiError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(RasiError::Video(format!("ffprobe failed: {}", e)));
        }
    };

    if !output.status.success() {
        return Err(RasiError::Video("ffprobe returned error".into()));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| RasiError::Video("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| RasiError::Video("Could not determine media duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_count_ceils() {
        assert_eq!(repeat_count(14.67, 10.0).unwrap(), 2);
        assert_eq!(repeat_count(30.0, 10.0).unwrap(), 3);
        assert_eq!(repeat_count(30.1, 10.0).unwrap(), 4);
    }

    #[test]
    fn test_repeat_count_short_audio_still_one() {
        assert_eq!(repeat_count(3.0, 10.0).unwrap(), 1);
        assert_eq!(repeat_count(0.0, 10.0).unwrap(), 1);
    }

    #[test]
    fn test_repeat_count_zero_template_errors() {
        assert!(repeat_count(10.0, 0.0).is_err());
    }

    #[test]
    fn test_end_to_end_scenario_numbers() {
        // 22s speech stretched by 1.5 -> ~14.67s; template 10s -> 2 repeats.
        let stretched = 22.0 / 1.5;
        assert_eq!(repeat_count(stretched, 10.0).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_compose_missing_template_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.mp4");
        let audio = dir.path().join("a.wav");
        let out = dir.path().join("out.mp4");
        let err = compose(&missing, &audio, &out).await.unwrap_err();
        assert!(matches!(err, RasiError::Video(_)));
    }
}
