//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{Settings, SpeechEngine};
use crate::error::{RasiError, Result};
use crate::gemini;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Rendering requires the Gemini key and media tools.
    Render,
    /// Uploading requires the Gemini key for metadata generation.
    Upload,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Render => {
            check_api_key()?;
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
            if settings.speech.engine == SpeechEngine::Local {
                check_tool("espeak-ng")?;
            }
        }
        Operation::Upload => {
            check_api_key()?;
        }
    }
    Ok(())
}

/// Check if the Gemini API key is configured.
fn check_api_key() -> Result<()> {
    if gemini::is_api_key_configured() {
        Ok(())
    } else {
        Err(RasiError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            gemini::API_KEY_ENV,
            gemini::API_KEY_ENV
        )))
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(RasiError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RasiError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(RasiError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_upload_only_needs_api_key() {
        // With the key set in the environment the upload pre-flight
        // has nothing else to verify.
        std::env::set_var(gemini::API_KEY_ENV, "test-key");
        let settings = Settings::default();
        assert!(check(Operation::Upload, &settings).is_ok());
    }
}
