//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Settings, SpeechEngine};
use crate::gemini;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Rasi Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Check external tools
    println!("{}", style("External Tools").bold());
    checks.push(check_tool("ffmpeg", "ffmpeg -version", install_hint_ffmpeg()));
    checks.push(check_tool(
        "ffprobe",
        "ffprobe -version",
        install_hint_ffmpeg(),
    ));
    if settings.speech.engine == SpeechEngine::Local {
        checks.push(check_tool(
            "espeak-ng",
            "espeak-ng --version",
            install_hint_espeak(),
        ));
    }
    for check in &checks {
        check.print();
    }

    println!();

    // Check API keys
    println!("{}", style("API Configuration").bold());
    let api_check = check_gemini_api_key();
    api_check.print();
    checks.push(api_check);

    println!();

    // Check upload credentials
    println!("{}", style("Upload Credentials").bold());
    let cred_checks = check_credentials(settings);
    for check in &cred_checks {
        check.print();
    }
    checks.extend(cred_checks);

    println!();

    // Check media files
    println!("{}", style("Media").bold());
    let media_check = check_template(settings);
    media_check.print();
    checks.push(media_check);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Rasi.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Rasi is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let parts: Vec<&str> = version_cmd.split_whitespace().collect();
    let cmd = parts[0];
    let args = &parts[1..];

    match Command::new(cmd).args(args).output() {
        Ok(output) if output.status.success() => {
            // Try to extract version from first line
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            // Truncate long version strings
            let version_display = if version.len() > 50 {
                format!("{}...", &version[..50])
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check if the Gemini API key is configured.
fn check_gemini_api_key() -> CheckResult {
    match std::env::var(gemini::API_KEY_ENV) {
        Ok(key) if key.len() > 20 => {
            let masked = format!("{}...{}", &key[..4], &key[key.len() - 4..]);
            CheckResult::ok(gemini::API_KEY_ENV, &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            gemini::API_KEY_ENV,
            "empty",
            "Set with: export GEMINI_API_KEY='...'",
        ),
        Ok(_) => CheckResult::warning(
            gemini::API_KEY_ENV,
            "set but looks too short",
            "Expected a Google AI Studio API key",
        ),
        Err(_) => CheckResult::error(
            gemini::API_KEY_ENV,
            "not set",
            "Set with: export GEMINI_API_KEY='...'",
        ),
    }
}

/// Check OAuth client secrets and cached token.
fn check_credentials(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let secrets_path = settings.client_secrets_path();
    if secrets_path.exists() {
        results.push(CheckResult::ok(
            "Client secrets",
            &format!("{}", secrets_path.display()),
        ));
    } else {
        results.push(CheckResult::error(
            "Client secrets",
            &format!("{} not found", secrets_path.display()),
            "Download OAuth client credentials from the Google Cloud console",
        ));
    }

    let token_path = settings.token_path();
    if token_path.exists() {
        results.push(CheckResult::ok(
            "Cached token",
            &format!("{}", token_path.display()),
        ));
    } else {
        results.push(CheckResult::warning(
            "Cached token",
            &format!("{} (not created yet)", token_path.display()),
            "A browser sign-in will run on the first upload",
        ));
    }

    results
}

/// Check that the template video exists.
fn check_template(settings: &Settings) -> CheckResult {
    let template = settings.template_path();
    if template.exists() {
        let size = std::fs::metadata(&template)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        CheckResult::ok("Template video", &format!("{} ({})", template.display(), size))
    } else {
        CheckResult::error(
            "Template video",
            &format!("{} not found", template.display()),
            "Set video.template_path in the config to your background clip",
        )
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: rasi config show > config.toml",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

/// Platform-specific install hint for espeak-ng.
fn install_hint_espeak() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install espeak-ng"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install espeak-ng (or your package manager)"
    } else {
        "Install from: https://github.com/espeak-ng/espeak-ng"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }
}
