//! CLI module for Rasi.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Rasi - daily zodiac horoscope videos
///
/// Renders narrated horoscope videos from AI-generated copy and publishes
/// them to YouTube. "Rasi" is the Tamil word for a zodiac sign.
#[derive(Parser, Debug)]
#[command(name = "rasi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render today's horoscope video for a language
    Render {
        /// Language code: ta for Tamil, en-in for English, hi for Hindi
        #[arg(long, default_value = "ta")]
        lang: String,
    },

    /// Upload a previously rendered horoscope video
    Upload {
        /// Language code: ta for Tamil, en-in for English, hi for Hindi
        #[arg(long, default_value = "ta")]
        lang: String,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
