//! Command-line interface definition for Stargazer
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, the zenith calculator, credential
//! management, and the APOD proxy.

use clap::{Parser, Subcommand};

/// Stargazer - astronomy chat assistant
///
/// Chat with a generative language model about the night sky, or run a
/// small proxy for NASA's Astronomy Picture of the Day API.
#[derive(Parser, Debug, Clone)]
#[command(name = "stargazer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Stargazer
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive astronomy chat session
    Chat {
        /// Override the configured model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask which constellation is near the zenith for a place and time
    Zenith {
        /// Observer latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        /// Observer longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: String,

        /// Local date and time (defaults to now)
        #[arg(long)]
        time: Option<String>,

        /// Override the configured model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage the stored generative API key
    Key {
        /// Key management subcommand
        #[command(subcommand)]
        command: KeyCommand,
    },

    /// Run the Astronomy Picture of the Day proxy server
    Serve {
        /// Socket address to listen on
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Fetch the Astronomy Picture of the Day directly
    Apod {
        /// Date to fetch (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Credential management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum KeyCommand {
    /// Store the API key
    Set {
        /// API key value
        value: String,
    },

    /// Show whether a key is stored (masked)
    Show,

    /// Remove the stored key
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Chat { model: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Chat { model: None }));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["stargazer", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }

    #[test]
    fn test_cli_parse_chat_with_model() {
        let cli = Cli::try_parse_from(["stargazer", "chat", "--model", "gemini-2.0-flash"]).unwrap();
        if let Commands::Chat { model } = cli.command {
            assert_eq!(model, Some("gemini-2.0-flash".to_string()));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_zenith_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "stargazer",
            "zenith",
            "--lat",
            "-33.86",
            "--lon",
            "-151.21",
        ])
        .unwrap();
        if let Commands::Zenith {
            lat, lon, time, ..
        } = cli.command
        {
            assert_eq!(lat, "-33.86");
            assert_eq!(lon, "-151.21");
            assert!(time.is_none());
        } else {
            panic!("Expected Zenith command");
        }
    }

    #[test]
    fn test_cli_parse_zenith_requires_coordinates() {
        let cli = Cli::try_parse_from(["stargazer", "zenith", "--lat", "10"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_key_set() {
        let cli = Cli::try_parse_from(["stargazer", "key", "set", "abc123"]).unwrap();
        if let Commands::Key {
            command: KeyCommand::Set { value },
        } = cli.command
        {
            assert_eq!(value, "abc123");
        } else {
            panic!("Expected Key Set command");
        }
    }

    #[test]
    fn test_cli_parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["stargazer", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Commands::Serve { bind } = cli.command {
            assert_eq!(bind, Some("0.0.0.0:8080".to_string()));
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_cli_parse_apod_with_date() {
        let cli = Cli::try_parse_from(["stargazer", "apod", "--date", "2024-04-08"]).unwrap();
        if let Commands::Apod { date } = cli.command {
            assert_eq!(date, Some("2024-04-08".to_string()));
        } else {
            panic!("Expected Apod command");
        }
    }

    #[test]
    fn test_cli_verbose_and_config() {
        let cli =
            Cli::try_parse_from(["stargazer", "-v", "--config", "custom.yaml", "chat"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
    }
}
