//! CLI command definitions for the `kawaii` binary.
//!
//! Uses clap derive macros for argument parsing. `serve` runs the relay;
//! the other commands work directly on the database and need no API key.

pub mod chats;
pub mod sweep;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use kawaii_infra::config::DATA_DIR_ENV;

/// Kawaii chat relay.
#[derive(Parser)]
#[command(name = "kawaii", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Directory holding `chats.db` and `config.toml`.
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat relay server.
    Serve {
        /// Host to bind to (overrides the config file).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Delete expired conversations once and exit.
    Sweep,

    /// List stored conversations.
    #[command(alias = "ls")]
    Chats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["kawaii", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kawaii", "chats", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Chats));
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["kawaii"]).is_err());
    }
}
