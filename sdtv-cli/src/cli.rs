use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sdtv",
    about = "Resolve sportdeutschland.tv live and replay streams",
    version,
    author
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds, overrides the configured value
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Proxy URL (supports http, https, socks5)
    #[arg(long, global = true, env = "SDTV_PROXY")]
    pub proxy: Option<String>,

    /// Proxy username (if proxy requires authentication)
    #[arg(long, global = true)]
    pub proxy_username: Option<String>,

    /// Proxy password (if proxy requires authentication)
    #[arg(long, global = true)]
    pub proxy_password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the streams behind a sportdeutschland.tv page
    Extract {
        /// The page URL, e.g. https://sportdeutschland.tv/badminton/finals
        #[arg(short, long)]
        url: String,

        /// Output format, defaults to the configured one
        #[arg(short, long)]
        output: Option<OutputFormat>,

        /// Save output to file
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,

        /// Only print the best format
        #[arg(long)]
        best: bool,
    },

    /// List supported platforms
    Platforms,

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Show configuration information
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty-printed human-readable output
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// Compact JSON output
    JsonCompact,
    /// Table of formats
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonCompact => write!(f, "json-compact"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_extract() {
        let args = Args::parse_from([
            "sdtv",
            "--timeout",
            "10",
            "extract",
            "--url",
            "https://sportdeutschland.tv/badminton/finals",
            "-o",
            "json-compact",
            "--best",
        ]);
        assert_eq!(args.timeout, Some(10));
        match args.command {
            Commands::Extract {
                url, output, best, ..
            } => {
                assert_eq!(url, "https://sportdeutschland.tv/badminton/finals");
                assert_eq!(output, Some(OutputFormat::JsonCompact));
                assert!(best);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
