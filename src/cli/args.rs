//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::BackendKind;

/// Live preview for markup sources with inline error markers
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "preview.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Override the compiler backend from the config file
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendKind>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the browser playground
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Recompile a file whenever it changes on disk
    #[command(visible_alias = "w")]
    Watch {
        /// Source file to watch
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Output HTML path (default: <FILE>.html)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Compile a file once
    #[command(visible_alias = "b")]
    Build {
        /// Source file to compile
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Output HTML path (default: stdout)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("em-preview").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_serve_defaults() {
        let cli = parse(&["serve"]);
        assert!(matches!(cli.command, Commands::Serve { interface: None, port: None }));
        assert_eq!(cli.config, PathBuf::from("preview.toml"));
        assert!(cli.backend.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_aliases_and_globals() {
        let cli = parse(&["w", "notes.em", "-V", "--backend", "markdown"]);
        assert!(cli.verbose);
        assert_eq!(cli.backend, Some(BackendKind::Markdown));
        match cli.command {
            Commands::Watch { file, output } => {
                assert_eq!(file, PathBuf::from("notes.em"));
                assert!(output.is_none());
            }
            other => panic!("expected watch, got {other:?}"),
        }
    }

    #[test]
    fn test_build_output() {
        let cli = parse(&["b", "a.em", "-o", "a.html", "-C", "other.toml"]);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(
            cli.command,
            Commands::Build { output: Some(ref o), .. } if o == &PathBuf::from("a.html")
        ));
    }

    #[test]
    fn test_missing_file_rejected() {
        assert!(Cli::try_parse_from(["em-preview", "build"]).is_err());
    }
}
