use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for reportmark
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "reportmark: report markdown to HWPX converter"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the reportmark CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Convert a markdown report into a document container.
  Convert {
    /// Markdown input file, or `-` for standard input.
    input: PathBuf,

    /// Path of the container to write.
    #[arg(short, long)]
    output: PathBuf,
  },

  /// Print the classified elements of a markdown report as JSON.
  Classify {
    /// Markdown input file, or `-` for standard input.
    input: PathBuf,
  },

  /// Initialize a new reportmark configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "reportmark.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Export the built-in snippets and base container for customization.
  ExportTemplates {
    /// Output directory for the exported files.
    #[arg(short, long, default_value = "reference")]
    output_dir: PathBuf,

    /// Whether to overwrite existing files.
    #[arg(long)]
    force: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::panic, reason = "Fine in tests")]

  use clap::Parser;

  use super::*;

  #[test]
  fn test_convert_args() {
    let cli = Cli::try_parse_from([
      "reportmark",
      "-v",
      "convert",
      "report.md",
      "-o",
      "report.hwpx",
      "--config",
      "body_path=Contents/section1.xml",
    ])
    .expect("parse");

    assert!(cli.verbose);
    assert_eq!(cli.config_overrides, vec!["body_path=Contents/section1.xml"]);
    match cli.command {
      Commands::Convert { input, output } => {
        assert_eq!(input, PathBuf::from("report.md"));
        assert_eq!(output, PathBuf::from("report.hwpx"));
      },
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn test_init_defaults() {
    let cli = Cli::try_parse_from(["reportmark", "init"]).expect("parse");
    match cli.command {
      Commands::Init {
        output,
        format,
        force,
      } => {
        assert_eq!(output, PathBuf::from("reportmark.toml"));
        assert_eq!(format, "toml");
        assert!(!force);
      },
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn test_convert_requires_output() {
    assert!(Cli::try_parse_from(["reportmark", "convert", "a.md"]).is_err());
  }

  #[test]
  fn test_init_rejects_unknown_format() {
    let result =
      Cli::try_parse_from(["reportmark", "init", "--format", "yaml"]);
    assert!(result.is_err());
  }
}
