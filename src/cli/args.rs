//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::OutputStyle;

/// Decode, render, search and validate trees stored in the flat `[payload, @N@]` encoding
#[derive(Parser, Debug)]
#[command(name = "evtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode an encoded tree (JSON array of strings) and print it
    Show {
        /// Input file, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Override the configured output style
        #[arg(short, long, value_enum)]
        style: Option<StyleArg>,
    },

    /// Print every payload matching a regular expression, in pre-order
    Find {
        /// Input file, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Regular expression matched against each payload
        pattern: String,

        /// Stop after the first match
        #[arg(short, long)]
        first: bool,
    },

    /// Decode, re-encode and verify the round trip
    Check {
        /// Input file, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective settings as TOML
    Show,
    /// Print the global config file location
    Path,
}

/// Output style as accepted on the command line.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleArg {
    Tree,
    Array,
    Json,
}

impl From<StyleArg> for OutputStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Tree => OutputStyle::Tree,
            StyleArg::Array => OutputStyle::Array,
            StyleArg::Json => OutputStyle::Json,
        }
    }
}
