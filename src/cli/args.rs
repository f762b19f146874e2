//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Balance-beam puzzle solver: torque equilibrium, missing-weight inference and layout scaling
#[derive(Parser, Debug)]
#[command(name = "balance")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether every beam is in equilibrium
    Check {
        /// Puzzle file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show the weight inferred for the missing pan
    Infer {
        /// Puzzle file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show spans and layout scale per beam
    Layout {
        /// Puzzle file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show the puzzle as tree
    Tree {
        /// Puzzle file
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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}
