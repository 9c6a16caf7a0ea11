//! Command-line interface definitions for diglot

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the diglot application
#[derive(Parser)]
#[command(name = "diglot")]
#[command(version)]
#[command(about = "Align source and translated TEI editions into parallel passages", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for diglot
#[derive(Subcommand)]
pub enum Commands {
    /// Write a default diglot.toml for a corpus
    Init {
        /// Corpus directory (defaults to current directory)
        path: Option<PathBuf>,

        /// Language tag of the source editions (e.g., lat, grc)
        #[arg(short, long, default_value = "lat")]
        source_language: String,

        /// Language tag of the translated editions
        #[arg(short, long, default_value = "eng")]
        target_language: String,

        /// Overwrite an existing diglot.toml
        #[arg(short, long)]
        force: bool,
    },

    /// Align every document pair of a corpus and write JSON output
    Align {
        /// Corpus directory (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "aligned")]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the section keys of one edition in document order
    Keys {
        /// Edition file
        file: PathBuf,

        /// Configuration file (defaults to the built-in Perseus profile)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Edition language (defaults to the language in the file name)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Parse a patch file and summarize its entries
    CheckPatches {
        /// Patch description file
        file: PathBuf,
    },
}
