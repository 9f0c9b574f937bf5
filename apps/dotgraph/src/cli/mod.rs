//! # dotgraph CLI Module
//!
//! This module implements the CLI interface for dotgraph.
//!
//! ## Available Commands
//!
//! - `build` - Build a graph from a TOML description
//! - `explore` - Explore a JSON document and graph its object structure
//!
//! Without `--output` the DOT text goes to stdout; with it, Graphviz
//! renders `<output>.<format>`.

mod commands;

use clap::{Args, Parser, Subcommand};
use dotgraph_core::DotGraphError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// dotgraph - ranked Graphviz graphs from descriptions and object structure
#[derive(Parser, Debug)]
#[command(name = "dotgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a graph from a TOML description
    Build {
        /// Path to the description file
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Explore a JSON document
    Explore {
        /// Path to the JSON file
        file: PathBuf,

        /// Follow this own property as a relation (repeatable)
        #[arg(short, long = "property", value_name = "KEY")]
        properties: Vec<String>,

        /// Follow every key that occurs in the document
        #[arg(long)]
        all_keys: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Output options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Render to <OUTPUT>.<FORMAT> instead of printing DOT
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Graphviz output format
    #[arg(short = 'T', long, default_value = crate::render::DEFAULT_FORMAT)]
    pub format: String,

    /// Open the rendered file
    #[arg(short, long, requires = "output")]
    pub show: bool,

    /// Override a global graph attribute (repeatable)
    #[arg(short, long = "attr", value_name = "KEY=VALUE")]
    pub attrs: Vec<String>,

    /// Graphviz program (defaults to $DOTGRAPH_DOT, then `dot`)
    #[arg(long, value_name = "PROGRAM")]
    pub dot: Option<String>,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), DotGraphError> {
    match cli.command {
        Commands::Build { file, output } => cmd_build(&file, &output),
        Commands::Explore {
            file,
            properties,
            all_keys,
            output,
        } => cmd_explore(&file, &properties, all_keys, &output),
    }
}
