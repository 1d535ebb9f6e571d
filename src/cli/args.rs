use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "specmatch")]
#[command(about = "Compare printer and MFP spec sheets using an xAI-compatible chat API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Write the result as a standalone HTML page
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Print the normalized Markdown table instead of HTML
    #[arg(long, global = true)]
    pub raw: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare the spec sheets of two equipment models
    Compare {
        /// First model, e.g. "Lexmark MX421"
        model1: String,
        /// Second model, e.g. "HP LaserJet Pro M428"
        model2: String,
    },
    /// Suggest equipment matching a free-text description
    Search {
        /// Desired manufacturers and specifications
        description: Vec<String>,
    },
    /// Write the default config file
    Init,
    /// Show configuration
    Config,
    /// Show version information
    Version,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub output: Option<PathBuf>,
    pub raw: bool,
    pub verbose: bool,
}

impl From<&Cli> for RenderOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            output: cli.output.clone(),
            raw: cli.raw,
            verbose: cli.verbose,
        }
    }
}
