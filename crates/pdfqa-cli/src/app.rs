//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfqa")]
#[command(
    author,
    version,
    about = "Ask questions about a folder of PDFs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (YAML)
    #[arg(long, global = true, env = "PDFQA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, chunk and embed the PDFs if the store is empty
    Ingest,

    /// Answer a question from the indexed documents
    Ask(AskArgs),

    /// Vector similarity search without generation
    Search(SearchArgs),

    /// Show vector store status
    Status,

    /// Start the HTTP service
    Serve(ServeArgs),

    /// Show or write the configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct AskArgs {
    /// The question
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Nearest neighbours requested per query
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Minimum similarity score
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Only search with the question as asked
    #[arg(long)]
    pub no_rewrite: bool,

    /// Metadata filter, e.g. page=2 or page>=1 (repeatable, all must match)
    #[arg(long = "filter")]
    pub filters: Vec<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'n', long, default_value = "5")]
    pub limit: usize,

    /// Minimum similarity score
    #[arg(long, default_value = "0")]
    pub min_score: f32,

    /// Metadata filter, e.g. source=manual.pdf (repeatable, all must match)
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Show chunk text
    #[arg(long)]
    pub full: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Listen address (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration to a file
    Init {
        /// Destination (defaults to --config or the user config path)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
