//! Command line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::evaluation::{DEFAULT_SEED, DEFAULT_TEST_FRACTION};

/// Default directory for trained artifacts.
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

/// tweet-sentiment - TF-IDF + logistic regression sentiment for short social-media text
#[derive(Parser, Debug, Clone)]
#[command(name = "tweet-sentiment")]
#[command(about = "Train and run a TF-IDF + logistic regression tweet sentiment classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SentimentArgs {
    /// Verbosity level (repeat for more: -v warn, -vv info, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SentimentArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a pipeline on a labeled CSV file and save its artifacts
    Train(TrainArgs),

    /// Predict the sentiment of texts (interactive when no text is given)
    Predict(PredictArgs),

    /// Score saved artifacts against a labeled CSV file
    Evaluate(EvaluateArgs),

    /// Show the normalized tokens of texts
    Normalize(NormalizeArgs),

    /// Summarize saved artifacts
    Inspect(InspectArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Labeled CSV file with `content` and `label` columns
    #[arg(short, long, value_name = "CSV")]
    pub data: PathBuf,

    /// Directory to write artifacts to
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifacts: PathBuf,

    /// Pipeline configuration file (JSON); flags below override it
    #[arg(short, long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Fraction of rows held out for evaluation (0 disables the hold-out)
    #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
    pub test_size: f64,

    /// Seed for the train/test shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Keep label proportions equal in both splits
    #[arg(long)]
    pub stratify: bool,

    /// Vocabulary cap
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Optimizer iteration cap
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Inverse regularization strength
    #[arg(long = "c", value_name = "C")]
    pub c: Option<f64>,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Directory holding trained artifacts
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifacts: PathBuf,

    /// Texts to classify; omit for an interactive prompt
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,
}

/// Arguments for evaluation
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Labeled CSV file with `content` and `label` columns
    #[arg(short, long, value_name = "CSV")]
    pub data: PathBuf,

    /// Directory holding trained artifacts
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifacts: PathBuf,
}

/// Arguments for normalization
#[derive(Parser, Debug, Clone)]
pub struct NormalizeArgs {
    /// Texts to normalize; omit to read lines from stdin
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,
}

/// Arguments for artifact inspection
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Directory holding trained artifacts
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifacts: PathBuf,

    /// Number of strongest features to list per class
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
