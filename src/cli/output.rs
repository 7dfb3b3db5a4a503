//! Output formatting for CLI commands.
//!
//! Every command result is `Serialize` for `--format json` and `Display` for
//! the human-readable format.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, SentimentArgs};
use crate::error::Result;
use crate::evaluation::Evaluation;
use crate::pipeline::{Prediction, TrainingReport};

/// Result structure for a training run.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingResult {
    pub artifacts: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub training: TrainingReport,
    pub evaluation: Option<Evaluation>,
    pub duration_ms: u64,
}

/// One classified text.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResult {
    pub text: String,
    #[serde(flatten)]
    pub prediction: Prediction,
}

/// Several classified texts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionResults(pub Vec<PredictionResult>);

/// Normalized tokens of one text.
#[derive(Debug, Serialize, Deserialize)]
pub struct NormalizationResult {
    pub text: String,
    pub tokens: Vec<String>,
}

/// Normalized tokens of several texts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizationResults(pub Vec<NormalizationResult>);

/// Summary of a saved artifact directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub directory: String,
    pub files: Vec<ArtifactFile>,
    pub analyzer: String,
    pub n_documents: usize,
    pub vocabulary_size: usize,
    pub ngram_range: (usize, usize),
    pub classes: Vec<String>,
    pub top_features: Vec<ClassFeatures>,
}

/// A stored artifact and its size.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub name: String,
    pub size_bytes: u64,
}

/// The strongest features of one class.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassFeatures {
    pub label: String,
    pub features: Vec<(String, f64)>,
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &SentimentArgs) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: fmt::Display>(message: &str, result: &T, args: &SentimentArgs) -> Result<()> {
    if args.verbosity() > 0 && !message.is_empty() {
        println!("{message}");
        println!();
    }
    print!("{result}");
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &SentimentArgs) -> Result<()> {
    println!("{}", to_json(result, args.pretty)?);
    Ok(())
}

/// Render `result` as JSON.
pub fn to_json<T: Serialize>(result: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

impl fmt::Display for TrainingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Training rows:   {}", self.train_rows)?;
        writeln!(f, "Hold-out rows:   {}", self.test_rows)?;
        writeln!(f, "Vocabulary size: {}", self.training.vocabulary_size)?;
        writeln!(f, "Classes:         {}", self.training.classes.join(", "))?;
        writeln!(
            f,
            "Optimizer:       {} iterations, loss {:.6}{}",
            self.training.fit.n_iter,
            self.training.fit.final_loss,
            if self.training.fit.converged {
                ""
            } else {
                " (not converged)"
            }
        )?;
        if let Some(evaluation) = &self.evaluation {
            writeln!(f)?;
            write!(f, "{evaluation}")?;
        }
        writeln!(f)?;
        writeln!(f, "Artifacts saved to {} ({} ms)", self.artifacts, self.duration_ms)
    }
}

impl fmt::Display for PredictionResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.0 {
            writeln!(
                f,
                "{:<10} {:>6.2}%  {}",
                result.prediction.label,
                result.prediction.confidence * 100.0,
                result.text
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for NormalizationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.0 {
            writeln!(f, "{}", result.tokens.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Display for ArtifactSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Artifacts in {}", self.directory)?;
        for file in &self.files {
            writeln!(f, "  {:<20} {:>10} bytes", file.name, file.size_bytes)?;
        }
        writeln!(f)?;
        writeln!(f, "Analyzer:        {}", self.analyzer)?;
        writeln!(f, "Documents:       {}", self.n_documents)?;
        writeln!(f, "Vocabulary size: {}", self.vocabulary_size)?;
        writeln!(
            f,
            "N-gram range:    {}..={}",
            self.ngram_range.0, self.ngram_range.1
        )?;
        writeln!(f, "Classes:         {}", self.classes.join(", "))?;
        for class in &self.top_features {
            writeln!(f)?;
            writeln!(f, "Top features for '{}':", class.label)?;
            for (term, weight) in &class.features {
                writeln!(f, "  {weight:>8.4}  {term}")?;
            }
        }
        Ok(())
    }
}
