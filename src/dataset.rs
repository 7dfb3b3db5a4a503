//! Labeled tweet datasets.
//!
//! Training data is a CSV file with a header row. Two columns are required,
//! anywhere in the header; any others are ignored:
//!
//! ```csv
//! id,content,label
//! 1,"Loving the new update! https://t.co/x",positive
//! 2,stuck in traffic again,negative
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Result, SentimentError};

/// Default name of the text column.
pub const CONTENT_COLUMN: &str = "content";

/// Default name of the label column.
pub const LABEL_COLUMN: &str = "label";

/// Parallel texts and labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    texts: Vec<String>,
    labels: Vec<String>,
}

impl Dataset {
    /// Build a dataset from parallel vectors.
    pub fn new(texts: Vec<String>, labels: Vec<String>) -> Result<Self> {
        if texts.len() != labels.len() {
            return Err(SentimentError::LengthMismatch {
                expected: texts.len(),
                actual: labels.len(),
            });
        }
        Ok(Dataset { texts, labels })
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Number of rows per label, in label order.
    pub fn label_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// The rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Result<Dataset> {
        let mut texts = Vec::with_capacity(indices.len());
        let mut labels = Vec::with_capacity(indices.len());
        for &index in indices {
            if index >= self.len() {
                return Err(SentimentError::IndexOutOfRange {
                    index,
                    len: self.len(),
                });
            }
            texts.push(self.texts[index].clone());
            labels.push(self.labels[index].clone());
        }
        Ok(Dataset { texts, labels })
    }

    /// Split into `(texts, labels)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.texts, self.labels)
    }
}

/// Reads [`Dataset`]s from CSV.
#[derive(Debug, Clone)]
pub struct CsvDatasetReader {
    content_column: String,
    label_column: String,
    delimiter: u8,
}

impl Default for CsvDatasetReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvDatasetReader {
    /// Create a reader for comma-separated `content`/`label` files.
    pub fn new() -> Self {
        CsvDatasetReader {
            content_column: CONTENT_COLUMN.to_string(),
            label_column: LABEL_COLUMN.to_string(),
            delimiter: b',',
        }
    }

    /// Use a different text column.
    pub fn with_content_column<S: Into<String>>(mut self, column: S) -> Self {
        self.content_column = column.into();
        self
    }

    /// Use a different label column.
    pub fn with_label_column<S: Into<String>>(mut self, column: S) -> Self {
        self.label_column = column.into();
        self
    }

    /// Set a custom delimiter character.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read a dataset from a file.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            SentimentError::input(format!("cannot open dataset {}: {e}", path.display()))
        })?;
        let dataset = self.read(file)?;
        log::info!("Loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Read a dataset from any reader.
    pub fn read<R: Read>(&self, input: R) -> Result<Dataset> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let position = |column: &str| headers.iter().position(|h| h.trim() == column);

        let content_index = position(&self.content_column);
        let label_index = position(&self.label_column);
        let (content_index, label_index) = match (content_index, label_index) {
            (Some(c), Some(l)) => (c, l),
            (c, l) => {
                let mut missing = Vec::new();
                if c.is_none() {
                    missing.push(self.content_column.clone());
                }
                if l.is_none() {
                    missing.push(self.label_column.clone());
                }
                return Err(SentimentError::MissingColumns(missing));
            }
        };

        let mut texts = Vec::new();
        let mut labels = Vec::new();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let (Some(content), Some(label)) = (record.get(content_index), record.get(label_index))
            else {
                return Err(SentimentError::input(format!(
                    "line {line}: row has {} fields, missing '{}' or '{}'",
                    record.len(),
                    self.content_column,
                    self.label_column
                )));
            };

            let label = label.trim();
            if label.is_empty() {
                return Err(SentimentError::input(format!("line {line}: empty label")));
            }

            texts.push(content.to_string());
            labels.push(label.to_string());
        }

        log::debug!("Read {} labeled rows", texts.len());
        Dataset::new(texts, labels)
    }
}
