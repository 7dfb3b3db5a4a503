//! Storage traits and common types.

use std::fmt::Debug;
use std::io::{Read, Write};

use crate::error::{Result, SentimentError};

/// A trait for storage backends holding named blobs.
///
/// Artifact persistence only ever needs flat names, so there are no
/// directories here: a backend is a single namespace of files.
pub trait Storage: Send + Sync + Debug {
    /// Open a file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create a file for writing, truncating any existing content.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// List all files in sorted order.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Get the size of a file in bytes.
    fn file_size(&self, name: &str) -> Result<u64>;

    /// Rename a file, replacing the target if it exists.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Sync all pending changes to durable storage.
    fn sync(&self) -> Result<()>;
}

/// A trait for reading from storage.
pub trait StorageInput: Read + Send + Debug {
    /// Get the size of the input stream.
    fn size(&self) -> Result<u64>;

    /// Read the remaining content into a byte vector.
    fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.size()? as usize);
        self.read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

/// A trait for writing to storage.
pub trait StorageOutput: Write + Send + Debug {
    /// Flush and sync the output to storage.
    fn flush_and_sync(&mut self) -> Result<()>;

    /// Number of bytes written so far.
    fn position(&self) -> u64;

    /// Close the output stream, making its content visible.
    fn close(&mut self) -> Result<()>;
}

/// Errors raised by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// File not found.
    FileNotFound(String),

    /// I/O error.
    IoError(String),

    /// Output was already closed.
    OutputClosed(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::FileNotFound(name) => write!(f, "File not found: {name}"),
            StorageError::IoError(msg) => write!(f, "I/O error: {msg}"),
            StorageError::OutputClosed(name) => write!(f, "Output already closed: {name}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for SentimentError {
    fn from(err: StorageError) -> Self {
        SentimentError::storage(err.to_string())
    }
}
