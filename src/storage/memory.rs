//! In-memory storage implementation for testing and caching.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::storage::traits::{Storage, StorageError, StorageInput, StorageOutput};

type FileMap = Arc<Mutex<HashMap<String, Box<[u8]>>>>;

/// An in-memory storage implementation.
///
/// Clones share the same files, so a store written through one handle can be
/// read back through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: FileMap,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of files stored.
    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }

    /// Get the total size of all files.
    pub fn total_size(&self) -> u64 {
        self.files.lock().values().map(|data| data.len() as u64).sum()
    }

    /// Replace a file's bytes directly.
    pub fn put(&self, name: &str, data: Vec<u8>) {
        self.files
            .lock()
            .insert(name.to_string(), data.into_boxed_slice());
    }

    /// Copy of a file's bytes, if present.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().get(name).map(|data| data.to_vec())
    }

    /// Clear all files from storage.
    pub fn clear(&self) {
        self.files.lock().clear();
    }
}

impl Storage for MemoryStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let files = self.files.lock();
        let data = files
            .get(name)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;

        Ok(Box::new(MemoryInput::new(data.to_vec())))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        Ok(Box::new(MemoryOutput::new(
            name.to_string(),
            Arc::clone(&self.files),
        )))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.files.lock().remove(name);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.files.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        self.files
            .lock()
            .get(name)
            .map(|data| data.len() as u64)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()).into())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        let mut files = self.files.lock();
        let data = files
            .remove(old_name)
            .ok_or_else(|| StorageError::FileNotFound(old_name.to_string()))?;
        files.insert(new_name.to_string(), data);
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

/// A reader over a snapshot of an in-memory file.
#[derive(Debug)]
pub struct MemoryInput {
    cursor: Cursor<Vec<u8>>,
}

impl MemoryInput {
    fn new(data: Vec<u8>) -> Self {
        MemoryInput {
            cursor: Cursor::new(data),
        }
    }
}

impl Read for MemoryInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl StorageInput for MemoryInput {
    fn size(&self) -> Result<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }
}

/// A writer that commits its buffer to the shared map on close (or drop).
#[derive(Debug)]
pub struct MemoryOutput {
    name: String,
    buffer: Vec<u8>,
    files: FileMap,
    closed: bool,
}

impl MemoryOutput {
    fn new(name: String, files: FileMap) -> Self {
        MemoryOutput {
            name,
            buffer: Vec::new(),
            files,
            closed: false,
        }
    }

    fn commit(&mut self) {
        let data = std::mem::take(&mut self.buffer).into_boxed_slice();
        self.files.lock().insert(self.name.clone(), data);
        self.closed = true;
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.closed {
            return Err(std::io::Error::other(
                StorageError::OutputClosed(self.name.clone()).to_string(),
            ));
        }
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl StorageOutput for MemoryOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn position(&self) -> u64 {
        self.buffer.len() as u64
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.commit();
        }
        Ok(())
    }
}

impl Drop for MemoryOutput {
    fn drop(&mut self) {
        if !self.closed {
            self.commit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_visible_after_close() {
        let storage = MemoryStorage::new();

        let mut output = storage.create_output("a.bin").unwrap();
        output.write_all(b"hello").unwrap();
        assert!(!storage.file_exists("a.bin"));
        output.close().unwrap();

        assert!(storage.file_exists("a.bin"));
        assert_eq!(storage.file_size("a.bin").unwrap(), 5);
        let mut input = storage.open_input("a.bin").unwrap();
        assert_eq!(input.read_all().unwrap(), b"hello");
    }

    #[test]
    fn test_output_committed_on_drop() {
        let storage = MemoryStorage::new();
        {
            let mut output = storage.create_output("b.bin").unwrap();
            output.write_all(b"xyz").unwrap();
        }
        assert_eq!(storage.get("b.bin").unwrap(), b"xyz");
    }

    #[test]
    fn test_write_after_close_fails() {
        let storage = MemoryStorage::new();
        let mut output = storage.create_output("c.bin").unwrap();
        output.close().unwrap();
        assert!(output.write_all(b"late").is_err());
    }

    #[test]
    fn test_clones_share_files() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.put("x", vec![1, 2, 3]);

        assert_eq!(other.file_count(), 1);
        assert_eq!(other.total_size(), 3);
        other.rename_file("x", "y").unwrap();
        assert_eq!(storage.list_files().unwrap(), vec!["y"]);

        storage.clear();
        assert_eq!(other.file_count(), 0);
    }

    #[test]
    fn test_missing_file() {
        let storage = MemoryStorage::new();
        assert!(storage.open_input("nope").is_err());
        assert!(storage.file_size("nope").is_err());
        assert!(storage.rename_file("nope", "other").is_err());
        assert!(storage.delete_file("nope").is_ok());
    }
}
