//! File-based storage implementation.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SentimentError};
use crate::storage::traits::{Storage, StorageError, StorageInput, StorageOutput};

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// A storage backend rooted at a directory on the local file system.
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
    buffer_size: usize,
}

impl FileStorage {
    /// Create a new file storage in the given directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            std::fs::create_dir_all(&directory)
                .map_err(|e| SentimentError::storage(format!("Failed to create directory: {e}")))?;
        }

        if !directory.is_dir() {
            return Err(SentimentError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage {
            directory,
            buffer_size: DEFAULT_BUFFER_SIZE,
        })
    }

    /// Open an existing directory without creating it.
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(SentimentError::storage(format!(
                "Artifact directory does not exist: {}",
                directory.display()
            )));
        }
        Self::new(directory)
    }

    /// Set the read/write buffer size.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// The root directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }
}

fn map_io(name: &str, e: std::io::Error) -> SentimentError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StorageError::FileNotFound(name.to_string()).into()
    } else {
        StorageError::IoError(e.to_string()).into()
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let file = File::open(self.file_path(name)).map_err(|e| map_io(name, e))?;
        Ok(Box::new(FileInput::new(file, self.buffer_size)?))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.file_path(name))
            .map_err(|e| map_io(name, e))?;

        Ok(Box::new(FileOutput::new(file, self.buffer_size)))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.file_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| StorageError::IoError(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();

        for entry in
            std::fs::read_dir(&self.directory).map_err(|e| StorageError::IoError(e.to_string()))?
        {
            let entry = entry.map_err(|e| StorageError::IoError(e.to_string()))?;
            let path = entry.path();

            if path.is_file() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let metadata = self
            .file_path(name)
            .metadata()
            .map_err(|e| map_io(name, e))?;
        Ok(metadata.len())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        std::fs::rename(self.file_path(old_name), self.file_path(new_name))
            .map_err(|e| StorageError::IoError(format!("Failed to rename file: {e}")))?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        // Outputs sync themselves on close.
        Ok(())
    }
}

/// A buffered file reader.
#[derive(Debug)]
pub struct FileInput {
    reader: BufReader<File>,
    size: u64,
}

impl FileInput {
    fn new(file: File, buffer_size: usize) -> Result<Self> {
        let size = file
            .metadata()
            .map_err(|e| SentimentError::storage(format!("Failed to get file metadata: {e}")))?
            .len();

        Ok(FileInput {
            reader: BufReader::with_capacity(buffer_size, file),
            size,
        })
    }
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl StorageInput for FileInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }
}

/// A buffered file writer.
#[derive(Debug)]
pub struct FileOutput {
    writer: BufWriter<File>,
    position: u64,
}

impl FileOutput {
    fn new(file: File, buffer_size: usize) -> Self {
        FileOutput {
            writer: BufWriter::with_capacity(buffer_size, file),
            position: 0,
        }
    }
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.writer.write(buf)?;
        self.position += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl StorageOutput for FileOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| SentimentError::storage(format!("Failed to flush: {e}")))?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| SentimentError::storage(format!("Failed to sync: {e}")))?;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> Result<()> {
        self.flush_and_sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut output = storage.create_output("model.bin").unwrap();
        output.write_all(b"weights").unwrap();
        assert_eq!(output.position(), 7);
        output.close().unwrap();

        assert!(storage.file_exists("model.bin"));
        assert_eq!(storage.file_size("model.bin").unwrap(), 7);

        let mut input = storage.open_input("model.bin").unwrap();
        assert_eq!(input.read_all().unwrap(), b"weights");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(&nested).unwrap();
        assert!(storage.directory().is_dir());
        assert!(storage.list_files().unwrap().is_empty());
    }

    #[test]
    fn test_open_requires_existing_directory() {
        let dir = TempDir::new().unwrap();
        assert!(FileStorage::open(dir.path().join("nope")).is_err());
        assert!(FileStorage::open(dir.path()).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let err = storage.open_input("absent.bin").unwrap_err();
        assert!(err.to_string().contains("File not found: absent.bin"));
        assert!(storage.delete_file("absent.bin").is_ok());
    }

    #[test]
    fn test_rename_and_list() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        for name in ["b.tmp", "a.bin"] {
            let mut output = storage.create_output(name).unwrap();
            output.write_all(name.as_bytes()).unwrap();
            output.close().unwrap();
        }
        storage.rename_file("b.tmp", "b.bin").unwrap();

        assert_eq!(storage.list_files().unwrap(), vec!["a.bin", "b.bin"]);
        storage.delete_file("a.bin").unwrap();
        assert_eq!(storage.list_files().unwrap(), vec!["b.bin"]);
    }
}
