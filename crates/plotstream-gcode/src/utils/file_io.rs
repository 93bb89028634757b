//! File I/O
//!
//! Reads program files line by line and writes normalized command lists back
//! to disk. The file handle lives only for the duration of one call, so it is
//! released on every exit path, including a failing line callback.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use plotstream_core::{Command, GcodeError};

use crate::gcode::serializer::write_commands;

/// Buffer size for reading large files (256 KB)
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// File read statistics
#[derive(Debug, Clone)]
pub struct FileReadStats {
    /// Total bytes read
    pub bytes_read: u64,
    /// Total lines read
    pub lines_read: u64,
    /// File size in bytes
    pub file_size: u64,
    /// Time taken to read (milliseconds)
    pub read_time_ms: u64,
}

/// G-code file reader with streaming support
#[derive(Debug)]
pub struct GcodeFileReader {
    path: PathBuf,
    file_size: u64,
}

impl GcodeFileReader {
    /// Create a new G-code file reader
    ///
    /// # Errors
    /// Returns error if file does not exist or cannot be accessed
    pub fn new(path: impl AsRef<Path>) -> Result<Self, GcodeError> {
        let path = path.as_ref().to_path_buf();
        let metadata = fs::metadata(&path)?;

        if !metadata.is_file() {
            return Err(GcodeError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Path is not a file: {}", path.display()),
            )));
        }

        Ok(Self {
            path,
            file_size: metadata.len(),
        })
    }

    /// Get file size in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for log messages
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Read the file line by line
    ///
    /// `callback` receives the 1-based line number and the line without its
    /// terminator. The first error, from reading or from the callback, stops
    /// the read and is returned.
    pub fn read_lines<F>(&self, mut callback: F) -> Result<FileReadStats, GcodeError>
    where
        F: FnMut(usize, &str) -> Result<(), GcodeError>,
    {
        let start_time = Instant::now();
        let name = self.display_name();
        tracing::info!("Opening file \"{}\"", name);

        let file = File::open(&self.path)?;
        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut lines_read = 0u64;
        let mut bytes_read = 0u64;

        let result = reader.lines().enumerate().try_for_each(|(index, line)| {
            let line = line?;
            bytes_read += line.len() as u64 + 1;
            lines_read += 1;
            callback(index + 1, &line)
        });

        tracing::info!("Closing file \"{}\" after {} lines", name, lines_read);
        result?;

        Ok(FileReadStats {
            bytes_read,
            lines_read,
            file_size: self.file_size,
            read_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

/// Save a command list as a normalized program
///
/// Writes one canonical line per command followed by an empty line.
pub fn save_commands(path: impl AsRef<Path>, commands: &[Command]) -> Result<(), GcodeError> {
    let path = path.as_ref();
    tracing::info!("Saving {} commands to {}", commands.len(), path.display());

    let mut writer = BufWriter::new(File::create(path)?);
    write_commands(&mut writer, commands)?;
    writeln!(writer)?;
    writer.flush()?;

    tracing::info!("Saved successfully");
    Ok(())
}
