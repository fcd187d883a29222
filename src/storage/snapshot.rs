use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default location of the counter snapshot, relative to the working directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "server_output.txt";

/// A single durable slot holding the counter as decimal text.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored value.
    ///
    /// # Returns
    /// * `Ok(Some(value))` if the file exists and holds a valid counter.
    /// * `Ok(None)` if the file does not exist.
    /// * `Err` if the file could not be read or does not parse.
    pub fn load(&self) -> io::Result<Option<u32>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        contents
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Overwrites the slot with `value`.
    pub fn store(&self, value: u32) -> io::Result<()> {
        fs::write(&self.path, value.to_string())
    }
}
