//! File-based frame source.
//!
//! Replays a recording of newline-delimited JSON frames, one frame per poll.

use std::fs;
use std::path::{Path, PathBuf};

use framewatch_types::FrameSample;

use super::FrameSource;
use crate::error::Result;

/// A frame source that replays a JSON-lines recording.
///
/// Each non-blank line is one serialized [`FrameSample`]. The file is read on
/// the first poll; afterwards each poll yields the next frame until the
/// recording is exhausted. Lines that fail to parse are skipped and reported
/// through [`FrameSource::error`].
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    lines: Option<Vec<String>>,
    cursor: usize,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            lines: None,
            cursor: 0,
        }
    }

    /// Returns the path being replayed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether every line of the recording has been consumed.
    pub fn is_finished(&self) -> bool {
        match &self.lines {
            Some(lines) => self.cursor >= lines.len(),
            None => false,
        }
    }

    /// Read a whole recording at once, failing on the first bad line.
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<FrameSample>> {
        let content = fs::read_to_string(path)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| -> Result<FrameSample> { Ok(serde_json::from_str(line)?) })
            .collect()
    }

    fn load(&mut self) -> bool {
        if self.lines.is_some() {
            return true;
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let lines: Vec<String> = content
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_owned)
                    .collect();
                tracing::debug!(path = %self.path.display(), frames = lines.len(), "Loaded recording");
                self.lines = Some(lines);
                true
            }
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                false
            }
        }
    }
}

impl FrameSource for FileSource {
    fn poll(&mut self) -> Option<FrameSample> {
        if !self.load() {
            return None;
        }
        let line = self.lines.as_ref()?.get(self.cursor)?;
        let line_number = self.cursor + 1;
        self.cursor += 1;

        match serde_json::from_str(line) {
            Ok(frame) => {
                self.last_error = None;
                Some(frame)
            }
            Err(e) => {
                tracing::warn!(line = line_number, error = %e, "Skipping malformed frame");
                self.last_error = Some(format!("Parse error on line {}: {}", line_number, e));
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
