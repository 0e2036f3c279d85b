use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{ConvoError, Result};
use crate::source::LineSource;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LineSource for FileSource {
    fn read_lines(&self) -> Result<Vec<String>> {
        let content = fs::read_to_string(&self.path).map_err(|source| ConvoError::Io {
            path: self.path.clone(),
            source,
        })?;

        let lines = content
            .lines()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        debug!(path = %self.path.display(), lines = lines.len(), "read conversation file");

        Ok(lines)
    }

    fn title(&self) -> String {
        self.path.display().to_string()
    }
}
