use crate::error::Result;

pub mod database;
pub mod file;

/// Somewhere raw conversation lines come from, read in one go.
pub trait LineSource {
    fn read_lines(&self) -> Result<Vec<String>>;

    /// Shown in the transcript banner.
    fn title(&self) -> String;
}
