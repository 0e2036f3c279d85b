use crate::error::Result;
use crate::extract::ExtractOptions;
use crate::render::{Layout, render_transcript};
use crate::source::LineSource;

/// Reads the whole source before rendering, so a fetch error never leaves a
/// half-printed transcript behind.
pub fn render_source(source: &dyn LineSource, options: &ExtractOptions) -> Result<String> {
    let lines = source.read_lines()?;
    Ok(render_transcript(
        &lines,
        &source.title(),
        Layout::default(),
        options,
    ))
}
