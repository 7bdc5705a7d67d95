//! CSV export of qualifying papers.
//!
//! A new file gets a header row; an existing file is appended to without one.

use crate::error::Result;
use crate::models::QualifyingPaper;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rows logged at debug level after a save
const DEBUG_PREVIEW_ROWS: usize = 3;

/// What [`save_csv`] did with the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// File was created with a header row
    Created,
    /// Rows were appended to an existing file
    Appended,
    /// Nothing to write
    Skipped,
}

/// Write rows (optionally preceded by the header) to any writer
pub fn write_csv<W: Write>(writer: W, papers: &[QualifyingPaper], include_header: bool) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(include_header)
        .from_writer(writer);

    for paper in papers {
        wtr.serialize(paper)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Save papers to `path`, appending when the file already exists
pub fn save_csv(path: &Path, papers: &[QualifyingPaper]) -> Result<WriteMode> {
    if papers.is_empty() {
        warn!(path = ?path, "No relevant papers to save");
        return Ok(WriteMode::Skipped);
    }

    let mode = if path.exists() {
        let file = OpenOptions::new().append(true).open(path)?;
        write_csv(file, papers, false)?;
        WriteMode::Appended
    } else {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        write_csv(file, papers, true)?;
        WriteMode::Created
    };

    info!(path = ?path, rows = papers.len(), mode = ?mode, "Saved CSV");
    for paper in papers.iter().take(DEBUG_PREVIEW_ROWS) {
        debug!(row = ?paper, "Saved row");
    }

    Ok(mode)
}
