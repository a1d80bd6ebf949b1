use crate::error::Result;
use crate::types::{Cell, RawTable};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a CSV dataset from any reader. Every cell is kept as text (or
/// `Empty`); coercion is the normalizer's job.
pub fn read_table<R: Read>(source: &str, reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let width = headers.len();
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let mut row: Vec<Cell> = record
            .iter()
            .take(width)
            .map(|v| {
                if v.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(v.to_string())
                }
            })
            .collect();
        row.resize(width, Cell::Empty);
        rows.push(row);
    }

    log::debug!("read {} rows x {} columns from {}", rows.len(), width, source);
    Ok(RawTable {
        source: source.to_string(),
        headers,
        rows,
    })
}

pub fn load_table(path: &Path) -> Result<RawTable> {
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file = File::open(path)?;
    read_table(&source, file)
}
