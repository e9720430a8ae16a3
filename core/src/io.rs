//! Shared file I/O: the whitespace-tokenized line reader every subscribe-only
//! connector uses, and the timestamp-prefixed append writer every sink uses.

use crate::error::PipelineError;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Reads `path` and yields each line split into whitespace-separated fields, in file
/// order. A blank line yields an empty `Vec` rather than being skipped, so callers
/// see one entry per input line if they need to count records.
pub fn read_fields(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>, PipelineError> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .map(|line| {
            let line = line?;
            Ok(line.split_whitespace().map(str::to_owned).collect())
        })
        .collect()
}

/// Reads `path` and yields each line verbatim, in file order. Subscribe-only
/// connectors tokenize each line themselves (they need the raw text to report it in
/// a parse-error log line), so this is what `main` hands them, not [`read_fields`].
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, PipelineError> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    reader.lines().map(|line| Ok(line?)).collect()
}

/// Local-time timestamp in the `YYYYMMDD-HH:MM:SS:mmm` format every journal record
/// is prefixed with.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d-%H:%M:%S:%3f").to_string()
}

/// Appends one whitespace-joined, newline-terminated record to `path`, prefixed with
/// [`timestamp`]. The file is opened in append mode for each record, so a crash
/// mid-run loses nothing already flushed.
pub fn append_record(path: impl AsRef<Path>, fields: &[String]) -> Result<(), PipelineError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;
    write!(file, "{} ", timestamp())?;
    for field in fields {
        write!(file, "{field} ")?;
    }
    writeln!(file)?;
    Ok(())
}
