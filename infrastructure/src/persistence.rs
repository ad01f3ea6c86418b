//! Document input and result persistence
//!
//! Thin file-system collaborators around a run: reading input documents,
//! discovering them by glob, and saving converted output and run logs under
//! timestamped names.

use chrono::{DateTime, Local};
use glob::glob;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use udc_domain::RunLog;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("could not serialize run log: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a text document, replacing invalid UTF-8
pub fn read_input_document(path: &Path) -> Result<String, PersistenceError> {
    let bytes = fs::read(path).map_err(io_error(path))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    debug!(path = %path.display(), bytes = bytes.len(), "Read input document");
    Ok(text)
}

/// Files in `folder` matching `pattern` (e.g. `*.csv`), sorted
///
/// Unreadable entries are skipped with a warning; directories are ignored.
pub fn discover_documents(folder: &Path, pattern: &str) -> Result<Vec<PathBuf>, PersistenceError> {
    let full_pattern = folder.join(pattern).to_string_lossy().into_owned();
    let entries = glob(&full_pattern).map_err(|source| PersistenceError::Pattern {
        pattern: full_pattern.clone(),
        source,
    })?;

    let mut documents: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    documents.sort();

    info!(pattern = %full_pattern, count = documents.len(), "Discovered input documents");
    Ok(documents)
}

fn stem(source_path: &Path) -> String {
    source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Write `contents` to a new `<base>.<extension>` in `folder`
///
/// Existing files are never overwritten: a taken name gets a `_1`, `_2`, ...
/// suffix, so documents sharing a stem within the same second all keep their
/// results.
fn write_new_file(
    folder: &Path,
    base: &str,
    extension: &str,
    contents: &str,
) -> Result<PathBuf, PersistenceError> {
    fs::create_dir_all(folder).map_err(io_error(folder))?;
    let extension = extension.trim_start_matches('.');

    let mut suffix = 0u32;
    loop {
        let filename = match suffix {
            0 => format!("{base}.{extension}"),
            n => format!("{base}_{n}.{extension}"),
        };
        let path = folder.join(filename);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents.as_bytes()).map_err(io_error(&path))?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(io_error(&path)(e)),
        }
    }
}

/// Save converted output as `<stem>-<YYYYMMDD-HHMMSS>.<extension>`
///
/// A name already taken gets a numeric suffix.
pub fn save_output(
    folder: &Path,
    extension: &str,
    source_path: &Path,
    text: &str,
) -> Result<PathBuf, PersistenceError> {
    save_output_at(folder, extension, source_path, text, Local::now())
}

fn save_output_at(
    folder: &Path,
    extension: &str,
    source_path: &Path,
    text: &str,
    now: DateTime<Local>,
) -> Result<PathBuf, PersistenceError> {
    let base = format!("{}-{}", stem(source_path), now.format("%Y%m%d-%H%M%S"));
    let path = write_new_file(folder, &base, extension, text)?;

    info!(path = %path.display(), "Saved converted output");
    Ok(path)
}

/// Save a run log as pretty JSON named `<YYYYMMDD_HHMMSS>_<stem>.<extension>`
///
/// A name already taken gets a numeric suffix.
pub fn save_run_log(
    folder: &Path,
    extension: &str,
    source_path: &Path,
    log: &RunLog,
) -> Result<PathBuf, PersistenceError> {
    save_run_log_at(folder, extension, source_path, log, Local::now())
}

fn save_run_log_at(
    folder: &Path,
    extension: &str,
    source_path: &Path,
    log: &RunLog,
    now: DateTime<Local>,
) -> Result<PathBuf, PersistenceError> {
    let base = format!("{}_{}", now.format("%Y%m%d_%H%M%S"), stem(source_path));
    let path = write_new_file(folder, &base, extension, &serde_json::to_string_pretty(log)?)?;

    info!(path = %path.display(), entries = log.len(), "Saved run log");
    Ok(path)
}
