//! Reading extracted race card text
//!
//! One document per file, pages separated by form feed (`\x0c`) as
//! `pdftotext` writes them.

use encoding_rs::WINDOWS_1252;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RaceCardError;

/// Page separator in extracted text
pub const PAGE_BREAK: char = '\x0c';

/// Read a document, falling back to Windows-1252 when it is not valid UTF-8
pub fn read_document(path: &Path) -> Result<String, RaceCardError> {
    let bytes = fs::read(path).map_err(|source| RaceCardError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            tracing::warn!("{:?} is not UTF-8, decoding as Windows-1252", path);
            let (decoded, _, _) = WINDOWS_1252.decode(err.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}

/// Lines of each page, in order
pub fn split_pages(text: &str) -> Vec<Vec<&str>> {
    text.split(PAGE_BREAK)
        .map(|page| page.lines().collect())
        .collect()
}

/// Text files under `input`: the file itself, or the `.txt` files of a
/// directory sorted by name
pub fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>, RaceCardError> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let entries = fs::read_dir(input).map_err(|source| RaceCardError::Io {
        path: input.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();
    Ok(files)
}
