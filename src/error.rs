use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors, raised only at the caller boundary (input files, config, dates)
#[derive(Debug, Error)]
pub enum RaceCardError {
    #[error("Invalid meeting date '{0}': expected YYYY-MM-DD")]
    InvalidMeetingDate(String),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid parser config: {0}")]
    InvalidConfig(String),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document {0:?} contains no pages")]
    NoPages(PathBuf),
}

/// Non-fatal extraction outcomes.
///
/// These never cross a record boundary: the extractor that hits one logs it
/// and leaves the field empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractIssue {
    /// A line or block matches no recognized pattern
    #[error("structural mismatch in {context}: {line:?}")]
    StructuralMismatch { context: &'static str, line: String },

    /// A pattern matched but one of its groups was empty
    #[error("partial data for {field}")]
    PartialData { field: &'static str },

    /// A captured substring did not parse as a number
    #[error("cannot convert {raw:?} for {field}")]
    NumericConversion { field: &'static str, raw: String },
}

impl ExtractIssue {
    pub fn mismatch(context: &'static str, line: &str) -> Self {
        ExtractIssue::StructuralMismatch {
            context,
            line: line.to_string(),
        }
    }
}

/// Validate a reference year pair from config
pub fn validate_years(current: u16, previous: u16) -> Result<(), String> {
    if current == previous {
        return Err(format!(
            "Reference years must differ, got {} twice",
            current
        ));
    }
    if !(1900..=2100).contains(&current) || !(1900..=2100).contains(&previous) {
        return Err(format!(
            "Reference years out of range: {}/{}",
            current, previous
        ));
    }
    Ok(())
}
