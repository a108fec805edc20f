//src/error.rs

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort one of the pipelines.
#[derive(Debug, Error)]
pub enum AnnotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Option combinations the CLI cannot run with (e.g. `--filter` without a list).
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("unknown taxonomic rank `{0}`; expected one of domain, kingdom, phylum, class, order, family, genus, species")]
    UnknownRank(String),

    #[error("not enough colours to support n = {requested} clades (palette holds {available}), please filter")]
    PaletteExhausted { requested: usize, available: usize },

    #[error("line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("line {line}: cannot parse `{value}` as a number")]
    InvalidNumber { line: usize, value: String },

    #[error("NOG {nog} refers to category `{category}` missing from the functions file")]
    UnknownCategory { nog: String, category: char },
}

impl AnnotError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        AnnotError::MalformedRow {
            line,
            reason: reason.into(),
        }
    }
}
