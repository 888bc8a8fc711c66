use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum HkError {
    /// Rejected before scoring; no artifacts are produced.
    #[error("invalid input at `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// The stored chain does not match the recomputed one. The ledger is left untouched.
    #[error("ledger integrity check failed at entry {index} ({path}): {reason}")]
    LedgerIntegrity {
        path: PathBuf,
        index: usize,
        reason: String,
    },

    #[error("ledger line {line} in {path} is not a valid entry: {reason}")]
    LedgerParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("run folder already exists: {0} (pass --force or set general.overwrite_runs)")]
    RunExists(PathBuf),

    #[error("no *.json inputs found in {0}")]
    EmptyBatch(PathBuf),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

impl HkError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        HkError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HkError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type HkResult<T> = Result<T, HkError>;
