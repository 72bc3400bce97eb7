//! Error types for the archive pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that abort the archive pipeline.
///
/// A file that is simply not DICOM is never an error: the resolver reports
/// it as `Ok(None)` and the scanner keeps going. Every variant here is
/// fatal for the whole run.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Destination archive path already present. Raised before anything is
    /// written; the existing file is left untouched.
    #[error("destination already exists: {}", .path.display())]
    AlreadyExists { path: PathBuf },

    /// A recognized DICOM file is missing its required StudyDate/StudyTime
    /// fields, or carries values that do not parse.
    #[error("malformed DICOM timestamp in {}: {reason}", .path.display())]
    MalformedTimestamp { path: PathBuf, reason: String },

    /// Internal naming-contract breach (e.g. a destination that does not
    /// carry the required archive suffix). A caller bug, not a user error.
    #[error("consistency violation: {message}")]
    ConsistencyViolation { message: String },

    /// Read or write failure during scan, compose, or stamp.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// I/O failure at a known path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Unusable required timestamp fields in a recognized DICOM file.
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Internal contract breach.
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::ConsistencyViolation {
            message: message.into(),
        }
    }

    /// Returns true if the destination archive was already present.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Suggested exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } => 1,
            Self::ConsistencyViolation { .. } => 2,
            Self::AlreadyExists { .. } => 3,
            Self::MalformedTimestamp { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            ArchiveError::io("/x", std::io::Error::other("boom")),
            ArchiveError::consistency("bad name"),
            ArchiveError::AlreadyExists { path: "/x".into() },
            ArchiveError::malformed("/x", "no StudyDate"),
        ];
        let mut codes: Vec<i32> = errors.iter().map(ArchiveError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn already_exists_predicate() {
        let err = ArchiveError::AlreadyExists { path: "/a/b".into() };
        assert!(err.is_already_exists());
        assert!(!ArchiveError::consistency("x").is_already_exists());
    }
}
