//! Unified exit codes for the dicomtar CLI.
//! These codes are part of the scripting contract; keep them stable.

use dicomtar_core::ArchiveError;

pub const SUCCESS: i32 = 0;
pub const IO_ERROR: i32 = 1; // Read/write failure during scan, compose, or stamp
pub const INTERNAL_ERROR: i32 = 2; // Naming-contract violation or CLI setup failure
pub const DEST_EXISTS: i32 = 3; // Destination archive already present
pub const BAD_TIMESTAMP: i32 = 4; // DICOM file with unusable StudyDate/StudyTime

/// Exit code for a pipeline failure.
pub fn for_error(err: &ArchiveError) -> i32 {
    match err {
        ArchiveError::Io { .. } => IO_ERROR,
        ArchiveError::ConsistencyViolation { .. } => INTERNAL_ERROR,
        ArchiveError::AlreadyExists { .. } => DEST_EXISTS,
        ArchiveError::MalformedTimestamp { .. } => BAD_TIMESTAMP,
    }
}
