//! dicomtar-core
//!
//! Reproducible archives for DICOM study visits:
//! - Per-file timestamp resolution from DICOM headers (StudyDate + StudyTime)
//! - Deterministic directory scanning
//! - Order-stable tar composition with normalized entry metadata
//! - MD5 integrity stamp sidecars

pub mod checksum;
pub mod compose;
pub mod dicom;
pub mod error;
pub mod pipeline;
pub mod scan;

// Convenience re-exports
pub use checksum::{md5_hex, write_md5_sidecar, SIDECAR_SUFFIX};
pub use compose::{archive_member_root, compose, ARCHIVE_SUFFIX};
pub use dicom::{DicomTimestampSource, TimestampSource};
pub use error::{ArchiveError, ArchiveResult};
pub use pipeline::{build_archive, dest_path, ArchiveSummary};
pub use scan::{default_timestamp, epoch, scan, ScanMap};
