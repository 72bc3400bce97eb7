//! End-to-end archive pipeline.
//!
//! Strictly sequential: the default timestamp needs the whole scan, and the
//! integrity stamp digests the finished archive, so no stage starts before
//! its predecessor completes. Any fatal error aborts the remaining stages.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use filetime::FileTime;
use tracing::info;

use crate::checksum::write_md5_sidecar;
use crate::compose::{compose, ARCHIVE_SUFFIX};
use crate::dicom::TimestampSource;
use crate::error::{ArchiveError, ArchiveResult};
use crate::scan::{default_timestamp, scan};

/// What a finished run produced; the CLI reports from this.
#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    pub archive: PathBuf,
    pub sidecar: PathBuf,
    pub entries: usize,
    pub dicom_entries: usize,
    pub default_ts: NaiveDateTime,
}

/// Destination path for a study visit: `<base>/<study>/<visit>_dicom.tar`.
///
/// Identifier uniqueness (study across the tree, visit within the study) is
/// the caller's contract; the pipeline only enforces the existence check.
pub fn dest_path(output_base: &Path, study_id: &str, visit_id: &str) -> PathBuf {
    output_base
        .join(study_id)
        .join(format!("{visit_id}{ARCHIVE_SUFFIX}"))
}

/// Run the full pipeline: scan, select the default timestamp, compose the
/// archive, stamp it.
pub fn build_archive<S: TimestampSource>(
    input_dir: &Path,
    dest: &Path,
    source: &S,
) -> ArchiveResult<ArchiveSummary> {
    info!(input = %input_dir.display(), dest = %dest.display(), "scanning");
    let entries = scan(input_dir, source)?;
    let dicom_entries = entries.values().filter(|t| t.is_some()).count();
    let default_ts = default_timestamp(&entries);
    info!(
        entries = entries.len(),
        dicom = dicom_entries,
        default_ts = %default_ts,
        "composing"
    );

    compose(dest, input_dir, &entries, default_ts)?;

    // The archive file's own mtime is part of the external contract;
    // consumers key off it. Access time is left to the platform.
    let mtime = FileTime::from_unix_time(default_ts.and_utc().timestamp(), 0);
    filetime::set_file_mtime(dest, mtime).map_err(|e| ArchiveError::io(dest, e))?;

    let sidecar = write_md5_sidecar(dest)?;
    info!(archive = %dest.display(), sidecar = %sidecar.display(), "done");

    Ok(ArchiveSummary {
        archive: dest.to_path_buf(),
        sidecar,
        entries: entries.len(),
        dicom_entries,
        default_ts,
    })
}
