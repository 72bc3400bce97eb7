//! Directory scanning and default-timestamp selection.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::dicom::TimestampSource;
use crate::error::{ArchiveError, ArchiveResult};

/// Scan output: absolute source path -> resolved timestamp, or `None` for
/// files that are not DICOM. The map's path ordering fixes the archive
/// entry order regardless of how the filesystem yields entries.
pub type ScanMap = BTreeMap<PathBuf, Option<NaiveDateTime>>;

/// Fixed fallback timestamp for inputs containing no DICOM timestamps.
pub fn epoch() -> NaiveDateTime {
    NaiveDateTime::new(
        NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch literal"),
        NaiveTime::from_hms_opt(0, 0, 0).expect("epoch literal"),
    )
}

/// Visit every regular file under `root` (hidden files included,
/// directories excluded) and resolve its timestamp.
///
/// A file that is not DICOM stays in the map with `None`; the scan never
/// stops early for that. Read failures and malformed DICOM timestamps
/// abort.
pub fn scan<S: TimestampSource>(root: &Path, source: &S) -> ArchiveResult<ScanMap> {
    let mut entries = ScanMap::new();
    scan_dir(root, source, &mut entries)?;
    debug!(total = entries.len(), "scan complete");
    Ok(entries)
}

fn scan_dir<S: TimestampSource>(dir: &Path, source: &S, out: &mut ScanMap) -> ArchiveResult<()> {
    for entry in fs::read_dir(dir).map_err(|e| ArchiveError::io(dir, e))? {
        let entry = entry.map_err(|e| ArchiveError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ArchiveError::io(&path, e))?;
        if file_type.is_dir() {
            scan_dir(&path, source, out)?;
        } else if path.is_file() {
            let timestamp = source.resolve(&path)?;
            debug!(path = %path.display(), dicom = timestamp.is_some(), "scanned");
            out.insert(path, timestamp);
        }
    }
    Ok(())
}

/// Latest timestamp across all DICOM files, or the epoch when none exist.
///
/// Untimestamped files inherit this value at composition time, so re-running
/// the build on identical input cannot change any entry's metadata.
pub fn default_timestamp(entries: &ScanMap) -> NaiveDateTime {
    entries
        .values()
        .filter_map(|t| *t)
        .max()
        .unwrap_or_else(epoch)
}
