//! Deterministic tar composition.
//!
//! Entries are written in path order with normalized metadata, so the
//! archive bytes are a pure function of the input tree and the destination
//! name. The tar is uncompressed; content is streamed, never buffered
//! whole.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tar::{Builder, Header};

use crate::error::{ArchiveError, ArchiveResult};
use crate::scan::ScanMap;

/// Required destination suffix: `<base>/<study>/<visit>_dicom.tar`.
pub const ARCHIVE_SUFFIX: &str = "_dicom.tar";

const ENTRY_MODE: u32 = 0o644;
const OWNER: &str = "root";

/// Derive the archive's single top-level directory name from the
/// destination's last two path components:
/// `<base>/study1/visit1_dicom.tar` -> `study1_visit1`.
///
/// The suffix requirement is a caller contract; violating it is a bug in
/// the invoking code, not a user error.
pub fn archive_member_root(dest: &Path) -> ArchiveResult<String> {
    let file = dest.file_name().and_then(|s| s.to_str());
    let study = dest
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str());
    let (Some(file), Some(study)) = (file, study) else {
        return Err(ArchiveError::consistency(format!(
            "destination {} lacks study/visit path components",
            dest.display()
        )));
    };
    match format!("{study}_{file}").strip_suffix(ARCHIVE_SUFFIX) {
        Some(name) => Ok(name.to_string()),
        None => Err(ArchiveError::consistency(format!(
            "destination {} does not end in {ARCHIVE_SUFFIX}",
            dest.display()
        ))),
    }
}

/// Serialize `entries` into an uncompressed tar at `dest`.
///
/// Fails with [`ArchiveError::AlreadyExists`] before touching the
/// filesystem if `dest` is present; otherwise parent directories are
/// created as needed. The archive is written to a sibling temp path and
/// renamed into place, so a failed run leaves nothing at `dest`.
pub fn compose(
    dest: &Path,
    root: &Path,
    entries: &ScanMap,
    default_ts: NaiveDateTime,
) -> ArchiveResult<()> {
    if dest.exists() {
        return Err(ArchiveError::AlreadyExists {
            path: dest.to_path_buf(),
        });
    }
    let member_root = archive_member_root(dest)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
    }

    let tmp = tmp_path(dest);
    match write_entries(&tmp, root, &member_root, entries, default_ts) {
        Ok(()) => fs::rename(&tmp, dest).map_err(|e| ArchiveError::io(dest, e)),
        Err(e) => {
            let _ = fs::remove_file(&tmp); // best effort; the write error wins
            Err(e)
        }
    }
}

fn tmp_path(dest: &Path) -> PathBuf {
    let mut os = dest.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

fn write_entries(
    tmp: &Path,
    root: &Path,
    member_root: &str,
    entries: &ScanMap,
    default_ts: NaiveDateTime,
) -> ArchiveResult<()> {
    let file = File::create(tmp).map_err(|e| ArchiveError::io(tmp, e))?;
    let mut tar = Builder::new(file);
    tar.mode(tar::HeaderMode::Deterministic);

    for (path, &timestamp) in entries {
        let rel = path.strip_prefix(root).map_err(|_| {
            ArchiveError::consistency(format!(
                "scanned path {} escapes root {}",
                path.display(),
                root.display()
            ))
        })?;
        let mtime = timestamp.unwrap_or(default_ts);
        append_file(&mut tar, path, &Path::new(member_root).join(rel), mtime)?;
    }

    let file = tar.into_inner().map_err(|e| ArchiveError::io(tmp, e))?;
    file.sync_all().map_err(|e| ArchiveError::io(tmp, e))?;
    Ok(())
}

fn append_file(
    tar: &mut Builder<File>,
    src: &Path,
    archive_path: &Path,
    mtime: NaiveDateTime,
) -> ArchiveResult<()> {
    let mut file = File::open(src).map_err(|e| ArchiveError::io(src, e))?;
    let meta = file.metadata().map_err(|e| ArchiveError::io(src, e))?;

    let mut header = Header::new_gnu();
    header.set_size(meta.len());
    header.set_mode(ENTRY_MODE);
    header.set_uid(0);
    header.set_gid(0);
    // The tar mtime field is unsigned; pre-epoch study dates clamp to 0.
    header.set_mtime(mtime.and_utc().timestamp().max(0) as u64);
    header
        .set_username(OWNER)
        .map_err(|e| ArchiveError::io(src, e))?;
    header
        .set_groupname(OWNER)
        .map_err(|e| ArchiveError::io(src, e))?;

    // append_data sets the entry path (with GNU long-name records when
    // needed) and the header checksum, then streams the content.
    tar.append_data(&mut header, archive_path, &mut file)
        .map_err(|e| ArchiveError::io(src, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::epoch;

    #[test]
    fn member_root_from_last_two_components() {
        let dest = Path::new("/out/study1/visit1_dicom.tar");
        assert_eq!(archive_member_root(dest).unwrap(), "study1_visit1");
    }

    #[test]
    fn member_root_requires_suffix() {
        let err = archive_member_root(Path::new("/out/study1/visit1.tar")).unwrap_err();
        assert!(matches!(err, ArchiveError::ConsistencyViolation { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn refuses_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("study1").join("visit1_dicom.tar");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, b"do not clobber").unwrap();

        let err = compose(&dest, dir.path(), &ScanMap::new(), epoch()).unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(fs::read(&dest).unwrap(), b"do not clobber");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("a.txt"), b"a").unwrap();

        let mut entries = ScanMap::new();
        entries.insert(input.join("a.txt"), None);

        let dest = dir.path().join("out/study1/visit1_dicom.tar");
        compose(&dest, &input, &entries, epoch()).unwrap();
        assert!(dest.is_file());
        assert!(!tmp_path(&dest).exists());
    }

    #[test]
    fn entry_outside_root_is_a_contract_breach() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        let stray = dir.path().join("stray.txt");
        fs::write(&stray, b"x").unwrap();

        let mut entries = ScanMap::new();
        entries.insert(stray, None);

        let dest = dir.path().join("out/study1/visit1_dicom.tar");
        let err = compose(&dest, &input, &entries, epoch()).unwrap_err();
        assert!(matches!(err, ArchiveError::ConsistencyViolation { .. }));
        assert!(!dest.exists());
    }
}
