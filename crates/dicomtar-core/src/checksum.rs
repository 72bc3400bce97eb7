//! MD5 integrity stamps for finished archives.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use crate::error::{ArchiveError, ArchiveResult};

/// Suffix appended to the archive path to name the sidecar.
pub const SIDECAR_SUFFIX: &str = ".md5sum";

/// Read chunk size; a multiple of MD5's 64-byte block keeps the incremental
/// digest updates aligned.
const CHUNK: usize = 32 * 1024;

/// Hex MD5 of a file's full contents, computed incrementally.
pub fn md5_hex(path: &Path) -> ArchiveResult<String> {
    let mut file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveError::io(path, e)),
        }
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Write `<hex digest>  <archive file name>` to `<archive>.md5sum`.
///
/// The two-space separator is the conventional checksum-manifest format;
/// `md5sum -c` consumes the sidecar as-is. Runs only after the archive has
/// been fully written.
pub fn write_md5_sidecar(archive: &Path) -> ArchiveResult<PathBuf> {
    let digest = md5_hex(archive)?;
    let name = archive
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            ArchiveError::consistency(format!(
                "archive path {} has no file name",
                archive.display()
            ))
        })?;

    let sidecar = sidecar_path(archive);
    let mut out = File::create(&sidecar).map_err(|e| ArchiveError::io(&sidecar, e))?;
    writeln!(out, "{digest}  {name}").map_err(|e| ArchiveError::io(&sidecar, e))?;
    Ok(sidecar)
}

fn sidecar_path(archive: &Path) -> PathBuf {
    let mut os = archive.as_os_str().to_os_string();
    os.push(SIDECAR_SUFFIX);
    PathBuf::from(os)
}
