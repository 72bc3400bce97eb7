//! DICOM header timestamp extraction.
//!
//! The pipeline needs exactly one thing from a DICOM file: its study
//! date/time pair. Everything else about the format stays behind
//! [`TimestampSource`], so the scanner and the tests never touch the wire
//! format directly.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use dicom::core::Tag;
use dicom::dictionary_std::tags;
use dicom::object::{open_file, DefaultDicomObject};

use crate::error::{ArchiveError, ArchiveResult};

/// A Part 10 DICOM file opens with a 128-byte preamble followed by `DICM`.
const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// Resolves a per-file timestamp, or classifies the file as unstructured.
///
/// `Ok(None)` means the file is not DICOM at all; that outcome is expected
/// and never surfaced to the user. A recognized DICOM file whose required
/// StudyDate/StudyTime fields are missing or unusable is a fatal
/// [`ArchiveError::MalformedTimestamp`].
pub trait TimestampSource {
    fn resolve(&self, path: &Path) -> ArchiveResult<Option<NaiveDateTime>>;
}

/// Production timestamp source backed by dicom-rs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DicomTimestampSource;

impl TimestampSource for DicomTimestampSource {
    fn resolve(&self, path: &Path) -> ArchiveResult<Option<NaiveDateTime>> {
        if !has_dicom_preamble(path)? {
            return Ok(None);
        }
        let obj = open_file(path)
            .map_err(|e| ArchiveError::malformed(path, format!("unreadable dataset: {e}")))?;
        let date = element_str(&obj, path, tags::STUDY_DATE, "StudyDate")?;
        let time = element_str(&obj, path, tags::STUDY_TIME, "StudyTime")?;
        combine(path, date.trim(), time.trim()).map(Some)
    }
}

/// Cheap format sniff: files shorter than the preamble or without the magic
/// are unstructured, not errors.
fn has_dicom_preamble(path: &Path) -> ArchiveResult<bool> {
    let mut file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
    let mut head = [0u8; PREAMBLE_LEN + MAGIC.len()];
    match file.read_exact(&mut head) {
        Ok(()) => Ok(&head[PREAMBLE_LEN..] == &MAGIC[..]),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(ArchiveError::io(path, e)),
    }
}

fn element_str(
    obj: &DefaultDicomObject,
    path: &Path,
    tag: Tag,
    name: &str,
) -> ArchiveResult<String> {
    let element = obj
        .element(tag)
        .map_err(|_| ArchiveError::malformed(path, format!("missing required field {name}")))?;
    let value = element
        .to_str()
        .map_err(|e| ArchiveError::malformed(path, format!("unusable {name}: {e}")))?;
    Ok(value.into_owned())
}

/// DICOM DA is `YYYYMMDD`; TM is `HHMMSS` with an optional fractional part,
/// which carries no meaning for archive mtimes and is dropped.
fn combine(path: &Path, date: &str, time: &str) -> ArchiveResult<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date, "%Y%m%d")
        .map_err(|e| ArchiveError::malformed(path, format!("bad StudyDate {date:?}: {e}")))?;
    let time = time.split('.').next().unwrap_or(time);
    let time = NaiveTime::parse_from_str(time, "%H%M%S")
        .map_err(|e| ArchiveError::malformed(path, format!("bad StudyTime {time:?}: {e}")))?;
    Ok(NaiveDateTime::new(date, time))
}
