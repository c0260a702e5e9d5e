//! Persistent mount-table entry

use std::fmt;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::SetupError;
use crate::mount::{MountOptions, FSTAB_TYPE};

/// One line of the mount table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FstabEntry {
    pub device: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
    pub options: String,
    pub dump: u8,
    pub pass: u8,
}

impl FstabEntry {
    /// Entry mounting `bucket` on `mount_point` with `options` after the network is up
    pub fn for_bucket(bucket: &str, mount_point: &Path, options: &MountOptions) -> Self {
        Self {
            device: bucket.to_string(),
            mount_point: mount_point.to_path_buf(),
            fs_type: FSTAB_TYPE.to_string(),
            options: options.fstab_options(),
            dump: 0,
            pass: 0,
        }
    }
}

impl fmt::Display for FstabEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.device,
            self.mount_point.display(),
            self.fs_type,
            self.options,
            self.dump,
            self.pass
        )
    }
}

/// Result of [`persist`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FstabOutcome {
    Appended,
    AlreadyPresent,
}

/// Whether `contents` already holds `line` as a whole line, byte for byte
pub fn contains_line(contents: &str, line: &str) -> bool {
    contents.lines().any(|existing| existing == line)
}

/// Append `entry` to the fstab at `path` unless the identical line exists.
///
/// Matching is exact: the same mount with other whitespace or option order
/// counts as a different line. The file must already exist.
pub fn persist(path: &Path, entry: &FstabEntry) -> Result<FstabOutcome, SetupError> {
    let line = entry.to_string();

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .map_err(|e| SetupError::io(format!("Failed to open {}", path.display()), e))?;

    let mut contents = String::new();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_string(&mut contents))
        .map_err(|e| SetupError::io(format!("Failed to read {}", path.display()), e))?;

    if contains_line(&contents, &line) {
        log::info!("{} already contains the entry", path.display());
        return Ok(FstabOutcome::AlreadyPresent);
    }

    let mut addition = String::new();
    if !contents.is_empty() && !contents.ends_with('\n') {
        addition.push('\n');
    }
    addition.push_str(&line);
    addition.push('\n');

    file.write_all(addition.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| SetupError::io(format!("Failed to append to {}", path.display()), e))?;

    log::info!("Added to {}: {}", path.display(), line);
    Ok(FstabOutcome::Appended)
}

/// Whether the fstab at `path` holds `entry`; unreadable files count as no
pub fn is_persisted(path: &Path, entry: &FstabEntry) -> bool {
    std::fs::read_to_string(path)
        .map(|contents| contains_line(&contents, &entry.to_string()))
        .unwrap_or(false)
}
