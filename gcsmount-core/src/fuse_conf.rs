//! Enables `user_allow_other` in fuse.conf so `-o allow_other` mounts work

use regex::Regex;
use std::fs;
use std::path::Path;

use crate::error::SetupError;

lazy_static::lazy_static! {
    static ref COMMENTED_FLAG: Regex =
        Regex::new(r"(?m)^([ \t]*)#[ \t]*(user_allow_other)[ \t]*$").unwrap();
    static ref ENABLED_FLAG: Regex = Regex::new(r"(?m)^[ \t]*user_allow_other[ \t]*$").unwrap();
}

/// What the patcher did to fuse.conf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuseConfPatch {
    /// The commented flag was uncommented
    Enabled,
    /// The flag was already active; the file was left alone
    AlreadyEnabled,
}

/// Uncomment `user_allow_other` in `contents`.
///
/// Returns `None` when the text has neither the commented nor the active form.
pub fn patch_contents(contents: &str) -> Option<(String, FuseConfPatch)> {
    if ENABLED_FLAG.is_match(contents) {
        return Some((contents.to_string(), FuseConfPatch::AlreadyEnabled));
    }
    if COMMENTED_FLAG.is_match(contents) {
        let patched = COMMENTED_FLAG.replace(contents, "${1}${2}").into_owned();
        return Some((patched, FuseConfPatch::Enabled));
    }
    None
}

/// Whether the flag is active in the file at `path`
pub fn is_enabled(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|contents| ENABLED_FLAG.is_match(&contents))
        .unwrap_or(false)
}

/// Enable `user_allow_other` in the fuse.conf at `path`, in place
pub fn enable_allow_other(path: &Path) -> Result<FuseConfPatch, SetupError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| SetupError::io(format!("Failed to read {}", path.display()), e))?;

    let (patched, outcome) = patch_contents(&contents).ok_or_else(|| {
        SetupError::FuseFlagMissing {
            path: path.to_path_buf(),
        }
    })?;

    match outcome {
        FuseConfPatch::Enabled => {
            fs::write(path, patched)
                .map_err(|e| SetupError::io(format!("Failed to write {}", path.display()), e))?;
            log::info!("Enabled user_allow_other in {}", path.display());
        }
        FuseConfPatch::AlreadyEnabled => {
            log::info!("user_allow_other already enabled in {}", path.display());
        }
    }

    Ok(outcome)
}
