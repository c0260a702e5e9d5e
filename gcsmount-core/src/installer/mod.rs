//! gcsfuse package installation
//!
//! One installer per supported OS family:
//! - apt (Ubuntu, Debian)
//! - yum (RHEL, CentOS, Fedora)

pub mod apt;
pub mod yum;

use std::fs;
use std::path::Path;

use crate::command::CommandRunner;
use crate::error::SetupError;
use crate::os_release::OsFamily;

/// Name of the adapter package and binary
pub const PACKAGE: &str = "gcsfuse";

/// Install gcsfuse with the installer matching `family`
pub fn install<R: CommandRunner + ?Sized>(
    family: OsFamily,
    runner: &mut R,
    apt_source_list: &Path,
    yum_repo: &Path,
) -> Result<(), SetupError> {
    log::info!("Installing {} for {}", PACKAGE, family);
    match family {
        OsFamily::Debian => apt::install(runner, apt_source_list),
        OsFamily::Rhel => yum::install(runner, yum_repo),
    }
}

/// Write a package-source descriptor, creating its directory if needed
pub(crate) fn write_source_file(path: &Path, contents: &str) -> Result<(), SetupError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SetupError::io(format!("Failed to create {}", parent.display()), e)
        })?;
    }
    fs::write(path, contents)
        .map_err(|e| SetupError::io(format!("Failed to write {}", path.display()), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).map_err(|e| {
            SetupError::io(format!("Failed to set permissions on {}", path.display()), e)
        })?;
    }

    log::info!("Wrote {}", path.display());
    Ok(())
}
