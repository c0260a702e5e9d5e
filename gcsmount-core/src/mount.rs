use std::fs;
use std::path::Path;

use crate::command::{run_checked, CommandRunner, Invocation};
use crate::error::SetupError;
use crate::installer::PACKAGE;

/// Filesystem type recorded in fstab
pub const FSTAB_TYPE: &str = "gcsfuse";

/// Options shared by the live mount and its fstab entry.
///
/// Modes are stored as numbers and rendered in octal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptions {
    /// Infer directories from object prefixes
    pub implicit_dirs: bool,
    pub uid: u32,
    pub gid: u32,
    pub file_mode: u32,
    pub dir_mode: u32,
    /// Let users other than the mounter access the mount
    pub allow_other: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            implicit_dirs: true,
            uid: 0,
            gid: 0,
            file_mode: 0o777,
            dir_mode: 0o777,
            allow_other: true,
        }
    }
}

impl MountOptions {
    /// gcsfuse command-line flags, e.g. `--implicit-dirs --uid=0 ... -o allow_other`
    pub fn cli_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.implicit_dirs {
            args.push("--implicit-dirs".to_string());
        }
        args.push(format!("--uid={}", self.uid));
        args.push(format!("--gid={}", self.gid));
        args.push(format!("--file-mode={:o}", self.file_mode));
        args.push(format!("--dir-mode={:o}", self.dir_mode));
        if self.allow_other {
            args.push("-o".to_string());
            args.push("allow_other".to_string());
        }
        args
    }

    /// fstab option field, e.g. `rw,implicit_dirs,uid=0,...,allow_other,_netdev`
    pub fn fstab_options(&self) -> String {
        let mut opts = vec!["rw".to_string()];
        if self.implicit_dirs {
            opts.push("implicit_dirs".to_string());
        }
        opts.push(format!("uid={}", self.uid));
        opts.push(format!("gid={}", self.gid));
        opts.push(format!("file_mode={:o}", self.file_mode));
        opts.push(format!("dir_mode={:o}", self.dir_mode));
        if self.allow_other {
            opts.push("allow_other".to_string());
        }
        // Wait for the network before mounting at boot
        opts.push("_netdev".to_string());
        opts.join(",")
    }
}

/// Build the gcsfuse invocation for `bucket` on `mount_point`
pub fn mount_invocation(bucket: &str, mount_point: &Path, options: &MountOptions) -> Invocation {
    let mut args = options.cli_args();
    args.push(bucket.to_string());
    args.push(mount_point.display().to_string());
    Invocation::new(PACKAGE, args).streamed()
}

/// Mount the bucket; a non-zero gcsfuse exit is returned as an error
pub fn mount_bucket<R: CommandRunner + ?Sized>(
    runner: &mut R,
    bucket: &str,
    mount_point: &Path,
    options: &MountOptions,
) -> Result<(), SetupError> {
    run_checked(runner, &mount_invocation(bucket, mount_point, options))?;
    log::info!("Mounted gs://{} at {}", bucket, mount_point.display());
    Ok(())
}

/// Create the mount directory and give it to root:root with mode 755.
///
/// An existing directory is reused; whether something is already mounted
/// there is not checked.
pub fn prepare_mount_dir<R: CommandRunner + ?Sized>(
    runner: &mut R,
    mount_point: &Path,
) -> Result<(), SetupError> {
    fs::create_dir_all(mount_point).map_err(|e| {
        SetupError::io(format!("Failed to create {}", mount_point.display()), e)
    })?;

    run_checked(
        runner,
        &Invocation::new(
            "chown",
            ["root:root".to_string(), mount_point.display().to_string()],
        ),
    )?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(mount_point, fs::Permissions::from_mode(0o755)).map_err(|e| {
            SetupError::io(
                format!("Failed to set permissions on {}", mount_point.display()),
                e,
            )
        })?;
    }

    log::info!("Prepared mount directory {}", mount_point.display());
    Ok(())
}
