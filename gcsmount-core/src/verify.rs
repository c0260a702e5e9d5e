//! Best-effort post-mount checks. Nothing here can fail the setup.

use std::path::{Path, PathBuf};

use crate::command::{CommandRunner, Invocation};
use crate::installer::PACKAGE;

/// Console feedback gathered after mounting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Location of the gcsfuse binary, if found on PATH
    pub adapter_path: Option<PathBuf>,
    /// `df -h` lines mentioning the mount point
    pub disk_usage: Vec<String>,
    /// `mount` lines mentioning gcsfuse
    pub active_mounts: Vec<String>,
}

impl VerifyReport {
    /// True when the mount shows up in the active mount listing
    pub fn looks_mounted(&self) -> bool {
        !self.active_mounts.is_empty()
    }
}

/// Lines of `text` containing `needle`
pub fn filter_lines(text: &str, needle: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.contains(needle))
        .map(str::to_string)
        .collect()
}

fn lookup<R: CommandRunner + ?Sized>(runner: &mut R, inv: &Invocation, needle: &str) -> Vec<String> {
    match runner.run(inv) {
        Ok(output) if output.success() => filter_lines(&output.stdout_text(), needle),
        Ok(output) => {
            log::warn!(
                "Verification command `{}` exited with {:?}",
                inv,
                output.code
            );
            Vec::new()
        }
        Err(e) => {
            log::warn!("Verification command `{}` could not run: {}", inv, e);
            Vec::new()
        }
    }
}

/// Collect disk usage and active mount listings for `mount_point`
pub fn verify<R: CommandRunner + ?Sized>(runner: &mut R, mount_point: &Path) -> VerifyReport {
    let adapter_path = match which::which(PACKAGE) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("{} not found on PATH: {}", PACKAGE, e);
            None
        }
    };

    let mount_point = mount_point.display().to_string();
    let disk_usage = lookup(runner, &Invocation::new("df", ["-h"]), &mount_point);
    let active_mounts = lookup(
        runner,
        &Invocation::new("mount", Vec::<String>::new()),
        PACKAGE,
    );

    if active_mounts.is_empty() {
        log::warn!("No active {} mounts listed", PACKAGE);
    }

    VerifyReport {
        adapter_path,
        disk_usage,
        active_mounts,
    }
}
