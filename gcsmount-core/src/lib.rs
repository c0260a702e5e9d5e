use anyhow::Result;
use std::path::Path;

// Internal modules (private)
mod privilege;
mod run_log;
mod setup;
mod status;

// Step modules (public so callers can drive single steps)
pub mod command;
pub mod config;
pub mod error;
pub mod fstab;
pub mod fuse_conf;
pub mod installer;
pub mod mount;
pub mod os_release;
pub mod verify;

// Re-export public types
pub use command::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use config::{MountConfig, SystemPaths};
pub use error::SetupError;
pub use fstab::{FstabEntry, FstabOutcome};
pub use fuse_conf::FuseConfPatch;
pub use mount::MountOptions;
pub use os_release::{OsFamily, OsInfo};
pub use privilege::{effective_uid, require_root};
pub use run_log::RunLog;
pub use setup::{MountSetup, SetupReport};
pub use status::StatusCheck;
pub use verify::VerifyReport;

/// Print the read-only status table for `config`
pub fn check_status(config: &MountConfig) -> Vec<StatusCheck> {
    let checks = status::check_status(config, privilege::effective_uid());
    status::print_status(&checks);
    checks
}

/// Open a fresh run log in the temp directory, pruning old ones first.
///
/// Refuses to touch the temp directory unless `euid` is root.
pub fn open_run_log(euid: u32) -> Result<RunLog> {
    open_run_log_in(&std::env::temp_dir(), euid)
}

/// Open a fresh run log in `dir`, pruning old ones first
pub fn open_run_log_in(dir: &Path, euid: u32) -> Result<RunLog> {
    privilege::require_root(euid)?;
    if let Err(e) = RunLog::cleanup_old_logs_in(dir, run_log::DEFAULT_KEEP) {
        log::warn!("Failed to prune old run logs: {}", e);
    }
    RunLog::in_dir(dir).map_err(|e| anyhow::anyhow!(e))
}

/// Run the whole setup on this host with the system command runner
pub fn run_setup(config: MountConfig, log: Option<RunLog>) -> Result<SetupReport, SetupError> {
    let mut setup = MountSetup::new(config, SystemRunner::new(log));
    let report = setup.run();
    if let Some(log) = setup.runner().run_log() {
        match report {
            Ok(_) => log.info("Setup completed"),
            Err(ref e) => log.error(&e.to_string()),
        }
        log.finalize();
    }
    report
}
