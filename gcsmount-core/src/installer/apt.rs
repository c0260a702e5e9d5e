//! APT installation (Ubuntu, Debian)

use std::path::Path;

use super::{write_source_file, PACKAGE};
use crate::command::{run_checked, CommandRunner, Invocation};
use crate::error::SetupError;

pub const APT_REPO_BASE: &str = "https://packages.cloud.google.com/apt";
pub const APT_KEY_URL: &str = "https://packages.cloud.google.com/apt/doc/apt-key.gpg";

const PREREQUISITES: &[&str] = &["curl", "gnupg", "lsb-release"];

/// Source-list line for the distribution `codename`
pub fn source_line(codename: &str) -> String {
    format!("deb {} gcsfuse-{} main", APT_REPO_BASE, codename)
}

/// Codename of the running distribution, as reported by `lsb_release -c -s`
pub fn distribution_codename<R: CommandRunner + ?Sized>(
    runner: &mut R,
) -> Result<String, SetupError> {
    let output = run_checked(runner, &Invocation::new("lsb_release", ["-c", "-s"]))?;
    let codename = output.stdout_text().trim().to_string();
    if codename.is_empty() {
        return Err(SetupError::EmptyCodename);
    }
    Ok(codename)
}

/// Installs gcsfuse via apt-get
///
/// Adds the gcsfuse source for the running distribution's codename and
/// registers its signing key before installing.
pub fn install<R: CommandRunner + ?Sized>(
    runner: &mut R,
    source_list: &Path,
) -> Result<(), SetupError> {
    run_checked(runner, &Invocation::new("apt-get", ["update"]).streamed())?;

    let mut prereq_args = vec!["install", "-y"];
    prereq_args.extend_from_slice(PREREQUISITES);
    run_checked(runner, &Invocation::new("apt-get", prereq_args).streamed())?;

    let codename = distribution_codename(runner)?;
    log::info!("Distribution codename: {}", codename);

    write_source_file(source_list, &format!("{}\n", source_line(&codename)))?;

    let key = run_checked(runner, &Invocation::new("curl", ["-fsSL", APT_KEY_URL]))?;
    run_checked(
        runner,
        &Invocation::new("apt-key", ["add", "-"]).with_stdin(key.stdout),
    )?;

    run_checked(runner, &Invocation::new("apt-get", ["update"]).streamed())?;
    run_checked(
        runner,
        &Invocation::new("apt-get", ["install", "-y", PACKAGE]).streamed(),
    )?;

    Ok(())
}
