//! YUM installation (RHEL, CentOS, Fedora)

use std::path::Path;

use super::{write_source_file, PACKAGE};
use crate::command::{run_checked, CommandRunner, Invocation};
use crate::error::SetupError;

/// Static gcsfuse repository definition
pub const REPO_DEFINITION: &str = "[gcsfuse]
name=gcsfuse
baseurl=https://packages.cloud.google.com/yum/repos/gcsfuse-el$releasever-$basearch
enabled=1
gpgcheck=1
repo_gpgcheck=1
gpgkey=https://packages.cloud.google.com/yum/doc/yum-key.gpg
       https://packages.cloud.google.com/yum/doc/rpm-package-key.gpg
";

/// Installs gcsfuse via yum
pub fn install<R: CommandRunner + ?Sized>(
    runner: &mut R,
    repo_file: &Path,
) -> Result<(), SetupError> {
    run_checked(
        runner,
        &Invocation::new("yum", ["install", "-y", "curl", "gnupg"]).streamed(),
    )?;
    write_source_file(repo_file, REPO_DEFINITION)?;
    run_checked(
        runner,
        &Invocation::new("yum", ["install", "-y", PACKAGE]).streamed(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fake::FakeRunner;
    use tempfile::TempDir;

    #[test]
    fn test_install_writes_static_repo() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("gcsfuse.repo");
        let mut runner = FakeRunner::new();

        install(&mut runner, &repo).unwrap();

        assert_eq!(
            runner.command_lines(),
            vec!["yum install -y curl gnupg", "yum install -y gcsfuse"]
        );
        let contents = std::fs::read_to_string(&repo).unwrap();
        assert_eq!(contents, REPO_DEFINITION);
        assert!(contents.contains("gcsfuse-el$releasever-$basearch"));
        assert!(!runner.called("lsb_release"));
        assert!(runner.calls.iter().all(|c| !c.capture));
    }

    #[test]
    fn test_prerequisite_failure_skips_repo_file() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("gcsfuse.repo");
        let mut runner = FakeRunner::new().exit("yum", 1);

        assert!(install(&mut runner, &repo).is_err());
        assert!(!repo.exists());
    }
}
