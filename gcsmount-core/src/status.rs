//! Read-only status report (`gcsmount --status`)

use crate::config::MountConfig;
use crate::fstab::{self, FstabEntry};
use crate::fuse_conf;
use crate::installer::PACKAGE;
use crate::os_release::{self, OsFamily};

/// One line of the status table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCheck {
    pub name: &'static str,
    pub ok: bool,
    pub detail: String,
}

impl StatusCheck {
    fn new(name: &'static str, ok: bool, detail: impl Into<String>) -> Self {
        Self {
            name,
            ok,
            detail: detail.into(),
        }
    }
}

/// Inspect the host without changing anything
pub fn check_status(config: &MountConfig, euid: u32) -> Vec<StatusCheck> {
    let mut checks = Vec::new();

    checks.push(StatusCheck::new(
        "Running as root",
        euid == 0,
        format!("effective uid {}", euid),
    ));

    let os = match os_release::detect(&config.paths.os_release) {
        Ok(info) => match OsFamily::from_id(&info.id) {
            Ok(family) => StatusCheck::new(
                "Supported OS",
                true,
                format!("{} {} ({})", info.id, info.version_id, family),
            ),
            Err(e) => StatusCheck::new("Supported OS", false, e.to_string()),
        },
        Err(e) => StatusCheck::new("Supported OS", false, e.to_string()),
    };
    checks.push(os);

    checks.push(match which::which(PACKAGE) {
        Ok(path) => StatusCheck::new("gcsfuse installed", true, path.display().to_string()),
        Err(_) => StatusCheck::new("gcsfuse installed", false, "not found on PATH"),
    });

    checks.push(StatusCheck::new(
        "user_allow_other enabled",
        fuse_conf::is_enabled(&config.paths.fuse_conf),
        config.paths.fuse_conf.display().to_string(),
    ));

    checks.push(StatusCheck::new(
        "Mount directory exists",
        config.mount_point.is_dir(),
        config.mount_point.display().to_string(),
    ));

    let entry = FstabEntry::for_bucket(&config.bucket, &config.mount_point, &config.options);
    checks.push(StatusCheck::new(
        "fstab entry present",
        fstab::is_persisted(&config.paths.fstab, &entry),
        config.paths.fstab.display().to_string(),
    ));

    checks
}

/// Prints the status checks in a formatted table
pub fn print_status(checks: &[StatusCheck]) {
    println!("\n==================================================");
    println!("  gcsmount Status");
    println!("==================================================\n");

    for check in checks {
        let mark = if check.ok { "✓" } else { "✗" };
        println!("{} {}", mark, check.name);
        println!("   {}", check.detail);
        println!();
    }

    println!("==================================================\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> MountConfig {
        let mut config = MountConfig::new("my-bucket", dir.path().join("mnt"));
        config.paths.os_release = dir.path().join("os-release");
        config.paths.fuse_conf = dir.path().join("fuse.conf");
        config.paths.fstab = dir.path().join("fstab");
        config
    }

    fn find<'a>(checks: &'a [StatusCheck], name: &str) -> &'a StatusCheck {
        checks.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_status_on_configured_host() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::write(&config.paths.os_release, "ID=debian\nVERSION_ID=\"12\"\n").unwrap();
        fs::write(&config.paths.fuse_conf, "user_allow_other\n").unwrap();
        fs::create_dir_all(&config.mount_point).unwrap();
        let entry = FstabEntry::for_bucket(&config.bucket, &config.mount_point, &config.options);
        fs::write(&config.paths.fstab, format!("{}\n", entry)).unwrap();

        let checks = check_status(&config, 0);

        assert!(find(&checks, "Running as root").ok);
        let os = find(&checks, "Supported OS");
        assert!(os.ok);
        assert!(os.detail.contains("Debian family"));
        assert!(find(&checks, "user_allow_other enabled").ok);
        assert!(find(&checks, "Mount directory exists").ok);
        assert!(find(&checks, "fstab entry present").ok);
    }

    #[test]
    fn test_status_on_fresh_host() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::write(&config.paths.os_release, "ID=arch\n").unwrap();
        fs::write(&config.paths.fuse_conf, "#user_allow_other\n").unwrap();

        let checks = check_status(&config, 1000);

        assert!(!find(&checks, "Running as root").ok);
        let os = find(&checks, "Supported OS");
        assert!(!os.ok);
        assert!(os.detail.contains("arch"));
        assert!(!find(&checks, "user_allow_other enabled").ok);
        assert!(!find(&checks, "Mount directory exists").ok);
        assert!(!find(&checks, "fstab entry present").ok);
        // Read-only: nothing was created
        assert!(!config.paths.fstab.exists());
        assert_eq!(
            fs::read_to_string(&config.paths.fuse_conf).unwrap(),
            "#user_allow_other\n"
        );
    }
}
