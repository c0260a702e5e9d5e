use crate::command::CommandRunner;
use crate::config::MountConfig;
use crate::error::SetupError;
use crate::fstab::{self, FstabEntry, FstabOutcome};
use crate::fuse_conf::{self, FuseConfPatch};
use crate::installer;
use crate::mount;
use crate::os_release::{self, OsFamily, OsInfo};
use crate::privilege;
use crate::verify::{self, VerifyReport};

/// What a completed setup run did
#[derive(Debug, Clone)]
pub struct SetupReport {
    pub os: OsInfo,
    pub family: OsFamily,
    pub fuse_conf: FuseConfPatch,
    pub fstab: FstabOutcome,
    pub verify: VerifyReport,
}

/// Installs gcsfuse, mounts the configured bucket and persists the mount.
///
/// Steps run strictly in order and the first failure ends the run. Nothing
/// already done is rolled back.
pub struct MountSetup<R: CommandRunner> {
    config: MountConfig,
    runner: R,
    euid: u32,
}

impl<R: CommandRunner> MountSetup<R> {
    pub fn new(config: MountConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            euid: privilege::effective_uid(),
        }
    }

    /// Override the effective uid used by the privilege check
    pub fn with_euid(mut self, euid: u32) -> Self {
        self.euid = euid;
        self
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn run(&mut self) -> Result<SetupReport, SetupError> {
        privilege::require_root(self.euid)?;
        self.config.validate()?;

        let config = &self.config;
        let runner = &mut self.runner;

        let os = os_release::detect(&config.paths.os_release)?;
        banner(&format!(
            "Detected OS: {} (Version: {})",
            os.id, os.version_id
        ));
        let family = OsFamily::from_id(&os.id)?;

        banner("Installing gcsfuse");
        installer::install(
            family,
            runner,
            &config.paths.apt_source_list,
            &config.paths.yum_repo,
        )?;

        banner("Configuring fuse");
        let fuse_conf = fuse_conf::enable_allow_other(&config.paths.fuse_conf)?;

        banner("Creating mount directory");
        mount::prepare_mount_dir(runner, &config.mount_point)?;

        banner("Mounting GCS bucket");
        mount::mount_bucket(runner, &config.bucket, &config.mount_point, &config.options)?;

        banner(&format!("Persisting mount in {}", config.paths.fstab.display()));
        let entry = FstabEntry::for_bucket(&config.bucket, &config.mount_point, &config.options);
        let fstab = fstab::persist(&config.paths.fstab, &entry)?;

        banner("Verifying mount");
        let verify = verify::verify(runner, &config.mount_point);
        for line in verify.disk_usage.iter().chain(verify.active_mounts.iter()) {
            println!("{}", line);
        }
        if let Some(ref path) = verify.adapter_path {
            println!("gcsfuse: {}", path.display());
        }

        println!(
            "✅ GCS bucket successfully mounted at {}",
            config.mount_point.display()
        );

        Ok(SetupReport {
            os,
            family,
            fuse_conf,
            fstab,
            verify,
        })
    }
}

fn banner(title: &str) {
    println!("==============================");
    println!(" {}", title);
    println!("==============================");
    log::info!("{}", title);
}
