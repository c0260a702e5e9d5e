use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SetupError;
use crate::mount::MountOptions;

/// Default local mount point
pub const DEFAULT_MOUNT_POINT: &str = "/mnt/gcs-bucket";

/// Locations of the system files the setup reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemPaths {
    pub os_release: PathBuf,
    pub fuse_conf: PathBuf,
    pub fstab: PathBuf,
    /// APT source list written on Debian-family systems
    pub apt_source_list: PathBuf,
    /// Repository definition written on RHEL-family systems
    pub yum_repo: PathBuf,
}

impl Default for SystemPaths {
    fn default() -> Self {
        Self {
            os_release: PathBuf::from("/etc/os-release"),
            fuse_conf: PathBuf::from("/etc/fuse.conf"),
            fstab: PathBuf::from("/etc/fstab"),
            apt_source_list: PathBuf::from("/etc/apt/sources.list.d/gcsfuse.list"),
            yum_repo: PathBuf::from("/etc/yum.repos.d/gcsfuse.repo"),
        }
    }
}

/// Everything the setup pipeline needs to know about the mount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// GCS bucket name
    pub bucket: String,
    /// Local directory the bucket is mounted on
    pub mount_point: PathBuf,
    /// Always the fixed gcsfuse option set; not read from config files
    #[serde(skip)]
    pub options: MountOptions,
    pub paths: SystemPaths,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            options: MountOptions::default(),
            paths: SystemPaths::default(),
        }
    }
}

impl MountConfig {
    pub fn new(bucket: impl Into<String>, mount_point: impl Into<PathBuf>) -> Self {
        Self {
            bucket: bucket.into(),
            mount_point: mount_point.into(),
            ..Default::default()
        }
    }

    /// Load a JSON configuration file; absent fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: MountConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Check the values before anything touches the system
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.bucket.is_empty() {
            return Err(SetupError::Config(
                "bucket name is required (use --bucket or a config file)".to_string(),
            ));
        }
        if self.bucket.chars().any(char::is_whitespace) {
            return Err(SetupError::Config(format!(
                "bucket name {:?} must not contain whitespace",
                self.bucket
            )));
        }
        if !self.mount_point.is_absolute() {
            return Err(SetupError::Config(format!(
                "mount point {} must be an absolute path",
                self.mount_point.display()
            )));
        }
        // fstab fields are whitespace-separated
        if self
            .mount_point
            .to_string_lossy()
            .chars()
            .any(char::is_whitespace)
        {
            return Err(SetupError::Config(format!(
                "mount point {} must not contain whitespace",
                self.mount_point.display()
            )));
        }
        Ok(())
    }
}
