use anyhow::Result;
use gcsmount_core::{MountConfig, SetupError};

mod cli;

/// Layer CLI flags over the config file over built-in defaults
fn build_config(args: &cli::Args) -> Result<MountConfig> {
    let mut config = match args.config {
        Some(ref path) => MountConfig::from_file(path)?,
        None => MountConfig::default(),
    };

    if let Some(ref bucket) = args.bucket {
        config.bucket = bucket.clone();
    }
    if let Some(ref mount_point) = args.mount_point {
        config.mount_point = mount_point.clone();
    }

    Ok(config)
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SetupError>()
        .map(SetupError::exit_code)
        .unwrap_or(gcsmount_core::error::EXIT_FAILURE)
}

fn run(args: cli::Args, euid: u32) -> Result<()> {
    let config = build_config(&args)?;

    if args.status {
        gcsmount_core::check_status(&config);
        return Ok(());
    }

    // Nothing may be written, not even the run log, unless we are root
    gcsmount_core::require_root(euid)?;
    config.validate()?;

    let run_log = if args.no_log_file {
        None
    } else {
        match gcsmount_core::open_run_log(euid) {
            Ok(log) => {
                log::info!("Writing run log to {}", log.log_path().display());
                Some(log)
            }
            Err(e) => {
                log::warn!("Continuing without a run log: {}", e);
                None
            }
        }
    };

    let report = gcsmount_core::run_setup(config, run_log)?;
    log::debug!("Setup report: {:?}", report);

    Ok(())
}

fn main() {
    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    if let Err(e) = run(args, gcsmount_core::effective_uid()) {
        eprintln!("❌ {}", e);
        std::process::exit(exit_code(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_cli_overrides_config_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("gcsmount.json");
        std::fs::write(&path, r#"{ "bucket": "from-file", "mount_point": "/mnt/file" }"#)?;

        let args = cli::Args::try_parse_from([
            "gcsmount",
            "--config",
            path.to_str().unwrap(),
            "--bucket",
            "from-cli",
        ])?;
        let config = build_config(&args)?;

        assert_eq!(config.bucket, "from-cli");
        assert_eq!(config.mount_point, PathBuf::from("/mnt/file"));
        Ok(())
    }

    #[test]
    fn test_defaults_without_config_file() -> Result<()> {
        let args = cli::Args::try_parse_from(["gcsmount", "-b", "bucket"])?;
        let config = build_config(&args)?;
        assert_eq!(config.mount_point, PathBuf::from("/mnt/gcs-bucket"));
        Ok(())
    }

    #[test]
    fn test_exit_codes() {
        let not_root = anyhow::Error::from(SetupError::NotRoot { euid: 1000 });
        assert_eq!(exit_code(&not_root), 1);

        let failed = anyhow::Error::from(SetupError::CommandFailed {
            command: "apt-get update".to_string(),
            code: Some(100),
        });
        assert_eq!(exit_code(&failed), 100);

        let other = anyhow::anyhow!("Failed to read config file");
        assert_eq!(exit_code(&other), 1);
    }

    #[test]
    fn test_missing_bucket_fails_before_setup() {
        let args = cli::Args::try_parse_from(["gcsmount", "--no-log-file"]).unwrap();
        let err = run(args, 0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::Config(_))
        ));
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_non_root_rejected_before_run_log() {
        let args = cli::Args::try_parse_from(["gcsmount", "--bucket", "b"]).unwrap();
        let err = run(args, 1000).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::NotRoot { euid: 1000 })
        ));
        assert_eq!(exit_code(&err), 1);
    }
}
