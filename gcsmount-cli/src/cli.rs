use clap::Parser;
use std::path::PathBuf;

/// Install gcsfuse and mount a Google Cloud Storage bucket persistently
#[derive(Parser, Debug)]
#[command(name = "gcsmount")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Installs gcsfuse, mounts a GCS bucket and persists the mount in /etc/fstab",
    long_about = None
)]
pub struct Args {
    /// GCS bucket to mount
    #[arg(short = 'b', long = "bucket", value_name = "NAME")]
    pub bucket: Option<String>,

    /// Local directory to mount the bucket on [default: /mnt/gcs-bucket]
    #[arg(short = 'm', long = "mount-point", value_name = "PATH")]
    pub mount_point: Option<PathBuf>,

    /// JSON configuration file (bucket, mount_point, options, paths)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show installation and mount status without changing anything
    #[arg(long = "status")]
    pub status: bool,

    /// Do not write a run log to the temp directory
    #[arg(long = "no-log-file")]
    pub no_log_file: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let args = Args::try_parse_from([
            "gcsmount",
            "--bucket",
            "data",
            "-m",
            "/srv/data",
            "--no-log-file",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.bucket.as_deref(), Some("data"));
        assert_eq!(args.mount_point, Some(PathBuf::from("/srv/data")));
        assert!(args.no_log_file);
        assert!(args.verbose);
        assert!(!args.status);
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["gcsmount"]).unwrap();
        assert!(args.bucket.is_none());
        assert!(args.mount_point.is_none());
        assert!(args.config.is_none());
    }
}
