use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code used for every failure that is not a propagated command status
pub const EXIT_FAILURE: i32 = 1;

/// Exit code used when a required command could not be started at all
pub const EXIT_SPAWN_FAILED: i32 = 127;

/// Errors raised by the setup pipeline
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("This program must be run as root (use sudo). Effective uid is {euid}.")]
    NotRoot { euid: u32 },

    #[error("Unable to read OS descriptor {}: {source}", path.display())]
    OsRelease {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed OS descriptor {} at line {line}: {content:?}", path.display())]
    MalformedOsRelease {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("OS descriptor is missing the {0} field")]
    MissingOsField(&'static str),

    #[error("Unsupported OS: {id} (supported: {supported})")]
    UnsupportedOs { id: String, supported: String },

    #[error("Failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command `{command}` failed with {}", describe_code(*code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("lsb_release returned an empty distribution codename")]
    EmptyCodename,

    #[error("{} has no user_allow_other line to enable", path.display())]
    FuseFlagMissing { path: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SetupError {
    /// Wraps an I/O error with a short description of what was being done
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        SetupError::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit status for this failure
    ///
    /// A failed external command propagates its own status; a command killed by
    /// a signal has no status and maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            SetupError::Spawn { .. } => EXIT_SPAWN_FAILED,
            _ => EXIT_FAILURE,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "termination by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failure_propagates_exit_code() {
        let err = SetupError::CommandFailed {
            command: "apt-get update".to_string(),
            code: Some(100),
        };
        assert_eq!(err.exit_code(), 100);
        assert!(err.to_string().contains("exit status 100"));
    }

    #[test]
    fn test_signal_termination_maps_to_one() {
        let err = SetupError::CommandFailed {
            command: "gcsfuse".to_string(),
            code: None,
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_precondition_errors_exit_one() {
        assert_eq!(SetupError::NotRoot { euid: 1000 }.exit_code(), 1);
        let unsupported = SetupError::UnsupportedOs {
            id: "arch".to_string(),
            supported: "ubuntu, debian".to_string(),
        };
        assert_eq!(unsupported.exit_code(), 1);
        assert!(unsupported.to_string().contains("arch"));
    }

    #[test]
    fn test_spawn_failure_exit_code() {
        let err = SetupError::Spawn {
            command: "gcsfuse".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.exit_code(), EXIT_SPAWN_FAILED);
    }
}
