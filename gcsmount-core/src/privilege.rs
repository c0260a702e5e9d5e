use crate::error::SetupError;

/// Effective user id of the current process
#[cfg(unix)]
pub fn effective_uid() -> u32 {
    unsafe { libc::geteuid() }
}

#[cfg(not(unix))]
pub fn effective_uid() -> u32 {
    u32::MAX
}

/// Fails unless `euid` is root
pub fn require_root(euid: u32) -> Result<(), SetupError> {
    if euid != 0 {
        return Err(SetupError::NotRoot { euid });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_allowed() {
        assert!(require_root(0).is_ok());
    }

    #[test]
    fn test_non_root_rejected() {
        let err = require_root(1000).unwrap_err();
        assert!(matches!(err, SetupError::NotRoot { euid: 1000 }));
        assert_eq!(err.exit_code(), 1);
    }
}
