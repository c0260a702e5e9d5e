//! OS detection from the os-release descriptor

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::SetupError;

/// Distribution identity read from os-release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsInfo {
    /// Lower-cased `ID`
    pub id: String,
    /// `VERSION_ID`, empty if absent
    pub version_id: String,
}

/// Package-manager family the installer targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    /// apt-based: Ubuntu, Debian
    Debian,
    /// yum-based: RHEL, CentOS, Fedora
    Rhel,
}

impl OsFamily {
    const DEBIAN_IDS: &'static [&'static str] = &["ubuntu", "debian"];
    const RHEL_IDS: &'static [&'static str] = &["rhel", "centos", "fedora"];

    /// Map an os-release `ID` to its family
    pub fn from_id(id: &str) -> Result<Self, SetupError> {
        let id = id.to_lowercase();
        if Self::DEBIAN_IDS.contains(&id.as_str()) {
            Ok(OsFamily::Debian)
        } else if Self::RHEL_IDS.contains(&id.as_str()) {
            Ok(OsFamily::Rhel)
        } else {
            Err(SetupError::UnsupportedOs {
                id,
                supported: Self::supported_ids().join(", "),
            })
        }
    }

    pub fn supported_ids() -> Vec<&'static str> {
        Self::DEBIAN_IDS
            .iter()
            .chain(Self::RHEL_IDS.iter())
            .copied()
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            OsFamily::Debian => "Debian family",
            OsFamily::Rhel => "RHEL family",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse os-release text into a key/value map.
///
/// Blank lines and `#` comments are skipped; values lose one layer of
/// surrounding double or single quotes.
pub fn parse(contents: &str, path: &Path) -> Result<HashMap<String, String>, SetupError> {
    let mut fields = HashMap::new();

    for (idx, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed
            .split_once('=')
            .ok_or_else(|| SetupError::MalformedOsRelease {
                path: path.to_path_buf(),
                line: idx + 1,
                content: line.to_string(),
            })?;

        fields.insert(key.trim().to_string(), strip_quotes(value.trim()).to_string());
    }

    Ok(fields)
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Read and interpret the os-release file at `path`
pub fn detect(path: &Path) -> Result<OsInfo, SetupError> {
    let contents = fs::read_to_string(path).map_err(|source| SetupError::OsRelease {
        path: path.to_path_buf(),
        source,
    })?;

    let fields = parse(&contents, path)?;

    let id = fields
        .get("ID")
        .filter(|id| !id.is_empty())
        .ok_or(SetupError::MissingOsField("ID"))?
        .to_lowercase();
    let version_id = fields.get("VERSION_ID").cloned().unwrap_or_default();

    log::debug!("Detected os-release ID={} VERSION_ID={}", id, version_id);

    Ok(OsInfo { id, version_id })
}
