use crate::error::{GitSvError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// How far a set of commits moves the version.
///
/// Variants are declared in increasing priority so the derived `Ord` gives
/// `None < Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VersionBump {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionBump::None => "none",
            VersionBump::Patch => "patch",
            VersionBump::Minor => "minor",
            VersionBump::Major => "major",
        };
        f.write_str(name)
    }
}

/// Parse a version string (e.g., "v1.2.3" -> 1.2.3).
///
/// A leading `v`/`V` is ignored, an empty string is `0.0.0` and partial
/// versions such as `1` or `1.2` are padded with zeros.
pub fn to_version(value: &str) -> Result<Version> {
    let clean = value.trim().trim_start_matches('v').trim_start_matches('V');
    if clean.is_empty() {
        return Ok(Version::new(0, 0, 0));
    }

    if let Ok(version) = Version::parse(clean) {
        return Ok(version);
    }

    let parts: Vec<&str> = clean.split('.').collect();
    if parts.len() > 2 {
        return Err(GitSvError::version(format!(
            "Invalid version format: '{}' - expected X.Y.Z",
            value
        )));
    }

    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part.parse::<u64>().map_err(|_| {
            GitSvError::version(format!("Invalid version component '{}' in '{}'", part, value))
        })?;
    }

    Ok(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Apply a single increment. Lower components reset to zero and pre-release
/// or build metadata is dropped; `VersionBump::None` returns the version as is.
///
/// # Returns
/// * `Ok(Version)` - The bumped version
/// * `Err` - If the incremented component would overflow
pub fn bump_version(version: &Version, bump: VersionBump) -> Result<Version> {
    let overflow = || {
        GitSvError::version(format!(
            "Cannot apply {} bump to {}: component overflows",
            bump, version
        ))
    };

    let mut next = match bump {
        VersionBump::None => return Ok(version.clone()),
        VersionBump::Major => {
            Version::new(version.major.checked_add(1).ok_or_else(overflow)?, 0, 0)
        }
        VersionBump::Minor => Version::new(
            version.major,
            version.minor.checked_add(1).ok_or_else(overflow)?,
            0,
        ),
        VersionBump::Patch => Version::new(
            version.major,
            version.minor,
            version.patch.checked_add(1).ok_or_else(overflow)?,
        ),
    };
    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    Ok(next)
}

/// `major.minor.patch` without pre-release or build parts
pub fn core_version(version: &Version) -> String {
    format!("{}.{}.{}", version.major, version.minor, version.patch)
}
