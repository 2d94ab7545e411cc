//! Applet version arithmetic.
//!
//! Versions are dotted digit strings ("1.0.0"). Incrementing treats the
//! concatenated digits as one integer, adds one, and re-splits into digits,
//! so "1.0.9" becomes "1.1.0" and "9.9.9" rolls over to "1.0.0.0".

use thiserror::Error;

/// Version assigned to a freshly created applet.
pub const INITIAL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version string: {0}")]
    Invalid(String),
}

fn as_number(version: &str) -> Result<u64, VersionError> {
    let digits: String = version.split('.').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(VersionError::Invalid(version.to_string()));
    }
    digits
        .parse::<u64>()
        .map_err(|_| VersionError::Invalid(version.to_string()))
}

fn as_dotted(number: u64) -> String {
    let digits: Vec<String> = number.to_string().chars().map(String::from).collect();
    digits.join(".")
}

/// Returns the version following `version`.
pub fn next_version(version: &str) -> Result<String, VersionError> {
    let number = as_number(version)?;
    Ok(as_dotted(number + 1))
}

/// Returns the version preceding `version`, clamped at [`INITIAL_VERSION`].
pub fn prev_version(version: &str) -> Result<String, VersionError> {
    let number = as_number(version)?;
    let initial = as_number(INITIAL_VERSION).expect("initial version is well formed");
    if number <= initial {
        return Ok(INITIAL_VERSION.to_string());
    }
    Ok(as_dotted(number - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_increment() {
        assert_eq!(next_version("1.0.0").unwrap(), "1.0.1");
        assert_eq!(next_version("1.0.1").unwrap(), "1.0.2");
        assert_eq!(next_version("2.3.4").unwrap(), "2.3.5");
    }

    #[test]
    fn test_digit_carry() {
        assert_eq!(next_version("1.0.9").unwrap(), "1.1.0");
        assert_eq!(next_version("1.9.9").unwrap(), "2.0.0");
    }

    #[test]
    fn test_rollover_grows_segments() {
        assert_eq!(next_version("9.9.9").unwrap(), "1.0.0.0");
    }

    #[test]
    fn test_prev_inverts_next() {
        for version in ["1.0.0", "1.0.5", "1.9.9", "4.2.0"] {
            let next = next_version(version).unwrap();
            assert_eq!(prev_version(&next).unwrap(), version);
        }
    }

    #[test]
    fn test_prev_clamps_at_initial() {
        assert_eq!(prev_version("1.0.0").unwrap(), INITIAL_VERSION);
        assert_eq!(prev_version("0.0.9").unwrap(), INITIAL_VERSION);
    }

    #[test]
    fn test_invalid_versions_rejected() {
        assert!(next_version("").is_err());
        assert!(next_version("1.a.0").is_err());
        assert!(next_version("...").is_err());
        assert!(prev_version("one").is_err());
    }
}
