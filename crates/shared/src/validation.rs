//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum display name length for applets, activities and flows.
pub const MAX_NAME_LENGTH: usize = 100;

lazy_static! {
    /// ISO 639-1 language codes, optionally with a region suffix ("en", "fr-CA").
    static ref LANGUAGE_CODE: Regex = Regex::new(r"^[a-z]{2}(-[A-Za-z]{2})?$").unwrap();

    /// Dotted-digit version strings ("1.0.0", "1.0.1.2").
    static ref VERSION_STRING: Regex = Regex::new(r"^\d(\.\d)*$").unwrap();
}

/// Validates a language code ("en", "fr", "fr-CA").
pub fn validate_language_code(code: &str) -> Result<(), ValidationError> {
    if LANGUAGE_CODE.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("language_code");
        err.message = Some("Invalid language code".into());
        Err(err)
    }
}

/// Validates a dotted-digit version string.
pub fn validate_version_string(version: &str) -> Result<(), ValidationError> {
    if VERSION_STRING.is_match(version) {
        Ok(())
    } else {
        let mut err = ValidationError::new("version_format");
        err.message = Some("Version must be a dotted-digit string".into());
        Err(err)
    }
}

/// Validates a secret user identifier (non-empty, at most 100 characters).
pub fn validate_secret_user_id(secret_user_id: &str) -> Result<(), ValidationError> {
    if secret_user_id.trim().is_empty() || secret_user_id.len() > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("secret_user_id");
        err.message = Some("Secret user id must be 1-100 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a display name (non-empty after trimming, at most 100 characters).
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() || name.len() > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("display_name");
        err.message = Some("Display name must be 1-100 characters".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language_code() {
        assert!(validate_language_code("en").is_ok());
        assert!(validate_language_code("fr").is_ok());
        assert!(validate_language_code("fr-CA").is_ok());
        assert!(validate_language_code("english").is_err());
        assert!(validate_language_code("EN").is_err());
        assert!(validate_language_code("").is_err());
    }

    #[test]
    fn test_validate_version_string() {
        assert!(validate_version_string("1.0.0").is_ok());
        assert!(validate_version_string("1.0.1.2").is_ok());
        assert!(validate_version_string("9").is_ok());
        assert!(validate_version_string("1..0").is_err());
        assert!(validate_version_string("v1.0").is_err());
        assert!(validate_version_string("").is_err());
    }

    #[test]
    fn test_validate_secret_user_id() {
        assert!(validate_secret_user_id("subject-001").is_ok());
        assert!(validate_secret_user_id("").is_err());
        assert!(validate_secret_user_id("   ").is_err());
        assert!(validate_secret_user_id(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Daily Mood Survey").is_ok());
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("  ").is_err());
        assert!(validate_display_name(&"a".repeat(101)).is_err());
    }
}
