//! Test utilities for Memoria
//!
//! This module provides common test utilities including temporary directory
//! management, offline configuration, and assertion helpers.

use crate::config::Config;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a configuration with no collaborator configured
///
/// Catalog lookups are disabled and no audio converter, store, or
/// collaborator credential is set.
pub fn offline_config() -> Config {
    let mut config = Config::default();
    config.storage.memory_db = None;
    config.vector.url = None;
    config.catalog.enabled = false;
    config.audio.converter = None;
    config.google.api_key = None;
    config.google.credentials_file = None;
    config.generator.api_key = None;
    config
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MemoriaError;

    #[test]
    fn test_offline_config_is_valid() {
        let config = offline_config();
        assert!(config.validate().is_ok());
        assert!(!config.catalog.enabled);
        assert!(config.storage.memory_db.is_none());
        assert!(config.vector.url.is_none());
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: crate::error::Result<()> =
            Err(MemoriaError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }
}
