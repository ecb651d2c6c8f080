//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the auth module.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// password_min_length = 8
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Minimum length accepted for a rotated password.
    ///
    /// This is the backend's own policy; the identity provider applies its
    /// own (typically weaker) minimum to initial registration passwords.
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_min_length: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.password_min_length, 8);
    }

    #[test]
    fn test_toml_roundtrip_defaults() {
        let config: AuthConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.password_min_length, 8);
    }
}
