//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Why settings could not be loaded. File errors carry the path so the
/// binary can report which file to fix.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// Settings file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid JSON, or a value has the wrong type.
    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        /// Settings file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Compiled defaults failed to round-trip through JSON.
    #[error("settings serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    /// A value passed deserialization but breaks a constraint.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

impl SettingsError {
    pub(crate) fn parse(path: &std::path::Path) -> impl FnOnce(serde_json::Error) -> Self + '_ {
        move |source| Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_names_the_file() {
        let err = SettingsError::Read {
            path: PathBuf::from("/etc/jackpot-wall.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/jackpot-wall.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn parse_error_names_the_file() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let err = SettingsError::parse(std::path::Path::new("wall.json"))(json_err);
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid settings in wall.json"));
    }

    #[test]
    fn invalid_value_display() {
        let err = SettingsError::InvalidValue("upstream.timeoutMs must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "invalid settings value: upstream.timeoutMs must be greater than 0"
        );
    }
}
