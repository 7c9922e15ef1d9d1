//! Settings error type.

/// Convenience alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors while loading or parsing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid JSON or does not match the schema.
    #[error("settings parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let e = SettingsError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert!(e.to_string().contains("no such file"));
    }

    #[test]
    fn json_error_display() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let e = SettingsError::from(parse_err);
        assert!(e.to_string().contains("parse error"));
    }
}
