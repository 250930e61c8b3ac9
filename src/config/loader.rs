/// Configuration loader
use std::fs;
use std::path::Path;

use super::schema::ServerConfig;
use crate::error::{LicenseError, LicenseResult};

/// Load server configuration from a JSON file
///
/// The file is validated before it is returned; command-line overrides are
/// applied by the caller.
pub fn load_config(path: &Path) -> LicenseResult<ServerConfig> {
    let config_content = fs::read_to_string(path).map_err(|e| {
        LicenseError::Config(format!("failed to read config file {}: {e}", path.display()))
    })?;

    let config: ServerConfig = serde_json::from_str(&config_content)
        .map_err(|e| LicenseError::Config(format!("failed to parse config: {e}")))?;

    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(
            r#"{
            "secret": "secret123",
            "api_key": "key123",
            "port": 8080,
            "bind": "127.0.0.1"
        }"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.secret, "secret123");
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        assert!(matches!(load_config(file.path()), Err(LicenseError::Config(_))));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let file = write_config(r#"{ "secret": "", "api_key": "key" }"#);
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/license-server.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
