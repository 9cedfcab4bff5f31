mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_COMMIT_MESSAGE: &str = "updating catalog";
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub credentials_path: Option<PathBuf>,
    pub api_url: String,
    pub request_timeout_sec: u64,
    pub commit_message: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials_path: PathBuf,
    pub api_url: String,
    pub request_timeout_sec: u64,
    pub commit_message: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let credentials_path = file
            .credentials_path
            .map(PathBuf::from)
            .or_else(|| cli.credentials_path.clone())
            .unwrap_or_else(|| PathBuf::from("credentials.json"));

        let api_url = file.api_url.unwrap_or_else(|| cli.api_url.clone());
        if api_url.is_empty() {
            bail!("api_url must not be empty");
        }

        let request_timeout_sec = file
            .request_timeout_sec
            .unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than zero");
        }

        let commit_message = file
            .commit_message
            .unwrap_or_else(|| cli.commit_message.clone());
        if commit_message.is_empty() {
            bail!("commit_message must not be empty");
        }

        Ok(Self {
            credentials_path,
            api_url,
            request_timeout_sec,
            commit_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_cli_only() {
        let cli = CliConfig {
            credentials_path: Some(PathBuf::from("/data/credentials.json")),
            api_url: "https://github.example.com/api/v3".to_string(),
            request_timeout_sec: 60,
            commit_message: "catalog update".to_string(),
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(
            config.credentials_path,
            PathBuf::from("/data/credentials.json")
        );
        assert_eq!(config.api_url, "https://github.example.com/api/v3");
        assert_eq!(config.request_timeout_sec, 60);
        assert_eq!(config.commit_message, "catalog update");
    }

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), None).unwrap();

        assert_eq!(config.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_sec, DEFAULT_REQUEST_TIMEOUT_SEC);
        assert_eq!(config.commit_message, DEFAULT_COMMIT_MESSAGE);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig {
            credentials_path: Some(PathBuf::from("/cli/credentials.json")),
            api_url: "https://cli.example.com".to_string(),
            request_timeout_sec: 60,
            commit_message: "from cli".to_string(),
        };

        let file_config = FileConfig {
            credentials_path: Some("/toml/credentials.json".to_string()),
            api_url: Some("https://toml.example.com".to_string()),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(
            config.credentials_path,
            PathBuf::from("/toml/credentials.json")
        );
        assert_eq!(config.api_url, "https://toml.example.com");
        // CLI value used when TOML doesn't specify
        assert_eq!(config.request_timeout_sec, 60);
        assert_eq!(config.commit_message, "from cli");
    }

    #[test]
    fn test_resolve_rejects_zero_timeout() {
        let cli = CliConfig {
            request_timeout_sec: 0,
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("request_timeout_sec"));
    }

    #[test]
    fn test_resolve_rejects_empty_commit_message() {
        let file_config = FileConfig {
            commit_message: Some(String::new()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&CliConfig::default(), Some(file_config));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("commit_message"));
    }

    #[test]
    fn test_file_config_parses_toml() {
        let parsed: FileConfig = toml::from_str(
            r#"
            api_url = "https://toml.example.com"
            request_timeout_sec = 120
            "#,
        )
        .unwrap();

        assert_eq!(parsed.api_url.as_deref(), Some("https://toml.example.com"));
        assert_eq!(parsed.request_timeout_sec, Some(120));
        assert!(parsed.credentials_path.is_none());
        assert!(parsed.commit_message.is_none());
    }
}
