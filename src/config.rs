use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-decorator.toml.
/// All fields are optional; anything missing can be supplied on the
/// command line or via the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Pull-request host settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Credential settings
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Base API URL, e.g. https://dev.azure.com/my-org
    pub base_url: Option<String>,
    /// Project identifier (may contain spaces or reserved characters)
    pub project: Option<String>,
    /// Repository identifier
    pub repository: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Pre-obtained basic-auth token. If None, falls back to the
    /// PR_DECORATOR_TOKEN env var.
    pub token: Option<String>,
}

impl Config {
    /// Load configuration from .pr-decorator.toml in the current
    /// directory, returning defaults when the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".pr-decorator.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the auth token: config file value takes precedence,
    /// falls back to the PR_DECORATOR_TOKEN env var.
    pub fn auth_token(&self) -> Option<String> {
        self.auth
            .token
            .clone()
            .or_else(|| std::env::var("PR_DECORATOR_TOKEN").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.server.base_url.is_none());
        assert!(config.server.project.is_none());
        assert!(config.auth.token.is_none());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[server]
base_url = "https://dev.azure.com/my-org"
project = "My Project"
repository = "my-repo"

[auth]
token = "dG9rZW4="
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.server.base_url.as_deref(),
            Some("https://dev.azure.com/my-org")
        );
        assert_eq!(config.server.project.as_deref(), Some("My Project"));
        assert_eq!(config.auth.token.as_deref(), Some("dG9rZW4="));
    }

    #[test]
    fn test_partial_config_defaults_missing_sections() {
        let config: Config = toml::from_str("[server]\nrepository = \"my-repo\"\n").unwrap();
        assert_eq!(config.server.repository.as_deref(), Some("my-repo"));
        assert!(config.server.base_url.is_none());
        assert!(config.auth.token.is_none());
    }
}
