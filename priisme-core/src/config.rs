use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PriismeConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// Upstream chat-completions gateway. The credential itself never lives in
/// the file: `api_key_env` names the environment variable holding it.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ai.gateway.lovable.dev/v1".to_string(),
            model: "google/gemini-2.5-flash".to_string(),
            api_key_env: "AI_GATEWAY_API_KEY".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Reads the credential from the configured environment variable.
    /// Empty values count as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
        }
    }
}

impl PriismeConfig {
    /// Load `path` (TOML), then overlay `PRIISME__SECTION__KEY` variables.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("PRIISME").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_reads_toml_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[http]
host = "0.0.0.0"
port = 9000

[gateway]
base_url = "http://localhost:4000/v1"
model = "test/model"
api_key_env = "PRIISME_TEST_KEY_UNSET"
"#
        )
        .unwrap();

        let config = PriismeConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.gateway.model, "test/model");
        assert_eq!(config.service.log_level, "info");
        assert!(config.database.is_none());
        assert!(config.gateway.api_key().is_none());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = PriismeConfig::load("does-not-exist-priisme.toml").unwrap();
        assert_eq!(config.http.port, 8787);
        assert_eq!(config.gateway.model, "google/gemini-2.5-flash");
        assert_eq!(config.gateway.api_key_env, "AI_GATEWAY_API_KEY");
    }
}
