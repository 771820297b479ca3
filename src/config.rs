use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Backend origin, e.g. `http://localhost:8080`
    pub api_base_url: String,
    /// Per-request deadline for ordinary calls
    pub request_timeout_secs: u64,
    /// Per-request deadline for GPA enrichment calls
    pub enrichment_timeout_secs: u64,
    /// Upper bound on in-flight enrichment / subordinate fetches
    pub max_concurrent_enrichment: usize,
    /// Cookie file holding `jwt_token`
    pub token_file: String,
    /// File standing in for the `rememberedEmail` local-storage entry
    pub remembered_email_file: String,
    /// Largest attachment accepted for upload
    pub max_upload_bytes: usize,
    pub verbose_logging: bool,
    // --- credentials used by the CLI when no session is stored ---
    pub login_email: Option<String>,
    pub login_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            enrichment_timeout_secs: 10,
            max_concurrent_enrichment: 4,
            token_file: ".agms/cookies.txt".to_string(),
            remembered_email_file: ".agms/remembered_email".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            verbose_logging: false,
            login_email: None,
            login_password: None,
        }
    }
}

/// On-disk form: every key optional, missing keys keep their defaults
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    enrichment_timeout_secs: Option<u64>,
    max_concurrent_enrichment: Option<usize>,
    token_file: Option<String>,
    remembered_email_file: Option<String>,
    max_upload_bytes: Option<usize>,
    verbose_logging: Option<bool>,
    login_email: Option<String>,
}

impl Config {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Optional TOML file, then environment overlay, then validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_toml_file(p)?,
            None => Self::default(),
        };
        let config = base.with_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            crate::AppError::Config(ConfigError::TomlParseFailed { source, .. }) => {
                ConfigError::TomlParseFailed {
                    path: path.display().to_string(),
                    source,
                }
                .into()
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: String::new(),
            source,
        })?;
        let default = Self::default();
        Ok(Self {
            api_base_url: file.api_base_url.unwrap_or(default.api_base_url),
            request_timeout_secs: file.request_timeout_secs.unwrap_or(default.request_timeout_secs),
            enrichment_timeout_secs: file
                .enrichment_timeout_secs
                .unwrap_or(default.enrichment_timeout_secs),
            max_concurrent_enrichment: file
                .max_concurrent_enrichment
                .unwrap_or(default.max_concurrent_enrichment),
            token_file: file.token_file.unwrap_or(default.token_file),
            remembered_email_file: file
                .remembered_email_file
                .unwrap_or(default.remembered_email_file),
            max_upload_bytes: file.max_upload_bytes.unwrap_or(default.max_upload_bytes),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
            login_email: file.login_email,
            login_password: None,
        })
    }

    fn with_env(self) -> Result<Self> {
        Ok(Self {
            api_base_url: std::env::var("AGMS_API_BASE_URL").unwrap_or(self.api_base_url),
            request_timeout_secs: parse_env("AGMS_REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            enrichment_timeout_secs: parse_env("AGMS_ENRICHMENT_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.enrichment_timeout_secs),
            max_concurrent_enrichment: parse_env("AGMS_MAX_CONCURRENT_ENRICHMENT", "usize")?
                .unwrap_or(self.max_concurrent_enrichment),
            token_file: std::env::var("AGMS_TOKEN_FILE").unwrap_or(self.token_file),
            remembered_email_file: std::env::var("AGMS_REMEMBERED_EMAIL_FILE")
                .unwrap_or(self.remembered_email_file),
            max_upload_bytes: parse_env("AGMS_MAX_UPLOAD_BYTES", "usize")?
                .unwrap_or(self.max_upload_bytes),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            login_email: std::env::var("AGMS_EMAIL").ok().or(self.login_email),
            login_password: std::env::var("AGMS_PASSWORD").ok().or(self.login_password),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(invalid("api_base_url", "must start with http:// or https://"));
        }
        if self.max_concurrent_enrichment == 0 {
            return Err(invalid("max_concurrent_enrichment", "must be at least 1"));
        }
        if self.request_timeout_secs == 0 || self.enrichment_timeout_secs == 0 {
            return Err(invalid("timeouts", "must be at least 1 second"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

fn invalid(key: &str, reason: &str) -> crate::AppError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_keys_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "https://agms.iyte.edu.tr"
            max_concurrent_enrichment = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://agms.iyte.edu.tr");
        assert_eq!(config.max_concurrent_enrichment, 8);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = Config::from_toml_str("max_concurrent_enrichment = \"many\"").unwrap_err();
        assert!(matches!(err, crate::AppError::Config(ConfigError::TomlParseFailed { .. })));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = Config {
            max_concurrent_enrichment: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn base_url_needs_scheme() {
        let config = Config {
            api_base_url: "agms.local".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
