use crate::adapters::shopify::DEFAULT_API_VERSION;
use crate::utils::error::{FixerError, Result};
use crate::utils::validation::{
    validate_api_version, validate_range, validate_socket_addr, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_WRITE_INTERVAL_MS: u64 = 500;
pub const DEFAULT_LIMIT: usize = 50;
pub const DEFAULT_MAX_LIMIT: usize = 1000;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub shopify: ShopifyConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopifyConfig {
    pub api_version: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// 兩次文章更新之間的最小間隔
    pub write_interval_ms: Option<u64>,
    pub default_limit: Option<usize>,
    pub max_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `compact` 或 `json`
    pub format: Option<String>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FixerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FixerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有指定檔案時使用預設值
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${SHOPIFY_API_VERSION})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn bind(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn api_version(&self) -> &str {
        self.shopify.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.shopify
                .request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }

    pub fn write_interval(&self) -> Duration {
        Duration::from_millis(
            self.processing
                .write_interval_ms
                .unwrap_or(DEFAULT_WRITE_INTERVAL_MS),
        )
    }

    pub fn default_limit(&self) -> usize {
        self.processing.default_limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn max_limit(&self) -> usize {
        self.processing.max_limit.unwrap_or(DEFAULT_MAX_LIMIT)
    }

    pub fn log_format(&self) -> &str {
        self.logging.format.as_deref().unwrap_or("compact")
    }

    /// 請求未帶 limit 時使用預設值；超出範圍視為錯誤請求
    pub fn resolve_limit(&self, requested: Option<usize>) -> Result<usize> {
        let limit = requested.unwrap_or_else(|| self.default_limit());
        if limit == 0 || limit > self.max_limit() {
            return Err(FixerError::InvalidRequestError {
                message: format!("limit must be between 1 and {}, got {}", self.max_limit(), limit),
            });
        }
        Ok(limit)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_socket_addr("server.bind", self.bind())?;
        validate_api_version("shopify.api_version", self.api_version())?;
        validate_range(
            "shopify.request_timeout_seconds",
            self.request_timeout().as_secs(),
            1,
            300,
        )?;
        validate_range(
            "processing.write_interval_ms",
            self.write_interval().as_millis(),
            0,
            60_000,
        )?;
        validate_range("processing.max_limit", self.max_limit(), 1, 100_000)?;
        validate_range("processing.default_limit", self.default_limit(), 1, self.max_limit())?;

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.log_format()) {
            return Err(FixerError::InvalidConfigValueError {
                field: "logging.format".to_string(),
                value: self.log_format().to_string(),
                reason: format!("Unsupported format. Valid formats: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.bind(), DEFAULT_BIND);
        assert_eq!(config.api_version(), "2024-01");
        assert_eq!(config.write_interval(), Duration::from_millis(500));
        assert_eq!(config.default_limit(), 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
bind = "0.0.0.0:8080"

[shopify]
api_version = "2024-04"
request_timeout_seconds = 10

[processing]
write_interval_ms = 750
default_limit = 20
max_limit = 250

[logging]
format = "json"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind(), "0.0.0.0:8080");
        assert_eq!(config.api_version(), "2024-04");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.write_interval(), Duration::from_millis(750));
        assert_eq!(config.max_limit(), 250);
        assert_eq!(config.log_format(), "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SEO_FIXER_TEST_API_VERSION", "2023-10");

        let toml_content = r#"
[shopify]
api_version = "${SEO_FIXER_TEST_API_VERSION}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_version(), "2023-10");

        std::env::remove_var("SEO_FIXER_TEST_API_VERSION");
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::from_toml_str("[shopify]\napi_version = \"latest\"\n").unwrap();
        assert!(config.validate().is_err());

        let config =
            AppConfig::from_toml_str("[processing]\ndefault_limit = 500\nmax_limit = 100\n")
                .unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str("[logging]\nformat = \"pretty\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[server\nbind = 1").unwrap_err();
        assert!(matches!(err, FixerError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_resolve_limit() {
        let config =
            AppConfig::from_toml_str("[processing]\ndefault_limit = 20\nmax_limit = 100\n")
                .unwrap();
        assert_eq!(config.resolve_limit(None).unwrap(), 20);
        assert_eq!(config.resolve_limit(Some(100)).unwrap(), 100);
        assert!(config.resolve_limit(Some(0)).is_err());
        assert!(config.resolve_limit(Some(101)).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nbind = \"127.0.0.1:4000\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.bind(), "127.0.0.1:4000");
    }
}
