use crate::config::{
    validate_settings, DEFAULT_CATALOG_ENDPOINT, DEFAULT_CATALOG_RANGE, DEFAULT_ENRICHED_PATH,
    DEFAULT_INPUT_PATH, DEFAULT_PAGE_SIZE, DEFAULT_REPORT_PATH, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::analytics::DEFAULT_LOW_PERFORMER_THRESHOLD;
use crate::core::ConfigProvider;
use crate::domain::model::{DecodePolicy, RecordFilter};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub filters: RecordFilter,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: String,
    #[serde(default)]
    pub decode_policy: DecodePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_range")]
    pub range: u32,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_enriched_path")]
    pub enriched_path: String,
    #[serde(default = "default_report_path")]
    pub report_path: String,
    pub archive_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_low_threshold")]
    pub low_performer_threshold: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub enabled: bool,
    pub log_file: Option<String>,
}

fn default_input_path() -> String {
    DEFAULT_INPUT_PATH.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_CATALOG_ENDPOINT.to_string()
}

fn default_range() -> u32 {
    DEFAULT_CATALOG_RANGE
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_enriched_path() -> String {
    DEFAULT_ENRICHED_PATH.to_string()
}

fn default_report_path() -> String {
    DEFAULT_REPORT_PATH.to_string()
}

fn default_low_threshold() -> u64 {
    DEFAULT_LOW_PERFORMER_THRESHOLD
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            decode_policy: DecodePolicy::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            range: default_range(),
            page_size: default_page_size(),
            timeout_seconds: default_timeout(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            enriched_path: default_enriched_path(),
            report_path: default_report_path(),
            archive_path: None,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            low_performer_threshold: default_low_threshold(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_ENDPOINT})；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }

    pub fn log_file(&self) -> Option<&str> {
        self.monitoring.log_file.as_deref()
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn decode_policy(&self) -> DecodePolicy {
        self.input.decode_policy
    }

    fn enriched_output_path(&self) -> &str {
        &self.output.enriched_path
    }

    fn report_path(&self) -> &str {
        &self.output.report_path
    }

    fn archive_path(&self) -> Option<&str> {
        self.output.archive_path.as_deref()
    }

    fn catalog_endpoint(&self) -> &str {
        &self.catalog.endpoint
    }

    fn catalog_range(&self) -> u32 {
        self.catalog.range
    }

    fn page_size(&self) -> usize {
        self.catalog.page_size
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.catalog.retry_attempts
    }

    fn record_filter(&self) -> RecordFilter {
        self.filters.clone()
    }

    fn low_performer_threshold(&self) -> u64 {
        self.analytics.low_performer_threshold
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}
