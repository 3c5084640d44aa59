use crate::core::settings::{
    ControllerSettings, Labels, DEFAULT_BUDGET, DEFAULT_EXCHANGE_DELAY,
    DEFAULT_INSUFFICIENT_FLASH, DEFAULT_LOW_POINTS_THRESHOLD,
};
use crate::utils::error::{ExchangeError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_template, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub budget: BudgetConfig,
    pub timing: TimingConfig,
    pub catalog: CatalogConfig,
    pub labels: LabelsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Used only when the catalog does not show a budget itself.
    pub available_points: Option<u64>,
    pub low_points_threshold: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingConfig {
    pub exchange_delay_ms: Option<u64>,
    pub insufficient_flash_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    Markup,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub path: Option<String>,
    pub format: Option<CatalogFormat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelsConfig {
    pub confirm_idle: Option<String>,
    pub confirm_active: Option<String>,
    pub processing: Option<String>,
    pub remaining: Option<String>,
    pub insufficient: Option<String>,
    pub success: Option<String>,
    pub failure: Option<String>,
}

impl ExchangeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExchangeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ExchangeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${EXCHANGE_BUDGET})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExchangeError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn default_budget(&self) -> u64 {
        self.budget.available_points.unwrap_or(DEFAULT_BUDGET)
    }

    pub fn low_points_threshold(&self) -> u64 {
        self.budget
            .low_points_threshold
            .unwrap_or(DEFAULT_LOW_POINTS_THRESHOLD)
    }

    pub fn exchange_delay(&self) -> Duration {
        self.timing
            .exchange_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_EXCHANGE_DELAY)
    }

    pub fn insufficient_flash(&self) -> Duration {
        self.timing
            .insufficient_flash_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_INSUFFICIENT_FLASH)
    }

    pub fn catalog_path(&self) -> Option<&str> {
        self.catalog.path.as_deref()
    }

    /// Explicit format, otherwise inferred from the file extension.
    pub fn catalog_format(&self) -> CatalogFormat {
        if let Some(format) = self.catalog.format {
            return format;
        }
        match self
            .catalog_path()
            .and_then(|p| Path::new(p).extension())
            .and_then(|ext| ext.to_str())
        {
            Some(ext) if ext.eq_ignore_ascii_case("json") => CatalogFormat::Json,
            _ => CatalogFormat::Markup,
        }
    }

    pub fn labels(&self) -> Labels {
        let defaults = Labels::default();
        let custom = &self.labels;
        let pick = |value: &Option<String>, default: String| value.clone().unwrap_or(default);

        Labels {
            confirm_idle: pick(&custom.confirm_idle, defaults.confirm_idle),
            confirm_active: pick(&custom.confirm_active, defaults.confirm_active),
            processing: pick(&custom.processing, defaults.processing),
            remaining: pick(&custom.remaining, defaults.remaining),
            insufficient: pick(&custom.insufficient, defaults.insufficient),
            success: pick(&custom.success, defaults.success),
            failure: pick(&custom.failure, defaults.failure),
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            default_budget: self.default_budget(),
            low_points_threshold: self.low_points_threshold(),
            exchange_delay: self.exchange_delay(),
            insufficient_flash: self.insufficient_flash(),
            labels: self.labels(),
        }
    }
}

impl Validate for ExchangeConfig {
    fn validate(&self) -> Result<()> {
        if let Some(delay) = self.timing.exchange_delay_ms {
            validate_positive_number("timing.exchange_delay_ms", delay, 1)?;
        }
        if let Some(flash) = self.timing.insufficient_flash_ms {
            validate_range("timing.insufficient_flash_ms", flash, 1, 60_000)?;
        }
        if let Some(path) = &self.catalog.path {
            validate_path("catalog.path", path)?;
        }

        let labels = self.labels();
        validate_non_empty_string("labels.confirm_idle", &labels.confirm_idle)?;
        validate_non_empty_string("labels.processing", &labels.processing)?;
        validate_template(
            "labels.confirm_active",
            &labels.confirm_active,
            &["count", "points"],
        )?;
        validate_template("labels.remaining", &labels.remaining, &["remaining"])?;
        validate_template("labels.insufficient", &labels.insufficient, &["shortfall"])?;
        validate_template(
            "labels.success",
            &labels.success,
            &["count", "points", "remaining"],
        )?;
        validate_template("labels.failure", &labels.failure, &["reason"])?;

        Ok(())
    }
}
