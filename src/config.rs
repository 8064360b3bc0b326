//! Runtime configuration.
//!
//! Layers, lowest precedence first:
//! 1. built-in defaults
//! 2. TOML file (`--config`, or `fprice.toml` in the working directory)
//! 3. environment (`.env` is loaded first): `FPRICE_DATA`, `FPRICE_MODEL`,
//!    `FPRICE_ENCODERS`, `FPRICE_OUTPUTS`, `FPRICE_PREDICT_URL`
//! 4. command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::AssetArgs;
use crate::domain::{FeatureSchema, FilterOrder, Variant};
use crate::error::AppError;

const DEFAULT_CONFIG_FILE: &str = "fprice.toml";
const DEFAULT_DATA: &str = "data/wfp_food_prices_lka.csv";
const DEFAULT_MODEL: &str = "models/model.json";
const DEFAULT_ENCODERS: &str = "models/encoders.json";
const DEFAULT_OUTPUTS: &str = "outputs";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Resolved configuration used by the pipeline and front-ends.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
    pub outputs_dir: PathBuf,
    /// When set, predictions go to this HTTP endpoint instead of the local model.
    pub predict_url: Option<String>,
    pub predict_timeout: Duration,
    pub variant: Variant,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA),
            model_path: PathBuf::from(DEFAULT_MODEL),
            encoders_path: PathBuf::from(DEFAULT_ENCODERS),
            outputs_dir: PathBuf::from(DEFAULT_OUTPUTS),
            predict_url: None,
            predict_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            variant: Variant::default(),
        }
    }
}

/// On-disk TOML shape. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data: Option<PathBuf>,
    pub model: Option<PathBuf>,
    pub encoders: Option<PathBuf>,
    pub outputs: Option<PathBuf>,
    pub schema: Option<FeatureSchema>,
    pub filter_order: Option<FilterOrder>,
    #[serde(default)]
    pub predict: PredictSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictSection {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::asset_missing(format!("Failed to read config '{}': {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| AppError::asset_invalid(format!("Failed to parse config TOML '{}': {e}", path.display())))
    }
}

impl AppConfig {
    /// Resolve all layers for the given command-line flags.
    pub fn load(args: &AssetArgs) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let file = match &args.config {
            Some(path) => Some(FileConfig::load(path)?),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Some(FileConfig::load(Path::new(DEFAULT_CONFIG_FILE))?),
            None => None,
        };

        let mut config = AppConfig::default();
        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_args(args);
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.data {
            self.data_path = v;
        }
        if let Some(v) = file.model {
            self.model_path = v;
        }
        if let Some(v) = file.encoders {
            self.encoders_path = v;
        }
        if let Some(v) = file.outputs {
            self.outputs_dir = v;
        }
        if let Some(v) = file.schema {
            self.variant.schema = v;
        }
        if let Some(v) = file.filter_order {
            self.variant.filter_order = v;
        }
        if let Some(v) = file.predict.url {
            self.predict_url = Some(v);
        }
        if let Some(v) = file.predict.timeout_secs {
            self.predict_timeout = Duration::from_secs(v);
        }
    }

    fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty("FPRICE_DATA") {
            self.data_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty("FPRICE_MODEL") {
            self.model_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty("FPRICE_ENCODERS") {
            self.encoders_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty("FPRICE_OUTPUTS") {
            self.outputs_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty("FPRICE_PREDICT_URL") {
            self.predict_url = Some(v);
        }
    }

    fn apply_args(&mut self, args: &AssetArgs) {
        if let Some(v) = &args.data {
            self.data_path = v.clone();
        }
        if let Some(v) = &args.model {
            self.model_path = v.clone();
        }
        if let Some(v) = &args.encoders {
            self.encoders_path = v.clone();
        }
        if let Some(v) = &args.outputs {
            self.outputs_dir = v.clone();
        }
        if let Some(v) = args.schema {
            self.variant.schema = v;
        }
        if let Some(v) = args.filter_order {
            self.variant.filter_order = v;
        }
        if let Some(v) = &args.predict_url {
            self.predict_url = Some(v.clone());
        }
    }
}
