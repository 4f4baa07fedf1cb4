use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::ai_provider::{
    AIConfig, AIProvider, AIProviderClient, CannedGenerator, TextGenerator, DEFAULT_TIMEOUT_SECS,
};
use crate::core::StateStore;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub pet_name: String,
    pub provider: AIProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub strict_mode: bool,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::new(),
            pet_name: "Ember".to_string(),
            provider: AIProvider::Disabled,
            model: None,
            api_key: None,
            base_url: None,
            max_tokens: 512,
            temperature: 0.7,
            strict_mode: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load `<data_dir>/config.json`, creating it with defaults when missing,
    /// then apply environment overrides.
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir.or_else(|| std::env::var_os("EMBER_DATA_DIR").map(PathBuf::from)) {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let mut config = Self::load_file(&data_dir)?;
        config.data_dir = data_dir;
        config.apply_env();
        Ok(config)
    }

    fn load_file(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);

        if !config_path.exists() {
            let config = Config::default();
            let json_str = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config")?;
            if let Err(e) = std::fs::write(&config_path, json_str) {
                warn!(path = %config_path.display(), error = %e, "could not write default config");
            } else {
                info!(path = %config_path.display(), "created default config");
            }
            return Ok(config);
        }

        let config_str =
            std::fs::read_to_string(&config_path).context("Failed to read config.json")?;

        if config_str.trim().is_empty() {
            warn!(path = %config_path.display(), "config file is empty, using defaults");
            return Ok(Config::default());
        }

        match serde_json::from_str::<Config>(&config_str) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(path = %config_path.display(), error = %e, "failed to parse config, using defaults");
                Ok(Config::default())
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("EMBER_PROVIDER") {
            match provider.parse() {
                Ok(provider) => self.provider = provider,
                Err(e) => warn!(error = %e, "ignoring EMBER_PROVIDER"),
            }
        }

        if let Ok(model) = std::env::var("EMBER_MODEL") {
            if !model.is_empty() {
                self.model = Some(model);
            }
        }

        if let Ok(strict) = std::env::var("EMBER_STRICT_MODE") {
            self.strict_mode = parse_flag(&strict).unwrap_or(self.strict_mode);
        }

        if self.api_key.as_ref().map_or(true, |key| key.is_empty()) {
            if let Some(var) = self.provider.api_key_env() {
                self.api_key = std::env::var(var).ok();
            }
        }
    }

    /// Persist a new pet name. Rewrites the file from its on-disk contents so
    /// environment overrides (API keys included) never end up in config.json.
    pub fn save_pet_name(&mut self, name: &str) -> Result<()> {
        let mut on_disk = Self::load_file(&self.data_dir)?;
        on_disk.pet_name = name.to_string();

        let json_str =
            serde_json::to_string_pretty(&on_disk).context("Failed to serialize config")?;
        std::fs::write(self.data_dir.join(CONFIG_FILE), json_str)
            .context("Failed to write config.json")?;

        self.pet_name = on_disk.pet_name;
        Ok(())
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn get_ai_config(&self) -> AIConfig {
        AIConfig {
            provider: self.provider,
            model: self.model(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Pick the generator for the configured provider. A disabled provider,
    /// or a client that fails to build, yields the always-failing stub.
    pub fn text_generator(&self) -> Box<dyn TextGenerator> {
        if self.provider == AIProvider::Disabled {
            return Box::new(CannedGenerator::failing());
        }

        match AIProviderClient::new(self.get_ai_config()) {
            Ok(client) => Box::new(client),
            Err(e) => {
                warn!(error = %e, "failed to build AI client, replies will use fallbacks");
                Box::new(CannedGenerator::failing())
            }
        }
    }

    pub fn store(&self) -> StateStore {
        StateStore::new(self.data_dir.clone())
    }
}

fn default_data_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not find config directory")?
        .join("ember"))
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
