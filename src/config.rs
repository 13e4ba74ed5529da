use crate::error::{AgriSenseError, Result};
use crate::logic::sensor::DEFAULT_LOCATION;
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_FARMER: &str = "demo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const TIMEOUT_RANGE_SECS: (u64, u64) = (1, 120);

pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Account key that history records are filed under.
    #[serde(default = "default_farmer")]
    pub farmer: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
}

fn default_farmer() -> String {
    DEFAULT_FARMER.into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groq: Option<ProviderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<ProviderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<ProviderConfig>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            groq: None,
            openai: None,
            gemini: None,
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ProviderConfig {
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            base_url: None,
            enabled: true,
        }
    }

    /// Enabled and carrying a non-blank credential.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorConfig {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
}

fn default_location() -> String {
    DEFAULT_LOCATION.into()
}

fn default_update_interval() -> u64 {
    5
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            update_interval_secs: default_update_interval(),
        }
    }
}

impl Config {
    /// Load from `config_override`, else the first config file found, else from
    /// `GROQ_API_KEY`, `OPENAI_API_KEY` and `GEMINI_API_KEY`.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) if !p.exists() => {
                return Err(AgriSenseError::Config(format!(
                    "Config file not found at {:?}. Run `agrisense init` to set up.",
                    p
                )));
            }
            Some(p) => p,
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::debug!("No config file found, using environment defaults");
                    return Ok(Self::from_env());
                }
            },
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| AgriSenseError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::parse(&config_str)?;
        tracing::debug!(path = %config_path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse YAML after `${VAR}` substitution, then validate.
    pub fn parse(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content, |name| std::env::var(name).ok());

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| AgriSenseError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Self {
        let from_var = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(ProviderConfig::with_key)
        };

        Self {
            farmer: default_farmer(),
            providers: ProvidersConfig {
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                groq: from_var("GROQ_API_KEY"),
                openai: from_var("OPENAI_API_KEY"),
                gemini: from_var("GEMINI_API_KEY"),
            },
            sensor: SensorConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (min, max) = TIMEOUT_RANGE_SECS;
        if !(min..=max).contains(&self.providers.timeout_secs) {
            return Err(AgriSenseError::Config(format!(
                "providers.timeout_secs must be between {} and {}, got {}",
                min, max, self.providers.timeout_secs
            )));
        }
        if self.farmer.trim().is_empty() {
            return Err(AgriSenseError::Config("farmer must not be empty".into()));
        }
        if self.sensor.update_interval_secs == 0 {
            return Err(AgriSenseError::Config(
                "sensor.update_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("agrisense").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Default path for writing new config files (~/.config/agrisense/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgriSenseError::Config("Cannot determine config directory".into()))?
            .join("agrisense");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up AgriSense!");
        println!();

        let farmer: String = Input::new()
            .with_prompt("  Farmer account")
            .default(DEFAULT_FARMER.into())
            .interact_text()
            .map_err(input_error)?;

        println!();
        println!("AI providers (leave a key blank to read it from the environment)");

        let groq = prompt_provider("Groq", "GROQ_API_KEY")?;
        let openai = prompt_provider("OpenAI", "OPENAI_API_KEY")?;
        let gemini = prompt_provider("Gemini", "GEMINI_API_KEY")?;

        let timeout_secs: u64 = Input::new()
            .with_prompt("  Request timeout (seconds)")
            .default(DEFAULT_TIMEOUT_SECS)
            .validate_with(|v: &u64| {
                let (min, max) = TIMEOUT_RANGE_SECS;
                if (min..=max).contains(v) {
                    Ok(())
                } else {
                    Err(format!("must be between {} and {}", min, max))
                }
            })
            .interact_text()
            .map_err(input_error)?;

        println!();
        println!("Sensor");
        let location: String = Input::new()
            .with_prompt("  Location")
            .default(DEFAULT_LOCATION.into())
            .interact_text()
            .map_err(input_error)?;

        println!();

        let config = Config {
            farmer,
            providers: ProvidersConfig {
                timeout_secs,
                groq: Some(groq),
                openai: Some(openai),
                gemini: Some(gemini),
            },
            sensor: SensorConfig {
                location,
                ..SensorConfig::default()
            },
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| AgriSenseError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# AgriSense Configuration\n# Generated by `agrisense init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        // Re-parse so placeholders resolve exactly as they will on the next run.
        let config = Self::parse(&std::fs::read_to_string(&config_path)?)?;
        Ok((config, config_path))
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("AGRISENSE_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| AgriSenseError::Config("Cannot determine data directory".into()))?
            .join("agrisense");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("agrisense.db"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            farmer: default_farmer(),
            providers: ProvidersConfig::default(),
            sensor: SensorConfig::default(),
        }
    }
}

fn input_error(e: dialoguer::Error) -> AgriSenseError {
    AgriSenseError::Config(format!("Input error: {}", e))
}

fn prompt_provider(name: &str, env_var: &str) -> Result<ProviderConfig> {
    let key: String = Password::new()
        .with_prompt(format!("  {} API key", name))
        .allow_empty_password(true)
        .interact()
        .map_err(input_error)?;

    let api_key = if key.trim().is_empty() {
        format!("${{{}}}", env_var)
    } else {
        key
    };
    Ok(ProviderConfig::with_key(api_key))
}

/// Replace every `${VAR_NAME}` with `lookup(VAR_NAME)`; unknown variables become empty.
fn substitute_env_vars(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    re.replace_all(content, |caps: &regex_lite::Captures| {
        lookup(&caps[1]).unwrap_or_default()
    })
    .into_owned()
}
