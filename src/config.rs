use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_DEPARTMENT_MIN: u32 = 1;
const DEFAULT_DEPARTMENT_MAX: u32 = 18;
const DEFAULT_CACHE_TTL_MINUTES: u64 = 10;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigSortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigColorMode {
    Auto,
    Always,
    Never,
}

/// Extra classification terms, added on top of the built-in ones
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VocabularyConfig {
    #[serde(default)]
    pub(crate) incoming: Vec<String>,
    #[serde(default)]
    pub(crate) outgoing: Vec<String>,
    #[serde(default)]
    pub(crate) missed: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) pbx_api_url: Option<String>,
    #[serde(default)]
    pub(crate) pbx_api_key: Option<String>,
    #[serde(default)]
    pub(crate) directory_url: Option<String>,
    #[serde(default)]
    pub(crate) directory_token: Option<String>,
    #[serde(default)]
    pub(crate) department_min: Option<u32>,
    #[serde(default)]
    pub(crate) department_max: Option<u32>,
    #[serde(default)]
    pub(crate) cache_ttl_minutes: Option<u64>,
    #[serde(default)]
    pub(crate) concurrency: Option<usize>,
    #[serde(default)]
    pub(crate) breakdown: bool,
    #[serde(default)]
    pub(crate) debug: bool,
    #[serde(default)]
    pub(crate) order: Option<ConfigSortOrder>,
    #[serde(default)]
    pub(crate) color: Option<ConfigColorMode>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    #[serde(default)]
    pub(crate) locale: Option<String>,
    #[serde(default)]
    pub(crate) vocabulary: VocabularyConfig,
}

impl Config {
    pub(crate) fn load() -> Self {
        Self::load_internal(false)
    }

    pub(crate) fn load_quiet() -> Self {
        Self::load_internal(true)
    }

    fn load_internal(quiet: bool) -> Self {
        let mut config = Self::load_file(quiet);
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn load_file(quiet: bool) -> Self {
        // Try config locations in order of priority
        for path in Self::get_config_paths() {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match toml::from_str::<Config>(&content) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "loaded config");
                        if !quiet {
                            eprintln!("Loaded config from {}", path.display());
                        }
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "invalid config file");
                        if !quiet {
                            eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                        }
                    }
                }
            }
        }

        Self::default()
    }

    /// Credentials and endpoints from the environment win over the file
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty("CALLSTATS_PBX_API_URL") {
            self.pbx_api_url = Some(v);
        }
        if let Some(v) = non_empty("CALLSTATS_PBX_API_KEY") {
            self.pbx_api_key = Some(v);
        }
        if let Some(v) = non_empty("CALLSTATS_DIRECTORY_URL") {
            self.directory_url = Some(v);
        }
        if let Some(v) = non_empty("CALLSTATS_DIRECTORY_TOKEN") {
            self.directory_token = Some(v);
        }
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/callstats/config.toml (Linux/cross-platform)
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("callstats").join("config.toml"));
        }

        // 2. Platform config dir (macOS Application Support)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("callstats").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.callstats.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".callstats.toml"));
        }

        paths
    }

    pub(crate) fn department_range(&self) -> Result<std::ops::RangeInclusive<u32>, AppError> {
        let min = self.department_min.unwrap_or(DEFAULT_DEPARTMENT_MIN);
        let max = self.department_max.unwrap_or(DEFAULT_DEPARTMENT_MAX);
        if min > max {
            return Err(AppError::invalid_config(format!(
                "department_min ({min}) is greater than department_max ({max})"
            )));
        }
        Ok(min..=max)
    }

    pub(crate) fn cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.cache_ttl_minutes
                .unwrap_or(DEFAULT_CACHE_TTL_MINUTES)
                .saturating_mul(60),
        )
    }

    pub(crate) fn require_pbx(&self) -> Result<(&str, &str), AppError> {
        let url = self
            .pbx_api_url
            .as_deref()
            .ok_or(AppError::MissingConfig { key: "pbx_api_url" })?;
        let key = self
            .pbx_api_key
            .as_deref()
            .ok_or(AppError::MissingConfig { key: "pbx_api_key" })?;
        Ok((url, key))
    }

    pub(crate) fn require_directory(&self) -> Result<(&str, &str), AppError> {
        let url = self
            .directory_url
            .as_deref()
            .ok_or(AppError::MissingConfig {
                key: "directory_url",
            })?;
        let token = self
            .directory_token
            .as_deref()
            .ok_or(AppError::MissingConfig {
                key: "directory_token",
            })?;
        Ok((url, token))
    }
}
