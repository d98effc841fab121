//! Configuration loader
//!
//! Sources are merged in this order, later ones overriding earlier ones:
//!
//! 1. `AppConfig::default()`
//! 2. TOML file (explicit path, or the first `flora.toml` found on the
//!    search path)
//! 3. Environment variables `FLORA__<SECTION>__<KEY>`

use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use flora_domain::error::{Error, Result};

use crate::config::{AppConfig, CacheBackend, LockBackend, ProviderConfig};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::log_config_loaded;

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load and validate configuration from all sources
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        match &self.config_path {
            Some(path) if path.exists() => {
                figment = figment.merge(Toml::file(path));
                log_config_loaded(path, true);
            }
            Some(path) => {
                log_config_loaded(path, false);
                return Err(Error::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            None => {
                if let Some(path) = Self::find_default_config_path() {
                    figment = figment.merge(Toml::file(&path));
                    log_config_loaded(&path, true);
                }
            }
        }

        let prefix = format!("{}{CONFIG_ENV_SEPARATOR}", self.env_prefix);
        figment = figment.merge(Env::prefixed(&prefix).split(CONFIG_ENV_SEPARATOR));

        let config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&config)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context(format!(
            "Failed to write config file {}",
            path.as_ref().display()
        ))?;

        Ok(())
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
            dirs::home_dir().map(|d| {
                d.join(format!(".{DEFAULT_CONFIG_DIR}"))
                    .join(DEFAULT_CONFIG_FILENAME)
            }),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_providers_config(config)?;
    validate_pool_config(config)?;
    validate_cache_config(config)?;
    validate_lock_config(config)?;
    Ok(())
}

fn validate_providers_config(config: &AppConfig) -> Result<()> {
    let providers = &config.providers;
    if providers.primary.is_disabled() && providers.secondary.is_disabled() {
        return Err(Error::config(
            "At least one identification provider must be enabled",
        ));
    }
    validate_provider("primary", &providers.primary)?;
    validate_provider("secondary", &providers.secondary)?;
    Ok(())
}

fn validate_provider(slot: &str, provider: &ProviderConfig) -> Result<()> {
    if provider.is_disabled() {
        return Ok(());
    }
    if provider.timeout_ms == 0 {
        return Err(Error::config(format!("providers.{slot}.timeout_ms cannot be 0")));
    }
    if provider.circuit.failure_threshold == 0 || provider.circuit.success_threshold == 0 {
        return Err(Error::config(format!(
            "providers.{slot}.circuit thresholds cannot be 0"
        )));
    }
    if provider.circuit.reset_timeout_secs == 0 {
        return Err(Error::config(format!(
            "providers.{slot}.circuit.reset_timeout_secs cannot be 0"
        )));
    }
    Ok(())
}

fn validate_pool_config(config: &AppConfig) -> Result<()> {
    if config.pool.size == Some(0) {
        return Err(Error::config("pool.size cannot be 0"));
    }
    Ok(())
}

fn validate_cache_config(config: &AppConfig) -> Result<()> {
    let cache = &config.cache;
    if !cache.enabled {
        return Ok(());
    }
    if cache.ttl_secs == 0 || cache.partial_ttl_secs == 0 {
        return Err(Error::config("Cache TTLs cannot be 0 when cache is enabled"));
    }
    if cache.provider == CacheBackend::Redis && cache.redis_url.is_none() {
        return Err(Error::config(
            "cache.redis_url is required when the Redis cache is selected",
        ));
    }
    Ok(())
}

fn validate_lock_config(config: &AppConfig) -> Result<()> {
    let lock = &config.lock;
    if lock.ttl_ms == 0
        || lock.acquire_timeout_ms == 0
        || lock.poll_interval_ms == 0
        || lock.poll_timeout_ms == 0
    {
        return Err(Error::config("Lock timings cannot be 0"));
    }
    if lock.direct_fill_permits == 0 {
        return Err(Error::config("lock.direct_fill_permits cannot be 0"));
    }

    // a lock that expires mid-fill lets a second caller start the same calls
    let longest_timeout = [&config.providers.primary, &config.providers.secondary]
        .into_iter()
        .filter(|p| !p.is_disabled())
        .map(|p| p.timeout_ms)
        .max()
        .unwrap_or(0);
    if lock.ttl_ms <= longest_timeout {
        return Err(Error::config(format!(
            "lock.ttl_ms ({}) must exceed the longest provider timeout ({longest_timeout}ms)",
            lock.ttl_ms
        )));
    }

    if lock.provider == LockBackend::Redis
        && lock.redis_url.is_none()
        && config.cache.redis_url.is_none()
    {
        return Err(Error::config(
            "lock.redis_url or cache.redis_url is required when the Redis lock is selected",
        ));
    }
    Ok(())
}
