use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.yaml";

const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

const MIB: u64 = 1024 * 1024;
const DEFAULT_MEMORY_COST_LIMIT: u64 = 300 * MIB;
const DEFAULT_MEMORY_COUNT_LIMIT: usize = 150;
const DEFAULT_MEMORY_EXPIRATION_SECS: u64 = 600;
const DEFAULT_DISK_SIZE_LIMIT: u64 = 1000 * MIB;
const DEFAULT_DISK_EXPIRATION_DAYS: u64 = 20;

const DEFAULT_PLACEHOLDER_COUNT_LIMIT: usize = 200;
const DEFAULT_PLACEHOLDER_COST_LIMIT: u64 = 100 * MIB;

const DEFAULT_THUMBNAIL_COUNT_LIMIT: usize = 50;
const DEFAULT_THUMBNAIL_COST_LIMIT: u64 = 100 * MIB;

/// Page fetching
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Limits for the two-tier image cache
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Total bytes held in memory
    #[serde(default = "default_memory_cost_limit")]
    pub memory_cost_limit: u64,

    /// Number of entries held in memory
    #[serde(default = "default_memory_count_limit")]
    pub memory_count_limit: usize,

    /// Seconds an in-memory entry lives after its last access
    #[serde(default = "default_memory_expiration_secs")]
    pub memory_expiration_secs: u64,

    /// Total bytes kept on disk
    #[serde(default = "default_disk_size_limit")]
    pub disk_size_limit: u64,

    /// Days a file on disk lives after its last access
    #[serde(default = "default_disk_expiration_days")]
    pub disk_expiration_days: u64,

    /// Cache directory; relative paths are resolved against the base path
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_cost_limit: DEFAULT_MEMORY_COST_LIMIT,
            memory_count_limit: DEFAULT_MEMORY_COUNT_LIMIT,
            memory_expiration_secs: DEFAULT_MEMORY_EXPIRATION_SECS,
            disk_size_limit: DEFAULT_DISK_SIZE_LIMIT,
            disk_expiration_days: DEFAULT_DISK_EXPIRATION_DAYS,
            dir: default_cache_dir(),
        }
    }
}

impl CacheConfig {
    pub fn memory_expiration(&self) -> Duration {
        Duration::from_secs(self.memory_expiration_secs)
    }

    pub fn disk_expiration(&self) -> Duration {
        Duration::from_secs(self.disk_expiration_days * 24 * 60 * 60)
    }
}

/// Limits for decoded placeholder images
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    #[serde(default = "default_placeholder_count_limit")]
    pub count_limit: usize,

    #[serde(default = "default_placeholder_cost_limit")]
    pub cost_limit: u64,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            count_limit: DEFAULT_PLACEHOLDER_COUNT_LIMIT,
            cost_limit: DEFAULT_PLACEHOLDER_COST_LIMIT,
        }
    }
}

/// Limits for generated video thumbnails
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    #[serde(default = "default_thumbnail_count_limit")]
    pub count_limit: usize,

    /// Total decoded pixel bytes
    #[serde(default = "default_thumbnail_cost_limit")]
    pub cost_limit: u64,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            count_limit: DEFAULT_THUMBNAIL_COUNT_LIMIT,
            cost_limit: DEFAULT_THUMBNAIL_COST_LIMIT,
        }
    }
}

fn default_user_agent() -> String {
    USER_AGENT_DEFAULT.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_memory_cost_limit() -> u64 {
    DEFAULT_MEMORY_COST_LIMIT
}

fn default_memory_count_limit() -> usize {
    DEFAULT_MEMORY_COUNT_LIMIT
}

fn default_memory_expiration_secs() -> u64 {
    DEFAULT_MEMORY_EXPIRATION_SECS
}

fn default_disk_size_limit() -> u64 {
    DEFAULT_DISK_SIZE_LIMIT
}

fn default_disk_expiration_days() -> u64 {
    DEFAULT_DISK_EXPIRATION_DAYS
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_placeholder_count_limit() -> usize {
    DEFAULT_PLACEHOLDER_COUNT_LIMIT
}

fn default_placeholder_cost_limit() -> u64 {
    DEFAULT_PLACEHOLDER_COST_LIMIT
}

fn default_thumbnail_count_limit() -> usize {
    DEFAULT_THUMBNAIL_COUNT_LIMIT
}

fn default_thumbnail_cost_limit() -> u64 {
    DEFAULT_THUMBNAIL_COST_LIMIT
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub placeholder: PlaceholderConfig,
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be greater than 0");
        }
        if self.cache.memory_count_limit == 0 {
            bail!("cache.memory_count_limit must be greater than 0");
        }
        if self.cache.memory_cost_limit == 0 {
            bail!("cache.memory_cost_limit must be greater than 0");
        }
        if self.cache.disk_size_limit == 0 {
            bail!("cache.disk_size_limit must be greater than 0");
        }
        if self.placeholder.count_limit == 0 {
            bail!("placeholder.count_limit must be greater than 0");
        }
        if self.thumbnail.count_limit == 0 {
            bail!("thumbnail.count_limit must be greater than 0");
        }
        Ok(())
    }

    /// Loads `config.yaml` from `base_path`, writing the defaults first if the
    /// file does not exist yet.
    pub fn load_with(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref();
        std::fs::create_dir_all(base_path)
            .with_context(|| format!("failed to create {}", base_path.display()))?;

        let config_path = base_path.join(CONFIG_FILE);
        if !config_path.exists() {
            let defaults = serde_yml::to_string(&Self::default())?;
            std::fs::write(&config_path, defaults)
                .with_context(|| format!("failed to write {}", config_path.display()))?;
        }

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_path_buf();
        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(self.base_path.join(CONFIG_FILE), config_str)
            .context("failed to save config")?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn cache_dir(&self) -> PathBuf {
        if self.cache.dir.is_absolute() {
            self.cache.dir.clone()
        } else {
            self.base_path.join(&self.cache.dir)
        }
    }
}
