use crate::context::DEFAULT_ANNOTATION_KEY;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// One datasource: a name plus a SQLite connection string and pool limits
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DatasourceConfig {
    pub name: String,
    #[serde(default = "default_url")]
    pub url: String,
    /// Connections open at once; `0` means unlimited
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Connections kept open while unused; `0` closes every returned connection
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
    /// How long a checkout waits for a busy pool before failing
    #[serde(default = "default_pool_timeout_seconds")]
    pub pool_timeout_seconds: u64,
}

fn default_url() -> String {
    ":memory:".to_string()
}

fn default_max_connections() -> usize {
    0
}

fn default_max_idle_connections() -> usize {
    2
}

fn default_pool_timeout_seconds() -> u64 {
    30
}

fn default_annotation_key() -> String {
    DEFAULT_ANNOTATION_KEY.to_string()
}

impl DatasourceConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        DatasourceConfig {
            name: name.into(),
            url: url.into(),
            max_connections: default_max_connections(),
            max_idle_connections: default_max_idle_connections(),
            pool_timeout_seconds: default_pool_timeout_seconds(),
        }
    }

    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn max_idle_connections(mut self, max_idle_connections: usize) -> Self {
        self.max_idle_connections = max_idle_connections;
        self
    }

    pub fn pool_timeout_seconds(mut self, pool_timeout_seconds: u64) -> Self {
        self.pool_timeout_seconds = pool_timeout_seconds;
        self
    }
}

/// The `[orm]` configuration section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OrmConfig {
    #[serde(default = "default_annotation_key")]
    pub annotation_key: String,
    #[serde(default)]
    pub datasources: Vec<DatasourceConfig>,
}

impl Default for OrmConfig {
    fn default() -> Self {
        OrmConfig {
            annotation_key: default_annotation_key(),
            datasources: Vec::new(),
        }
    }
}

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "TAGSQL";

impl OrmConfig {
    /// Load the configuration from `config/config.toml`, overridden by `TAGSQL__*` env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load the configuration from `path` (optional) and the environment
    ///
    /// A file that exists but cannot be read or parsed is reported with a
    /// warning and ignored; the environment alone is used then.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(environment());

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new(path).exists() {
                    log::warn!("failed to load config file {path}, falling back to env: {err}");
                }
                Config::builder()
                    .add_source(environment())
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };

        match settings.get::<OrmConfig>("orm") {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(OrmConfig::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "ORM configuration could not be loaded from file or environment: {e}"
            ))),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}
