use anyhow::{Result, anyhow};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub events: Events,
    pub grpc: Grpc,
    pub http: Http,
    pub log: Log,
    pub mongo: Mongo,
    pub rabbitmq: RabbitMq,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct Events {
    pub backend: String, // "fake" or "real"
}

#[derive(Debug, Deserialize)]
pub struct Grpc {
    pub address: String,
    pub reflection: bool,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub list_timeout_secs: u64,
}

impl Http {
    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Deserialize)]
pub struct Mongo {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub min_pool_size: u32,
    pub max_pool_size: u32,
}

#[derive(Deserialize)]
pub struct RabbitMq {
    pub uri: String,
    pub connect_attempts: u32,
    pub connect_delay_secs: u64,
}

impl RabbitMq {
    pub fn connect_delay(&self) -> Duration {
        Duration::from_secs(self.connect_delay_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub backend: String, // "fake" or "real"
}

// Connection strings may carry credentials.
impl std::fmt::Debug for Mongo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mongo")
            .field("uri", &"<redacted>")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("min_pool_size", &self.min_pool_size)
            .field("max_pool_size", &self.max_pool_size)
            .finish()
    }
}

impl std::fmt::Debug for RabbitMq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RabbitMq")
            .field("uri", &"<redacted>")
            .field("connect_attempts", &self.connect_attempts)
            .field("connect_delay_secs", &self.connect_delay_secs)
            .finish()
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "USER_DIRECTORY";

/// Flat variables the service has always been deployed with. They win
/// over everything else.
const LEGACY_ENV: [(&str, &str); 3] = [
    ("MONGO_URI", "mongo.uri"),
    ("DB", "mongo.database"),
    ("RABBITMQ_URI", "rabbitmq.uri"),
];

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    // A missing .env is the normal case outside local development.
    let _ = dotenvy::dotenv();

    let builder = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let settings: Settings = with_legacy_env(builder, |name| std::env::var(name).ok())?
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

fn with_legacy_env(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>> {
    for (var, key) in LEGACY_ENV {
        builder = builder
            .set_override_option(key, lookup(var))
            .map_err(|e| anyhow!(e))?;
    }
    Ok(builder)
}
