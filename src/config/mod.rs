//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, str::FromStr, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{CliArgs, Command, DatabaseArgs, DatabaseOverride, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SETTINGS_BATCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STORAGE_REGION: &str = "us-east-1";
const DEFAULT_PRESIGN_TTL_SECS: u64 = 3600;
const MAX_PRESIGN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_REVALIDATION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RESPONSE_LIMIT: usize = 512;
const DEFAULT_RESPONSE_TTL_SECS: u64 = 60;
const DEFAULT_RESPONSE_BODY_LIMIT_BYTES: usize = 1024 * 1024;
const DEFAULT_AUTO_CONSUME_INTERVAL_MS: u64 = 5000;
const DEFAULT_CONSUME_BATCH_LIMIT: usize = 100;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub admin: AdminSettings,
    pub storage: StorageSettings,
    pub revalidation: RevalidationSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
    /// Upper bound for one settings batch transaction.
    pub settings_batch_timeout: Duration,
}

/// The shared admin secret pair. Either value may be missing; the auth
/// endpoint then reports a configuration error instead of rejecting callers.
#[derive(Clone)]
pub struct AdminSettings {
    pub username: Option<String>,
    pub password: Option<String>,
    pub protect_api: bool,
}

impl std::fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSettings")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("protect_api", &self.protect_api)
            .finish()
    }
}

#[derive(Clone)]
pub struct StorageSettings {
    pub endpoint: Option<Url>,
    pub bucket: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub public_base_url: Option<Url>,
    pub path_style: bool,
    pub presign_ttl: Duration,
}

impl std::fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSettings")
            .field("endpoint", &self.endpoint.as_ref().map(Url::as_str))
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("public_base_url", &self.public_base_url.as_ref().map(Url::as_str))
            .field("path_style", &self.path_style)
            .field("presign_ttl", &self.presign_ttl)
            .finish()
    }
}

#[derive(Clone)]
pub struct RevalidationSettings {
    pub endpoint: Option<Url>,
    pub secret: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for RevalidationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevalidationSettings")
            .field("endpoint", &self.endpoint.as_ref().map(Url::as_str))
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enable_response_cache: bool,
    pub response_limit: usize,
    pub response_ttl_seconds: u64,
    pub response_body_limit_bytes: usize,
    pub auto_consume_interval_ms: u64,
    pub consume_batch_limit: usize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Migrate(args)) | Some(Command::InitSettings(args)) => {
            raw.apply_database_override(&args.database)
        }
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    use clap::Parser;

    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    admin: RawAdminSettings,
    storage: RawStorageSettings,
    revalidation: RawRevalidationSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(protect) = overrides.admin_protect_api {
            self.admin.protect_api = Some(protect);
        }
        if let Some(enabled) = overrides.cache_enable_response_cache {
            self.cache.enable_response_cache = Some(enabled);
        }
        if let Some(endpoint) = overrides.revalidation_endpoint.as_ref() {
            self.revalidation.endpoint = Some(endpoint.clone());
        }

        self.apply_database_override(&overrides.database);
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            admin,
            storage,
            revalidation,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            admin: build_admin_settings(admin),
            storage: build_storage_settings(storage)?,
            revalidation: build_revalidation_settings(revalidation)?,
            cache: build_cache_settings(cache),
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = non_blank(database.url);

    let max_connections = non_zero_u32(
        database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .into(),
        "database.max_connections",
    )?;

    let batch_secs = database
        .settings_batch_timeout_seconds
        .unwrap_or(DEFAULT_SETTINGS_BATCH_TIMEOUT_SECS);
    if batch_secs == 0 {
        return Err(LoadError::invalid(
            "database.settings_batch_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(DatabaseSettings {
        url,
        max_connections,
        settings_batch_timeout: Duration::from_secs(batch_secs),
    })
}

fn build_admin_settings(admin: RawAdminSettings) -> AdminSettings {
    AdminSettings {
        username: non_blank(admin.username),
        password: non_blank(admin.password),
        protect_api: admin.protect_api.unwrap_or(true),
    }
}

fn build_storage_settings(storage: RawStorageSettings) -> Result<StorageSettings, LoadError> {
    let endpoint = parse_optional_url(storage.endpoint, "storage.endpoint")?;
    let public_base_url = parse_optional_url(storage.public_base_url, "storage.public_base_url")?;

    let ttl_secs = storage
        .presign_ttl_seconds
        .unwrap_or(DEFAULT_PRESIGN_TTL_SECS);
    if ttl_secs == 0 || ttl_secs > MAX_PRESIGN_TTL_SECS {
        return Err(LoadError::invalid(
            "storage.presign_ttl_seconds",
            format!("must be between 1 and {MAX_PRESIGN_TTL_SECS}"),
        ));
    }

    Ok(StorageSettings {
        endpoint,
        bucket: non_blank(storage.bucket),
        region: non_blank(storage.region).unwrap_or_else(|| DEFAULT_STORAGE_REGION.to_string()),
        access_key_id: non_blank(storage.access_key_id),
        secret_access_key: non_blank(storage.secret_access_key),
        public_base_url,
        path_style: storage.path_style.unwrap_or(false),
        presign_ttl: Duration::from_secs(ttl_secs),
    })
}

fn build_revalidation_settings(
    revalidation: RawRevalidationSettings,
) -> Result<RevalidationSettings, LoadError> {
    let endpoint = parse_optional_url(revalidation.endpoint, "revalidation.endpoint")?;
    let timeout_secs = revalidation
        .timeout_seconds
        .unwrap_or(DEFAULT_REVALIDATION_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "revalidation.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(RevalidationSettings {
        endpoint,
        secret: non_blank(revalidation.secret),
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> CacheSettings {
    CacheSettings {
        enable_response_cache: cache.enable_response_cache.unwrap_or(true),
        response_limit: cache.response_limit.unwrap_or(DEFAULT_RESPONSE_LIMIT),
        response_ttl_seconds: cache
            .response_ttl_seconds
            .unwrap_or(DEFAULT_RESPONSE_TTL_SECS),
        response_body_limit_bytes: cache
            .response_body_limit_bytes
            .unwrap_or(DEFAULT_RESPONSE_BODY_LIMIT_BYTES),
        auto_consume_interval_ms: cache
            .auto_consume_interval_ms
            .unwrap_or(DEFAULT_AUTO_CONSUME_INTERVAL_MS),
        consume_batch_limit: cache
            .consume_batch_limit
            .unwrap_or(DEFAULT_CONSUME_BATCH_LIMIT),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
    settings_batch_timeout_seconds: Option<u64>,
}

#[derive(Clone, Deserialize, Default)]
#[serde(default)]
struct RawAdminSettings {
    username: Option<String>,
    password: Option<String>,
    protect_api: Option<bool>,
}

impl std::fmt::Debug for RawAdminSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawAdminSettings")
            .field("username", &self.username)
            .field("protect_api", &self.protect_api)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    endpoint: Option<String>,
    bucket: Option<String>,
    region: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    public_base_url: Option<String>,
    path_style: Option<bool>,
    presign_ttl_seconds: Option<u64>,
}

impl std::fmt::Debug for RawStorageSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawStorageSettings")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize, Default)]
#[serde(default)]
struct RawRevalidationSettings {
    endpoint: Option<String>,
    secret: Option<String>,
    timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for RawRevalidationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawRevalidationSettings")
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enable_response_cache: Option<bool>,
    response_limit: Option<usize>,
    response_ttl_seconds: Option<u64>,
    response_body_limit_bytes: Option<usize>,
    auto_consume_interval_ms: Option<u64>,
    consume_batch_limit: Option<usize>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_optional_url(value: Option<String>, key: &'static str) -> Result<Option<Url>, LoadError> {
    non_blank(value)
        .map(|raw| {
            Url::parse(&raw).map_err(|err| LoadError::invalid(key, format!("invalid URL: {err}")))
        })
        .transpose()
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
