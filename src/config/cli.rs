use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina storefront backend")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the storefront and admin API.
    Serve(Box<ServeArgs>),
    /// Apply pending SQL migrations and exit.
    Migrate(DatabaseArgs),
    /// Seed the default site settings without overwriting existing keys.
    #[command(name = "init-settings")]
    InitSettings(DatabaseArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Toggle the admin API guard.
    #[arg(
        long = "admin-protect-api",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub admin_protect_api: Option<bool>,

    /// Toggle the in-process response cache.
    #[arg(
        long = "cache-enable-response-cache",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enable_response_cache: Option<bool>,

    /// Override the remote revalidation endpoint.
    #[arg(long = "revalidation-endpoint", value_name = "URL")]
    pub revalidation_endpoint: Option<String>,
}
