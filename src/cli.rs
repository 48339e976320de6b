//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, health), and their associated argument structs.
//! Every flag has an environment variable equivalent for container
//! deployments.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "tagrelay",
    version,
    about = "First-party analytics collection proxy",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        tagrelay run --allow-origins https://example.com    Start on :8080\n  \
        ALLOW_ORIGINS=https://example.com tagrelay run      Same, via env\n\n  \
        Docs: https://github.com/tagrelay/tagrelay"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Run(Box<RunArgs>),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        tagrelay run --allow-origins https://example.com              Defaults\n  \
        tagrelay run --cookie-domain example.com --force-region       EU routing\n  \
        tagrelay run -p 3000 --pretty                                 Local dev mode")]
pub struct RunArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Proxy Policy --
    /// Allow-listed CORS origins (comma-separated, exact match)
    #[arg(
        long,
        env = "ALLOW_ORIGINS",
        default_value = "",
        help_heading = "Proxy Policy"
    )]
    pub allow_origins: String,

    /// First-party identity cookie name
    #[arg(
        long,
        env = "FPID_COOKIE",
        default_value = "fpid",
        help_heading = "Proxy Policy"
    )]
    pub cookie_name: String,

    /// Domain attribute for the identity cookie
    #[arg(long, env = "COOKIE_DOMAIN", help_heading = "Proxy Policy")]
    pub cookie_domain: Option<String>,

    /// Route browser hits through the region-restricted collection origin
    #[arg(long, env = "FORCE_REGION", help_heading = "Proxy Policy")]
    pub force_region: bool,

    // -- Upstream Origins --
    /// Tag-management script origin
    #[arg(
        long,
        env = "SCRIPT_ORIGIN",
        default_value = "https://www.googletagmanager.com",
        help_heading = "Upstream Origins"
    )]
    pub script_origin: String,

    /// Default collection origin (browser hits and Measurement Protocol)
    #[arg(
        long,
        env = "COLLECT_ORIGIN",
        default_value = "https://www.google-analytics.com",
        help_heading = "Upstream Origins"
    )]
    pub collect_origin: String,

    /// Region-restricted collection origin
    #[arg(
        long,
        env = "REGION_ORIGIN",
        default_value = "https://region1.google-analytics.com",
        help_heading = "Upstream Origins"
    )]
    pub region_origin: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 1_048_576,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:8080")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
