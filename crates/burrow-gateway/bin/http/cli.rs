use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "BURROW_LISTEN_ADDR";
pub const DATA_DIR_ENV: &str = "BURROW_DATA_DIR";
pub const BASE_URL_ENV: &str = "BURROW_BASE_URL";
pub const AUTH_USER_ENV: &str = "SHORTEN_AUTH_USER";
pub const AUTH_PASS_ENV: &str = "SHORTEN_AUTH_PASS";
pub const SESSION_LIFETIME_ENV: &str = "BURROW_SESSION_LIFETIME_SECS";
pub const BACKUP_INTERVAL_ENV: &str = "BURROW_BACKUP_INTERVAL_SECS";
pub const CODE_LENGTH_ENV: &str = "BURROW_CODE_LENGTH";
pub const SECURE_COOKIES_ENV: &str = "BURROW_SECURE_COOKIES";
pub const LOG_FORMAT_ENV: &str = "BURROW_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5768";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "burrow-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(long, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Public origin used in generated short URLs, e.g. `https://bur.row`.
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    #[arg(long, env = AUTH_USER_ENV)]
    pub auth_user: Option<String>,

    #[arg(long, env = AUTH_PASS_ENV, hide_env_values = true)]
    pub auth_pass: Option<String>,

    #[arg(long, env = SESSION_LIFETIME_ENV, default_value_t = 24 * 60 * 60)]
    pub session_lifetime_secs: u64,

    #[arg(long, env = BACKUP_INTERVAL_ENV, default_value_t = 5 * 60)]
    pub backup_interval_secs: u64,

    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = 6,
        value_parser = clap::value_parser!(u8).range(1..=64)
    )]
    pub code_length: u8,

    #[arg(long, env = SECURE_COOKIES_ENV)]
    pub secure_cookies: bool,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
