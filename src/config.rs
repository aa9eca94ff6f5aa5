use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server address (e.g., "0.0.0.0:8080")
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Directory holding the built admin panel
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
    /// Document store configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Identity provider settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Public site hooks and locales
    #[serde(default)]
    pub site: SiteConfig,
    /// Image host settings
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which store implementation backs the collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// Database host
    #[serde(default = "default_db_host")]
    pub host: String,
    /// Database port
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Database name
    #[serde(default = "default_db_name", rename = "database")]
    pub name: String,
    /// Database user
    #[serde(default = "default_db_user", rename = "username")]
    pub user: String,
    /// Database password
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Token algorithm: "HS256" or "RS256"
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Shared secret for HS256 tokens
    #[serde(default)]
    pub secret: String,
    /// PEM file with the provider's public key for RS256 tokens
    #[serde(default)]
    pub public_key_pem: Option<PathBuf>,
    /// Expected `iss` claim (skipped when empty)
    #[serde(default)]
    pub issuer: String,
    /// Expected `aud` claim (skipped when empty)
    #[serde(default)]
    pub audience: String,
    /// E-mail addresses allowed into the admin panel; empty admits any verified identity
    #[serde(default)]
    pub admins: Vec<String>,
    /// Mark the session cookie Secure
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            secret: String::new(),
            public_key_pem: None,
            issuer: String::new(),
            audience: String::new(),
            admins: Vec::new(),
            secure_cookie: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Public site origin, used for links in push notifications
    #[serde(default)]
    pub base_url: String,
    /// Page cache invalidation endpoint (disabled when empty)
    #[serde(default)]
    pub revalidate_url: String,
    #[serde(default)]
    pub revalidate_secret: String,
    /// Push notification dispatch endpoint (disabled when empty)
    #[serde(default)]
    pub notify_url: String,
    #[serde(default)]
    pub notify_secret: String,
    /// Topic that every push notification fans out to
    #[serde(default = "default_notify_topic")]
    pub notify_topic: String,
    /// Directory of `<lang>.json` locale files
    #[serde(default = "default_locales_dir")]
    pub locales_dir: PathBuf,
    /// Language used when a request names none: ms, zh or en
    #[serde(default = "default_lang")]
    pub default_lang: String,
}

fn default_notify_topic() -> String {
    "all".to_string()
}

fn default_locales_dir() -> PathBuf {
    PathBuf::from("./locales")
}

fn default_lang() -> String {
    "ms".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            revalidate_url: String::new(),
            revalidate_secret: String::new(),
            notify_url: String::new(),
            notify_secret: String::new(),
            notify_topic: default_notify_topic(),
            locales_dir: default_locales_dir(),
            default_lang: default_lang(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Image host upload endpoint
    #[serde(default)]
    pub endpoint: String,
    /// Image host deletion endpoint
    #[serde(default)]
    pub delete_endpoint: String,
    /// Unsigned upload preset name sent with every upload
    #[serde(default)]
    pub preset: String,
    #[serde(default)]
    pub api_key: String,
    /// Maximum upload size in bytes (default: 10MB)
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            delete_endpoint: String::new(),
            preset: String::new(),
            api_key: String::new(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
    /// Rows per page in the admin tables
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

// Default value functions
fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("webapp/dist")
}

fn default_backend() -> StoreBackend {
    StoreBackend::Postgres
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "schoolsite".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_max_upload_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            static_dir: default_static_dir(),
            log: LogConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            site: SiteConfig::default(),
            upload: UploadConfig::default(),
            listing: ListingConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            user: default_db_user(),
            password: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// Generate database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
