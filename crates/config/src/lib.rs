//! shardbot-config - 配置加载库

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "config/config.toml";

/// 默认建表脚本路径
pub const DEFAULT_SCHEMA_FILE: &str = "config/database.pgsql";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 数据库配置
///
/// 连接参数既可以是完整的 `url`，也可以是 host/port/user/password/database 组件。
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub enabled: bool,
    pub url: Option<Secret<String>>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<Secret<String>>,
    pub database: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_schema_file")]
    pub schema_file: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            schema_file: default_schema_file(),
        }
    }
}

fn default_max_connections() -> u32 {
    // 根据环境自动调整连接池大小
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_schema_file() -> PathBuf {
    PathBuf::from(DEFAULT_SCHEMA_FILE)
}

/// Redis 配置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub enabled: bool,
    pub url: Option<Secret<String>>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db: Option<u8>,
    pub password: Option<Secret<String>>,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_redis_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            host: None,
            port: None,
            db: None,
            password: None,
            pool_size: default_pool_size(),
            connect_timeout_secs: default_redis_timeout_secs(),
        }
    }
}

fn default_pool_size() -> u32 {
    4
}

fn default_redis_timeout_secs() -> u64 {
    10
}

/// 生命周期配置
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    /// 收到中断信号并登出后，等待客户端主循环退出的秒数
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

fn default_shutdown_grace_secs() -> u64 {
    10
}

/// 应用配置
///
/// 缺省的 `database` / `redis` section 视为禁用。
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// 启动时加载的扩展
    #[serde(default)]
    pub extensions: Vec<String>,
    /// 业务相关的任意配置
    #[serde(default)]
    pub bot: BTreeMap<String, serde_json::Value>,
}

fn default_app_name() -> String {
    "shardbot".to_string()
}

fn default_app_env() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_env: default_app_env(),
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            lifecycle: LifecycleConfig::default(),
            extensions: Vec::new(),
            bot: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 环境变量以 `SHARDBOT_` 为前缀，嵌套层级用 `__` 分隔，
    /// 例如 `SHARDBOT_DATABASE__ENABLED=false`。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        Self::from_figment(
            Figment::new()
                .merge(Toml::file(path))
                .merge(Env::prefixed("SHARDBOT_").split("__")),
        )
    }

    /// 从 TOML 字符串解析（不读取环境变量）
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::from_figment(Figment::from(Toml::string(toml)))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        Ok(config)
    }

    /// 读取业务配置项
    pub fn bot_setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.bot.get(key)
    }
}
