//! PostgreSQL 配置模块
//!
//! 把配置文件中的 `database` section 转成 sqlx 连接参数

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use shardbot_config::DatabaseConfig;
use shardbot_errors::{AppError, AppResult, ResourceKind};
use sqlx::postgres::PgConnectOptions;

/// PostgreSQL 配置
#[derive(Clone)]
pub struct PostgresConfig {
    // 基础配置
    /// 数据库 URL，设置后忽略下面的组件
    pub url: Option<String>,
    /// 主机
    pub host: String,
    /// 端口
    pub port: u16,
    /// 数据库名
    pub database: String,
    /// 用户名
    pub username: String,
    /// 密码
    pub password: Option<String>,

    // 连接池配置
    /// 最小连接数
    pub pool_min: u32,
    /// 最大连接数
    pub pool_max: u32,
    /// 获取连接超时
    pub acquire_timeout: Duration,
    /// 空闲超时
    pub idle_timeout: Duration,
}

impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("pool_min", &self.pool_min)
            .field("pool_max", &self.pool_max)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            username: "postgres".to_string(),
            password: None,
            pool_min: 1,
            pool_max: 10,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl PostgresConfig {
    /// 从 URL 创建配置
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// 从组件创建配置
    pub fn from_components(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    /// 从配置文件的 `database` section 创建
    ///
    /// 没有 `url` 时至少需要 `user` 和 `database`。
    pub fn from_settings(settings: &DatabaseConfig) -> AppResult<Self> {
        let config = match &settings.url {
            Some(url) => Self::new(url.expose_secret().clone()),
            None => {
                let user = settings
                    .user
                    .as_deref()
                    .ok_or_else(|| AppError::missing_settings(ResourceKind::Database, "user"))?;
                let database = settings
                    .database
                    .as_deref()
                    .ok_or_else(|| AppError::missing_settings(ResourceKind::Database, "database"))?;
                let config = Self::from_components(
                    settings.host.as_deref().unwrap_or("localhost"),
                    settings.port.unwrap_or(5432),
                    database,
                    user,
                );
                match &settings.password {
                    Some(password) => config.with_password(password.expose_secret().clone()),
                    None => config,
                }
            }
        };

        Ok(config
            .with_pool(settings.min_connections, settings.max_connections)
            .with_acquire_timeout(Duration::from_secs(settings.connect_timeout_secs)))
    }

    /// 设置密码
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// 设置连接池配置
    pub fn with_pool(mut self, min: u32, max: u32) -> Self {
        self.pool_min = min;
        self.pool_max = max.max(min).max(1);
        self
    }

    /// 设置获取连接超时
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// 构建 sqlx 连接参数
    pub fn connect_options(&self) -> AppResult<PgConnectOptions> {
        Ok(match &self.url {
            Some(url) => PgConnectOptions::from_str(url)
                .map_err(|e| AppError::configuration(format!("Invalid database url: {}", e)))?,
            None => {
                let options = PgConnectOptions::new()
                    .host(&self.host)
                    .port(self.port)
                    .database(&self.database)
                    .username(&self.username);
                match &self.password {
                    Some(password) => options.password(password),
                    None => options,
                }
            }
        })
    }
}
