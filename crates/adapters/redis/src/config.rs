//! Redis 配置模块
//!
//! 把配置文件中的 `redis` section 转成连接池参数

use std::time::Duration;

use secrecy::ExposeSecret;
use shardbot_config::RedisConfig;
use shardbot_errors::{AppError, AppResult, ResourceKind};

/// Redis 连接池配置
#[derive(Clone)]
pub struct RedisPoolConfig {
    /// Redis URL
    pub url: String,
    /// 连接数
    pub pool_size: u32,
    /// 建立单个连接的超时
    pub connection_timeout: Duration,
}

impl std::fmt::Debug for RedisPoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPoolConfig")
            .field("url", &redact_url(&self.url))
            .field("pool_size", &self.pool_size)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            pool_size: 4,
            connection_timeout: Duration::from_secs(10),
        }
    }
}

impl RedisPoolConfig {
    /// 创建新的配置
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// 从配置文件的 `redis` section 创建
    ///
    /// 没有 `url` 时至少需要 `host`。
    pub fn from_settings(settings: &RedisConfig) -> AppResult<Self> {
        let url = match &settings.url {
            Some(url) => url.expose_secret().clone(),
            None => {
                let host = settings
                    .host
                    .as_deref()
                    .ok_or_else(|| AppError::missing_settings(ResourceKind::Redis, "host"))?;
                let auth = settings
                    .password
                    .as_ref()
                    .map(|p| format!(":{}@", urlencoding::encode(p.expose_secret())))
                    .unwrap_or_default();
                format!(
                    "redis://{}{}:{}/{}",
                    auth,
                    host,
                    settings.port.unwrap_or(6379),
                    settings.db.unwrap_or(0)
                )
            }
        };

        Ok(Self::new(url)
            .with_pool_size(settings.pool_size)
            .with_connection_timeout(Duration::from_secs(settings.connect_timeout_secs)))
    }

    /// 设置连接数（至少为 1）
    pub fn with_pool_size(mut self, size: u32) -> Self {
        self.pool_size = size.max(1);
        self
    }

    /// 设置连接超时
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// 隐去 URL 中的密码
pub(crate) fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}[REDACTED]{}", &url[..scheme_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    #[test]
    fn test_default_config() {
        let config = RedisPoolConfig::default();
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.url, "redis://127.0.0.1:6379");
    }

    #[test]
    fn test_from_settings_components() {
        let settings = RedisConfig {
            enabled: true,
            host: Some("cache".to_string()),
            port: Some(6380),
            db: Some(2),
            password: Some(Secret::new("p@ss word".to_string())),
            pool_size: 0,
            ..Default::default()
        };
        let config = RedisPoolConfig::from_settings(&settings).unwrap();

        assert_eq!(config.url, "redis://:p%40ss%20word@cache:6380/2");
        assert_eq!(config.pool_size, 1);
    }

    #[test]
    fn test_from_settings_requires_host() {
        let settings = RedisConfig {
            enabled: true,
            ..Default::default()
        };
        let err = RedisPoolConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(
            err,
            AppError::MissingSettings { kind: ResourceKind::Redis, ref field } if field == "host"
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = RedisPoolConfig::new("redis://:hunter2@localhost:6379/0");
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("hunter2"));
        assert!(debug_output.contains("redis://[REDACTED]@localhost:6379/0"));
    }
}
