//! Redis 连接管理

use std::sync::Arc;

use async_trait::async_trait;
use redis::{ErrorKind, RedisError};
use shardbot_config::RedisConfig;
use shardbot_errors::{AppError, AppResult, ResourceKind};
use shardbot_ports::{CacheConnector, KeyValuePool};

use crate::config::RedisPoolConfig;
use crate::pool::RedisPool;

/// 把建池失败归类为连通性、配置或通用启动错误
pub fn classify_error(err: RedisError) -> AppError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        AppError::connectivity(ResourceKind::Redis, err.to_string())
    } else if err.kind() == ErrorKind::InvalidClientConfig {
        AppError::configuration(format!("Invalid redis settings: {}", err))
    } else if err.is_io_error() {
        AppError::connectivity(ResourceKind::Redis, err.to_string())
    } else {
        AppError::resource_start(ResourceKind::Redis, err.to_string())
    }
}

/// 基于 redis-rs 的连接池创建器
#[derive(Debug, Default, Clone, Copy)]
pub struct RedisConnector;

#[async_trait]
impl CacheConnector for RedisConnector {
    async fn create_pool(&self, settings: &RedisConfig) -> AppResult<Arc<dyn KeyValuePool>> {
        let config = RedisPoolConfig::from_settings(settings)?;
        let pool = RedisPool::new(config).await?;
        Ok(Arc::new(pool))
    }
}
