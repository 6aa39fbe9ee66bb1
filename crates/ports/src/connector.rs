//! 连接池创建 trait 定义

use std::sync::Arc;

use async_trait::async_trait;
use shardbot_config::{DatabaseConfig, RedisConfig};
use shardbot_errors::AppResult;

use crate::{KeyValuePool, SqlPool};

/// 数据库连接池创建器
///
/// 失败时必须区分配置缺失、连接被拒绝与其它错误。
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    async fn create_pool(&self, settings: &DatabaseConfig) -> AppResult<Arc<dyn SqlPool>>;
}

/// Redis 连接池创建器
#[async_trait]
pub trait CacheConnector: Send + Sync {
    async fn create_pool(&self, settings: &RedisConfig) -> AppResult<Arc<dyn KeyValuePool>>;
}
