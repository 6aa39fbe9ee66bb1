//! Cache trait 定义

use async_trait::async_trait;
use shardbot_errors::AppResult;
use std::time::Duration;

use crate::PoolHandle;

/// 键值缓存连接池
#[async_trait]
pub trait KeyValuePool: PoolHandle {
    /// 获取缓存值
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除缓存
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 检查是否存在
    async fn exists(&self, key: &str) -> AppResult<bool>;
}
