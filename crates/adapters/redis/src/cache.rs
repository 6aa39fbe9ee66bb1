//! Redis Cache 实现

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use shardbot_errors::{AppError, AppResult, ResourceKind};
use shardbot_ports::{KeyValuePool, PoolHandle};

use crate::pool::RedisPool;

/// 毫秒精度的过期时间，不足 1ms 的按 1ms 处理
fn ttl_millis(ttl: Duration) -> u64 {
    ttl.as_millis().clamp(1, u128::from(u64::MAX)) as u64
}

#[async_trait]
impl PoolHandle for RedisPool {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Redis
    }

    async fn close(&self) {
        self.shutdown();
    }
}

#[async_trait]
impl KeyValuePool for RedisPool {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.checkout().await?;
        conn.get(key)
            .await
            .map_err(|e| AppError::cache(format!("Redis get failed: {}", e)))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let mut conn = self.checkout().await?;
        match ttl {
            Some(duration) => conn
                .pset_ex(key, value, ttl_millis(duration))
                .await
                .map_err(|e| AppError::cache(format!("Redis set failed: {}", e))),
            None => conn
                .set(key, value)
                .await
                .map_err(|e| AppError::cache(format!("Redis set failed: {}", e))),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.checkout().await?;
        conn.del(key)
            .await
            .map_err(|e| AppError::cache(format!("Redis delete failed: {}", e)))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.checkout().await?;
        conn.exists(key)
            .await
            .map_err(|e| AppError::cache(format!("Redis exists failed: {}", e)))
    }
}
