//! Redis 连接池管理
//!
//! 提供连接池、并发控制与关闭

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use redis::Client;
use redis::aio::ConnectionManager;
use shardbot_errors::{AppError, AppResult, ResourceKind};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info};

use crate::config::{RedisPoolConfig, redact_url};
use crate::connection::classify_error;

/// Redis 连接池
pub struct RedisPool {
    /// 连接管理器列表，关闭后清空
    connections: RwLock<Vec<ConnectionManager>>,
    /// 并发控制信号量
    semaphore: Arc<Semaphore>,
    /// 轮询索引
    round_robin_index: AtomicUsize,
}

impl RedisPool {
    /// 创建新的连接池
    ///
    /// 每个连接都在 `connection_timeout` 内建立，否则视为服务不可达。
    pub async fn new(config: RedisPoolConfig) -> AppResult<Self> {
        let pool_size = config.pool_size as usize;
        let mut connections = Vec::with_capacity(pool_size);

        // 创建 Redis 客户端
        let client = Client::open(config.url.as_str()).map_err(classify_error)?;

        // 创建多个连接管理器
        for i in 0..pool_size {
            let conn = tokio::time::timeout(
                config.connection_timeout,
                ConnectionManager::new(client.clone()),
            )
            .await
            .map_err(|_| {
                AppError::connectivity(
                    ResourceKind::Redis,
                    format!(
                        "Timed out after {:?} opening connection {}",
                        config.connection_timeout, i
                    ),
                )
            })?
            .map_err(classify_error)?;
            connections.push(conn);
        }

        info!(
            pool_size = pool_size,
            url = %redact_url(&config.url),
            "Redis connection pool created"
        );

        Ok(Self {
            connections: RwLock::new(connections),
            semaphore: Arc::new(Semaphore::new(pool_size)),
            round_robin_index: AtomicUsize::new(0),
        })
    }

    /// 借出一个连接
    pub async fn checkout(&self) -> AppResult<PooledConnection> {
        // 获取信号量许可，连接池关闭后失败
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::cache("Redis pool is closed"))?;

        // 选择一个连接（轮询）
        let conn = {
            let connections = self.connections.read();
            if connections.is_empty() {
                return Err(AppError::cache("Redis pool is closed"));
            }
            let index =
                self.round_robin_index.fetch_add(1, Ordering::SeqCst) % connections.len();
            connections[index].clone()
        };

        Ok(PooledConnection {
            conn,
            _permit: permit,
        })
    }

    /// 关闭连接池
    ///
    /// 之后的 [`RedisPool::checkout`] 都会失败；已借出的连接在 drop 后释放。
    pub fn shutdown(&self) {
        self.semaphore.close();
        let dropped = {
            let mut connections = self.connections.write();
            let count = connections.len();
            connections.clear();
            count
        };
        debug!(connections = dropped, "Redis pool closed");
    }
}

/// 池化的连接，drop 时归还信号量许可
pub struct PooledConnection {
    conn: ConnectionManager,
    _permit: OwnedSemaphorePermit,
}

impl std::ops::Deref for PooledConnection {
    type Target = ConnectionManager;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl std::ops::DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardbot_errors::ErrorCategory;
    use std::time::Duration;

    #[tokio::test]
    async fn test_unreachable_server_is_connectivity() {
        // 端口 1 上没有 Redis
        let config = RedisPoolConfig::new("redis://127.0.0.1:1/0")
            .with_pool_size(1)
            .with_connection_timeout(Duration::from_secs(2));
        let err = RedisPool::new(config).await.err().unwrap();
        assert_eq!(err.category(), ErrorCategory::Connectivity);
    }

    #[tokio::test]
    async fn test_invalid_url_is_configuration() {
        let err = RedisPool::new(RedisPoolConfig::new("not-a-url")).await.err().unwrap();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[tokio::test]
    #[ignore] // 需要 Redis 实例
    async fn test_checkout_fails_after_shutdown() {
        let config = RedisPoolConfig::new("redis://127.0.0.1:6379").with_pool_size(2);
        let pool = RedisPool::new(config).await.unwrap();

        let conn = pool.checkout().await.unwrap();
        drop(conn);

        pool.shutdown();
        assert!(pool.checkout().await.is_err());
    }
}
