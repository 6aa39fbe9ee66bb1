//! 连接池启动器
//!
//! 每个资源独立地根据自己的配置 section 创建连接池。被禁用的资源直接跳过，
//! 不会调用对应的 connector。

use std::future::Future;
use std::sync::Arc;

use shardbot_config::{DatabaseConfig, RedisConfig};
use shardbot_errors::{AppError, AppResult, ResourceKind};
use shardbot_ports::{CacheConnector, DatabaseConnector, KeyValuePool, SqlPool};
use tracing::{error, info};

/// 启动数据库连接池
pub async fn start_database_pool(
    connector: &dyn DatabaseConnector,
    settings: &DatabaseConfig,
) -> AppResult<Option<Arc<dyn SqlPool>>> {
    start_pool(ResourceKind::Database, settings.enabled, || {
        connector.create_pool(settings)
    })
    .await
}

/// 启动 Redis 连接池
pub async fn start_redis_pool(
    connector: &dyn CacheConnector,
    settings: &RedisConfig,
) -> AppResult<Option<Arc<dyn KeyValuePool>>> {
    start_pool(ResourceKind::Redis, settings.enabled, || {
        connector.create_pool(settings)
    })
    .await
}

async fn start_pool<P, F, Fut>(kind: ResourceKind, enabled: bool, create: F) -> AppResult<Option<P>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<P>>,
{
    if !enabled {
        info!("{} connection has been disabled", kind.label());
        return Ok(None);
    }

    info!("Creating {} pool", kind);
    match create().await {
        Ok(pool) => {
            info!("Created {} pool successfully", kind);
            Ok(Some(pool))
        }
        Err(e) => {
            let e = attach_kind(kind, e);
            error!(resource = %kind, error = %e, "Failed to create {} pool", kind);
            Err(e)
        }
    }
}

/// 没有标明资源种类的错误统一归为该资源的启动错误
fn attach_kind(kind: ResourceKind, err: AppError) -> AppError {
    if err.resource_kind().is_some() || matches!(err, AppError::Configuration(_)) {
        err
    } else {
        AppError::resource_start(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use shardbot_errors::ErrorCategory;

    /// 只记录调用次数、总是失败的 connector
    #[derive(Default)]
    struct CountingConnector {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DatabaseConnector for CountingConnector {
        async fn create_pool(&self, _settings: &DatabaseConfig) -> AppResult<Arc<dyn SqlPool>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::internal("driver exploded"))
        }
    }

    #[async_trait]
    impl CacheConnector for CountingConnector {
        async fn create_pool(&self, _settings: &RedisConfig) -> AppResult<Arc<dyn KeyValuePool>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::connectivity(ResourceKind::Redis, "connection refused"))
        }
    }

    #[tokio::test]
    async fn test_disabled_database_never_calls_connector() {
        let connector = CountingConnector::default();
        let pool = start_database_pool(&connector, &DatabaseConfig::default())
            .await
            .unwrap();

        assert!(pool.is_none());
        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disabled_redis_never_calls_connector() {
        let connector = CountingConnector::default();
        let pool = start_redis_pool(&connector, &RedisConfig::default())
            .await
            .unwrap();

        assert!(pool.is_none());
        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_untagged_failure_becomes_resource_start() {
        let connector = CountingConnector::default();
        let settings = DatabaseConfig {
            enabled: true,
            ..Default::default()
        };
        let err = start_database_pool(&connector, &settings).await.err().unwrap();

        assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.category(), ErrorCategory::ResourceStart);
        assert_eq!(err.resource_kind(), Some(ResourceKind::Database));
        assert!(err.to_string().contains("driver exploded"));
    }

    #[tokio::test]
    async fn test_connectivity_failure_is_preserved() {
        let connector = CountingConnector::default();
        let settings = RedisConfig {
            enabled: true,
            ..Default::default()
        };
        let err = start_redis_pool(&connector, &settings).await.err().unwrap();

        assert_eq!(err.category(), ErrorCategory::Connectivity);
        assert_eq!(err.resource_kind(), Some(ResourceKind::Redis));
    }
}
