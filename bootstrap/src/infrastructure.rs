//! 基础设施资源管理
//!
//! 启动阶段创建的连接池统一放在 [`Resources`] 里，关闭阶段按创建顺序释放。

use std::sync::Arc;

use shardbot_ports::{KeyValuePool, SqlPool};
use tracing::info;

/// 基础设施资源容器
///
/// 被禁用的资源没有句柄。容器不可克隆，只能通过 [`Resources::close`] 释放一次。
#[derive(Default)]
pub struct Resources {
    /// 数据库连接池
    database: Option<Arc<dyn SqlPool>>,
    /// Redis 连接池
    cache: Option<Arc<dyn KeyValuePool>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取数据库连接池
    pub fn database(&self) -> Option<Arc<dyn SqlPool>> {
        self.database.clone()
    }

    /// 获取 Redis 连接池
    pub fn cache(&self) -> Option<Arc<dyn KeyValuePool>> {
        self.cache.clone()
    }

    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// 附带 Redis 连接池
    pub fn with_cache(mut self, pool: Arc<dyn KeyValuePool>) -> Self {
        self.cache = Some(pool);
        self
    }

    pub(crate) fn set_database(&mut self, pool: Option<Arc<dyn SqlPool>>) {
        self.database = pool;
    }

    pub(crate) fn set_cache(&mut self, pool: Option<Arc<dyn KeyValuePool>>) {
        self.cache = pool;
    }

    /// 释放所有已创建的连接池
    ///
    /// 顺序与创建顺序相同：先数据库，后 Redis。
    pub async fn close(self) {
        if let Some(pool) = self.database {
            info!("Closing database pool");
            pool.close().await;
        }

        if let Some(pool) = self.cache {
            info!("Closing redis pool");
            pool.close().await;
        }
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("database", &self.has_database())
            .field("cache", &self.has_cache())
            .finish()
    }
}
