//! 分片运行客户端
//!
//! 负责本进程的分片：启动时登记在线状态，收到 logout 后注销并退出。

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shardbot_bootstrap::{BotClient, Resources, ShardSpec};
use shardbot_config::AppConfig;
use shardbot_errors::AppResult;
use shardbot_ports::KeyValuePool;
use tokio::sync::Notify;
use tracing::{info, warn};

/// 聊天服务协议日志使用的 target
const DISCORD_TARGET: &str = "discord";

pub struct ShardRunner {
    config: AppConfig,
    shards: ShardSpec,
    /// 已加载的扩展
    extensions: Mutex<Vec<String>>,
    /// 扩展加载时拿到的 Redis 连接池
    cache: Mutex<Option<Arc<dyn KeyValuePool>>>,
    logged_out: Notify,
}

impl ShardRunner {
    pub fn build(config: AppConfig, shards: ShardSpec) -> AppResult<Self> {
        Ok(Self {
            config,
            shards,
            extensions: Mutex::new(Vec::new()),
            cache: Mutex::new(None),
            logged_out: Notify::new(),
        })
    }

    pub fn extensions(&self) -> Vec<String> {
        self.extensions.lock().clone()
    }

    fn presence_key(&self, shard_id: u32) -> String {
        format!("{}:shard:{}", self.config.app_name, shard_id)
    }

    async fn set_presence(&self, online: bool) {
        let Some(cache) = self.cache.lock().clone() else {
            return;
        };

        for shard_id in self.shards.range() {
            let key = self.presence_key(shard_id);
            let result = if online {
                cache.set(&key, "online", None).await
            } else {
                cache.delete(&key).await
            };
            if let Err(e) = result {
                warn!(shard_id, error = %e, "Failed to update shard presence");
            }
        }
    }
}

#[async_trait]
impl BotClient for ShardRunner {
    fn config(&self) -> &AppConfig {
        &self.config
    }

    async fn load_all_extensions(&self, resources: &Resources) {
        *self.cache.lock() = resources.cache();

        let mut loaded = self.extensions.lock();
        for name in &self.config.extensions {
            info!(extension = %name, "Loaded extension");
            loaded.push(name.clone());
        }
    }

    async fn start(&self) -> AppResult<()> {
        for shard_id in self.shards.range() {
            info!(
                target: DISCORD_TARGET,
                shard_id,
                shard_count = self.shards.count(),
                "Shard connected"
            );
        }
        self.set_presence(true).await;

        self.logged_out.notified().await;

        self.set_presence(false).await;
        info!(target: DISCORD_TARGET, shards = self.shards.assigned(), "Shards disconnected");
        Ok(())
    }

    async fn logout(&self) -> AppResult<()> {
        info!(target: DISCORD_TARGET, "Closing gateway connections");
        self.logged_out.notify_one();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use shardbot_errors::ResourceKind;
    use shardbot_ports::PoolHandle;

    #[derive(Default)]
    struct MemoryCache {
        values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl PoolHandle for MemoryCache {
        fn kind(&self) -> ResourceKind {
            ResourceKind::Redis
        }

        async fn close(&self) {}
    }

    #[async_trait]
    impl KeyValuePool for MemoryCache {
        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            Ok(self.values.lock().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> AppResult<()> {
            self.values.lock().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.values.lock().remove(key);
            Ok(())
        }

        async fn exists(&self, key: &str) -> AppResult<bool> {
            Ok(self.values.lock().contains_key(key))
        }
    }

    fn runner(extensions: &[&str]) -> Arc<ShardRunner> {
        let mut config = AppConfig::default();
        config.app_name = "testbot".to_string();
        config.extensions = extensions.iter().map(|e| e.to_string()).collect();
        Arc::new(ShardRunner::build(config, ShardSpec::default()).unwrap())
    }

    #[tokio::test]
    async fn test_loads_configured_extensions() {
        let runner = runner(&["ping", "stats"]);
        runner.load_all_extensions(&Resources::new()).await;
        assert_eq!(runner.extensions(), vec!["ping", "stats"]);
    }

    #[tokio::test]
    async fn test_start_runs_until_logout() {
        let cache = Arc::new(MemoryCache::default());
        let runner = runner(&[]);
        runner
            .load_all_extensions(&Resources::new().with_cache(cache.clone()))
            .await;

        let task = tokio::spawn({
            let runner = runner.clone();
            async move { runner.start().await }
        });

        // 等待在线状态写入
        for _ in 0..100 {
            if cache.exists("testbot:shard:0").await.unwrap() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            cache.get("testbot:shard:0").await.unwrap().as_deref(),
            Some("online")
        );

        runner.logout().await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(!cache.exists("testbot:shard:0").await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_before_start_is_not_lost() {
        let runner = runner(&[]);
        runner.logout().await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), runner.start())
            .await
            .unwrap()
            .unwrap();
    }
}
