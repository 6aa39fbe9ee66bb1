//! 生命周期编排
//!
//! 启动顺序：数据库 → Redis → 扩展 → 运行；关闭时按创建顺序释放连接池。
//! 启动阶段任何一步失败都会先释放已经创建的连接池，再返回错误。

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use shardbot_adapter_postgres::PostgresConnector;
use shardbot_adapter_redis::RedisConnector;
use shardbot_config::AppConfig;
use shardbot_errors::{AppError, AppResult};
use shardbot_ports::{CacheConnector, DatabaseConnector};
use tracing::{debug, error, info, warn};

use crate::client::BotClient;
use crate::infrastructure::Resources;
use crate::schema::{SchemaOutcome, bootstrap_schema};
use crate::shutdown::ShutdownController;
use crate::starter::{start_database_pool, start_redis_pool};

/// 生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Initializing,
    DatabaseStarting,
    CacheStarting,
    ExtensionsLoading,
    Running,
    ShuttingDown,
    Closed,
    /// 启动阶段出现致命错误
    Aborted,
}

impl LifecycleState {
    /// 是否允许从当前状态进入 `next`
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;

        matches!(
            (self, next),
            (Initializing, DatabaseStarting)
                | (DatabaseStarting, CacheStarting)
                | (CacheStarting, ExtensionsLoading)
                | (ExtensionsLoading, Running)
                | (Running, ShuttingDown)
                | (ShuttingDown, Closed)
                | (Initializing | DatabaseStarting | CacheStarting, Aborted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::DatabaseStarting => "database_starting",
            Self::CacheStarting => "cache_starting",
            Self::ExtensionsLoading => "extensions_loading",
            Self::Running => "running",
            Self::ShuttingDown => "shutting_down",
            Self::Closed => "closed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次完整运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReport {
    /// 经历过的状态，包含初始状态
    pub states: Vec<LifecycleState>,
    /// 建表脚本结果
    pub schema: SchemaOutcome,
    /// 是否因中断信号结束
    pub interrupted: bool,
}

/// 生命周期编排器
pub struct Lifecycle {
    client: Arc<dyn BotClient>,
    database: Arc<dyn DatabaseConnector>,
    cache: Arc<dyn CacheConnector>,
    shutdown: ShutdownController,
    handle_signals: bool,
    state: LifecycleState,
    states: Vec<LifecycleState>,
}

impl Lifecycle {
    /// 使用 sqlx / redis 连接池，并监听 Ctrl-C 与 SIGTERM
    pub fn new(client: Arc<dyn BotClient>) -> Self {
        Self {
            client,
            database: Arc::new(PostgresConnector),
            cache: Arc::new(RedisConnector),
            shutdown: ShutdownController::new(),
            handle_signals: true,
            state: LifecycleState::Initializing,
            states: vec![LifecycleState::Initializing],
        }
    }

    /// 替换连接池创建器
    pub fn with_connectors(
        mut self,
        database: Arc<dyn DatabaseConnector>,
        cache: Arc<dyn CacheConnector>,
    ) -> Self {
        self.database = database;
        self.cache = cache;
        self
    }

    /// 使用外部的 shutdown 控制器
    pub fn with_shutdown(mut self, shutdown: ShutdownController) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// 不监听操作系统信号，只响应 shutdown 控制器
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    fn advance(&mut self, next: LifecycleState) -> AppResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(AppError::internal(format!(
                "Illegal lifecycle transition {} -> {}",
                self.state, next
            )));
        }
        debug!(from = %self.state, to = %next, "Lifecycle transition");
        self.state = next;
        self.states.push(next);
        Ok(())
    }

    /// 执行完整的生命周期
    pub async fn run(mut self) -> AppResult<LifecycleReport> {
        let config = self.client.config().clone();
        let mut resources = Resources::new();

        // 1. 数据库连接池与建表脚本
        self.advance(LifecycleState::DatabaseStarting)?;
        let started = self.start_database(&config, &mut resources).await;
        let schema = match started {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.abort(resources, e).await),
        };

        // 2. Redis 连接池
        self.advance(LifecycleState::CacheStarting)?;
        let started = start_redis_pool(self.cache.as_ref(), &config.redis).await;
        match started {
            Ok(pool) => resources.set_cache(pool),
            Err(e) => return Err(self.abort(resources, e).await),
        }

        // 3. 扩展
        self.advance(LifecycleState::ExtensionsLoading)?;
        info!("Loading extensions");
        self.client.load_all_extensions(&resources).await;

        // 4. 运行
        self.advance(LifecycleState::Running)?;
        let grace = Duration::from_secs(config.lifecycle.shutdown_grace_secs);
        let (result, interrupted) = self.run_client(grace).await;

        // 5. 关闭
        self.advance(LifecycleState::ShuttingDown)?;
        resources.close().await;
        self.advance(LifecycleState::Closed)?;

        result?;
        Ok(LifecycleReport {
            states: self.states,
            schema,
            interrupted,
        })
    }

    async fn start_database(
        &self,
        config: &AppConfig,
        resources: &mut Resources,
    ) -> AppResult<SchemaOutcome> {
        let Some(pool) = start_database_pool(self.database.as_ref(), &config.database).await? else {
            return Ok(SchemaOutcome::Skipped);
        };
        resources.set_database(Some(pool.clone()));

        bootstrap_schema(pool.as_ref(), &config.database.schema_file).await
    }

    /// 运行客户端，返回运行结果以及是否被中断
    async fn run_client(&self, grace: Duration) -> (AppResult<()>, bool) {
        info!("Running bot");
        let mut run = self.client.start();

        tokio::select! {
            result = &mut run => {
                if let Err(e) = &result {
                    error!(error = %e, "Bot stopped with an error");
                }
                (result, false)
            }
            _ = self.interrupt() => {
                info!("Logging out bot");
                if let Err(e) = self.client.logout().await {
                    warn!(error = %e, "Logout failed");
                }

                match tokio::time::timeout(grace, &mut run).await {
                    Ok(Err(e)) => warn!(error = %e, "Bot returned an error after logout"),
                    Ok(Ok(())) => {}
                    Err(_) => warn!(grace_secs = grace.as_secs(), "Bot did not stop within the grace period"),
                }
                (Ok(()), true)
            }
        }
    }

    fn interrupt(&self) -> impl Future<Output = ()> + Send + 'static {
        let shutdown = self.shutdown.clone();
        let handle_signals = self.handle_signals;

        async move {
            if handle_signals {
                shutdown.wait_or_signal().await;
            } else {
                shutdown.wait().await;
            }
        }
    }

    /// 进入 Aborted，释放已经创建的连接池
    async fn abort(&mut self, resources: Resources, err: AppError) -> AppError {
        error!(state = %self.state, error = %err, "Startup aborted");
        if let Err(e) = self.advance(LifecycleState::Aborted) {
            warn!(error = %e, "Lifecycle was not in a startup state");
        }
        resources.close().await;
        err
    }
}
