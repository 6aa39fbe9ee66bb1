//! 服务运行时
//!
//! 进程入口的完整流程：日志级别 → 分片校验 → 加载配置 → 创建客户端 →
//! 单线程事件循环上运行生命周期 → 关闭事件循环。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use shardbot_config::{AppConfig, DEFAULT_CONFIG_FILE};
use shardbot_errors::{AppError, AppResult};
use shardbot_telemetry::{LogFormat, LogLevelArgs, LogLevelSet, init_tracing};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

use crate::client::BotClient;
use crate::lifecycle::{Lifecycle, LifecycleReport};
use crate::shard::{ShardArgs, ShardSpec, validate_shards};

/// 事件循环关闭时等待后台任务的时间
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// 启动参数
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// 配置文件路径
    pub config_path: PathBuf,
    /// 分片参数
    pub shards: ShardArgs,
    /// 日志级别参数
    pub log_levels: LogLevelArgs,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            shards: ShardArgs::default(),
            log_levels: LogLevelArgs::default(),
        }
    }
}

/// 运行机器人
///
/// `build_client` 在配置和分片校验通过之后、事件循环创建之前调用。
/// 返回时所有连接池都已释放，事件循环也已关闭。
///
/// # 示例
///
/// ```ignore
/// use shardbot_bootstrap::{LaunchOptions, run_bot};
///
/// fn main() {
///     let report = run_bot(LaunchOptions::default(), |config, shards| {
///         Ok(MyClient::new(config, shards))
///     });
/// }
/// ```
pub fn run_bot<C, F>(options: LaunchOptions, build_client: F) -> AppResult<LifecycleReport>
where
    C: BotClient + 'static,
    F: FnOnce(AppConfig, ShardSpec) -> AppResult<C>,
{
    // 1. 日志级别
    let levels = LogLevelSet::from_args(&options.log_levels)?;
    init_tracing(&levels, LogFormat::from_env())?;

    // 2. 分片
    let shards = validate_shards(options.shards).inspect_err(|e| {
        error!(critical = true, "{}", e);
    })?;

    // 3. 配置
    let config = AppConfig::load(&options.config_path)
        .map_err(|e| AppError::configuration(e.to_string()))?;
    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        shard_count = shards.count(),
        shards = ?shards.range(),
        "Configuration loaded"
    );

    // 4. 客户端
    let client: Arc<dyn BotClient> = Arc::new(build_client(config, shards)?);
    let lifecycle = Lifecycle::new(client);

    // 5. 事件循环
    let runtime = build_runtime()?;
    let result = runtime.block_on(lifecycle.run());

    info!("Closing event loop");
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    result
}

/// 创建单线程事件循环
pub fn build_runtime() -> AppResult<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build event loop: {}", e)))
}

/// 等待关闭信号
///
/// 信号处理器安装失败时只记录警告，对应的信号源永远不会完成。
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
