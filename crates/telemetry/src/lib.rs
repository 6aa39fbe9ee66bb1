//! telemetry - 可观测性库

mod level;

pub use level::*;

use once_cell::sync::OnceCell;
use shardbot_errors::{AppError, AppResult};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 只有 subscriber 安装成功后才会被填充
static TRACING_GUARD: OnceCell<()> = OnceCell::new();

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    /// 生产环境使用 JSON
    Json,
}

impl LogFormat {
    /// 根据 `APP_ENV` 选择格式
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// 初始化 tracing
///
/// 进程内唯一的日志初始化入口。`RUST_LOG` 优先于按 channel 计算出的过滤器。
/// 重复调用不会再次安装 subscriber，返回 `Ok(false)`。
/// 安装失败时保持未初始化状态，调用方仍需自行输出错误。
pub fn init_tracing(levels: &LogLevelSet, format: LogFormat) -> AppResult<bool> {
    let mut installed = false;
    TRACING_GUARD.get_or_try_init(|| {
        install_subscriber(levels, format)?;
        installed = true;
        Ok::<(), AppError>(())
    })?;

    if installed {
        tracing::debug!(directives = %levels.directives(), format = ?format, "Tracing initialized");
    }
    Ok(installed)
}

fn install_subscriber(levels: &LogLevelSet, format: LogFormat) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(levels.directives()))
        .map_err(|e| AppError::internal(format!("Invalid log filter: {}", e)))?;

    let result = match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    result.map_err(|e| AppError::internal(format!("Failed to install tracing subscriber: {}", e)))
}

/// 日志是否已经初始化
pub fn is_initialized() -> bool {
    TRACING_GUARD.get().is_some()
}
