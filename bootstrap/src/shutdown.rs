//! Graceful Shutdown

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::runtime::shutdown_signal;

/// Shutdown 控制器
///
/// 在进入运行阶段之前触发也不会丢失，运行阶段开始时立即生效。
#[derive(Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 触发关闭
    pub fn shutdown(&self) {
        info!("Triggering shutdown");
        self.token.cancel();
    }

    /// 是否已经触发
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 等待关闭请求
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// 等待关闭请求或操作系统信号，先到者为准
    pub async fn wait_or_signal(&self) {
        tokio::select! {
            _ = self.wait() => {},
            _ = shutdown_signal() => {},
        }
    }
}
