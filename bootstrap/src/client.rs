//! 机器人客户端接口

use async_trait::async_trait;
use shardbot_config::AppConfig;
use shardbot_errors::AppResult;

use crate::infrastructure::Resources;

/// 由编排器驱动的长运行客户端
///
/// 编排器只依赖这四个操作；网关协议、命令分发等都在实现内部。
#[async_trait]
pub trait BotClient: Send + Sync {
    /// 客户端创建时使用的配置
    fn config(&self) -> &AppConfig;

    /// 加载扩展
    ///
    /// 连接池在此之前已经就绪，实现可以从 `resources` 克隆需要的句柄。
    async fn load_all_extensions(&self, resources: &Resources);

    /// 运行主循环，直到客户端自行退出或被 [`BotClient::logout`] 结束
    async fn start(&self) -> AppResult<()>;

    /// 请求断开连接
    async fn logout(&self) -> AppResult<()>;
}
