//! 连接池 trait 定义

use async_trait::async_trait;
use shardbot_errors::{AppResult, ResourceKind};

/// 进程级连接池句柄
///
/// 启动阶段创建一次，关闭阶段释放一次。
#[async_trait]
pub trait PoolHandle: Send + Sync {
    /// 资源种类
    fn kind(&self) -> ResourceKind;

    /// 关闭连接池
    async fn close(&self);
}

/// 从连接池借出的单个连接
///
/// drop 时归还连接池，无论调用方是正常返回还是中途出错。
#[async_trait]
pub trait SqlConnection: Send {
    /// 执行一条语句，返回受影响的行数
    async fn execute(&mut self, statement: &str) -> AppResult<u64>;
}

/// 关系数据库连接池
#[async_trait]
pub trait SqlPool: PoolHandle {
    /// 借出一个连接
    async fn acquire(&self) -> AppResult<Box<dyn SqlConnection>>;
}
