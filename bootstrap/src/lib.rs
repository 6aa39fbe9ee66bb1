//! shardbot-bootstrap - 机器人启动骨架
//!
//! 分片校验、连接池启动、建表脚本、生命周期编排与关闭

mod client;
mod infrastructure;
mod lifecycle;
mod runtime;
mod schema;
mod shard;
mod shutdown;
mod starter;

pub use client::*;
pub use infrastructure::*;
pub use lifecycle::*;
pub use runtime::*;
pub use schema::*;
pub use shard::*;
pub use shutdown::*;
pub use starter::*;
