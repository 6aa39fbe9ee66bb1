//! ports - 抽象 trait 层
//!
//! 定义编排器依赖的所有基础设施抽象接口

mod cache;
mod connector;
mod pool;

pub use cache::*;
pub use connector::*;
pub use pool::*;
