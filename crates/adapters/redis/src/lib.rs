//! shardbot-adapter-redis - Redis 适配器

mod cache;
mod config;
mod connection;
mod pool;

pub use config::*;
pub use connection::*;
pub use pool::*;
