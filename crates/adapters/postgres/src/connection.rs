//! PostgreSQL 连接管理

use std::io::ErrorKind;
use std::sync::Arc;

use async_trait::async_trait;
use shardbot_config::DatabaseConfig;
use shardbot_errors::{AppError, AppResult, ResourceKind};
use shardbot_ports::{DatabaseConnector, PoolHandle, SqlConnection, SqlPool};
use sqlx::Postgres;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::PostgresConfig;

/// 创建 PostgreSQL 连接池
pub async fn create_pool(config: &PostgresConfig) -> AppResult<PgPool> {
    let options = config.connect_options()?;

    PgPoolOptions::new()
        .max_connections(config.pool_max)
        .min_connections(config.pool_min)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect_with(options)
        .await
        .map_err(classify_error)
}

/// 把建池失败归类为连通性、配置或通用启动错误
pub fn classify_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Io(io) if is_unreachable(io.kind()) => {
            AppError::connectivity(ResourceKind::Database, err.to_string())
        }
        sqlx::Error::PoolTimedOut => AppError::connectivity(ResourceKind::Database, err.to_string()),
        sqlx::Error::Configuration(_) => {
            AppError::configuration(format!("Invalid database settings: {}", err))
        }
        _ => AppError::resource_start(ResourceKind::Database, err.to_string()),
    }
}

fn is_unreachable(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::AddrNotAvailable
            | ErrorKind::TimedOut
    )
}

/// PostgreSQL 连接池
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoolHandle for PostgresPool {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Database
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SqlPool for PostgresPool {
    async fn acquire(&self) -> AppResult<Box<dyn SqlConnection>> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {}", e)))?;
        Ok(Box::new(PgScopedConnection { conn }))
    }
}

/// 借出的连接，drop 时归还连接池
struct PgScopedConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl SqlConnection for PgScopedConnection {
    async fn execute(&mut self, statement: &str) -> AppResult<u64> {
        let result = sqlx::Executor::execute(&mut *self.conn, sqlx::raw_sql(statement))
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

/// 基于 sqlx 的数据库连接池创建器
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresConnector;

#[async_trait]
impl DatabaseConnector for PostgresConnector {
    async fn create_pool(&self, settings: &DatabaseConfig) -> AppResult<Arc<dyn SqlPool>> {
        let config = PostgresConfig::from_settings(settings)?;
        let pool = create_pool(&config).await?;
        info!(
            max_connections = config.pool_max,
            min_connections = config.pool_min,
            "PostgreSQL connection pool created"
        );
        Ok(Arc::new(PostgresPool::new(pool)))
    }
}
