//! 初始表结构
//!
//! 数据库连接池就绪后，执行一次 `;` 分隔的建表脚本。脚本是可选的。

use std::path::Path;

use shardbot_errors::{AppError, AppResult, ResourceKind};
use shardbot_ports::SqlPool;
use tracing::{debug, info};

/// 建表脚本的执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// 没有脚本、脚本为空，或数据库被禁用
    Skipped,
    /// 按顺序执行了 `statements` 条语句
    Applied { statements: usize },
}

/// 按 `;` 切分脚本，去掉空白片段
pub fn split_statements(script: &str) -> Vec<&str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// 读取并执行建表脚本
///
/// 文件不存在或不可读时跳过，不视为错误。
pub async fn bootstrap_schema(pool: &dyn SqlPool, path: &Path) -> AppResult<SchemaOutcome> {
    let script = match tokio::fs::read_to_string(path).await {
        Ok(script) => script,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No schema file, skipping table creation");
            return Ok(SchemaOutcome::Skipped);
        }
    };

    apply_schema(pool, &script).await
}

/// 在同一个连接上依次执行脚本中的语句
///
/// 任意一条失败都会中止整个批次；连接在所有路径上都会归还。
pub async fn apply_schema(pool: &dyn SqlPool, script: &str) -> AppResult<SchemaOutcome> {
    let statements = split_statements(script);
    if statements.is_empty() {
        debug!("Schema file is empty, skipping table creation");
        return Ok(SchemaOutcome::Skipped);
    }

    info!(statements = statements.len(), "Creating initial database tables");

    let mut conn = pool.acquire().await.map_err(|e| {
        AppError::resource_start(
            ResourceKind::Database,
            format!("Failed to acquire connection for schema: {}", e),
        )
    })?;

    for (index, statement) in statements.iter().enumerate() {
        conn.execute(statement).await.map_err(|e| {
            AppError::resource_start(
                ResourceKind::Database,
                format!("Schema statement {} failed: {}", index + 1, e),
            )
        })?;
    }

    info!("Created initial database tables");
    Ok(SchemaOutcome::Applied {
        statements: statements.len(),
    })
}
