//! shardbot-errors - 统一错误处理
//!
//! 启动阶段的所有失败都归入 [`AppError`]，并按 [`ErrorCategory`] 区分，
//! 让运维从错误种类就能判断是配置问题还是服务不可达。

use std::fmt;

use thiserror::Error;

/// 外部资源种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// 关系型数据库（PostgreSQL）
    Database,
    /// 键值缓存（Redis）
    Redis,
}

impl ResourceKind {
    /// 配置文件中对应的 section 名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Redis => "redis",
        }
    }

    /// 日志中使用的首字母大写名称
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database => "Database",
            Self::Redis => "Redis",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 错误大类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 配置缺失或格式错误
    Configuration,
    /// 远端服务不可达
    Connectivity,
    /// 其它资源启动失败
    ResourceStart,
    /// 参数校验失败
    Validation,
    /// 运行期错误
    Runtime,
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid shard configuration: {0}")]
    ShardConfig(String),

    #[error(
        "No settings object for resource {kind} (missing '{field}') - is there a '{kind}' object in the config?"
    )]
    MissingSettings { kind: ResourceKind, field: String },

    #[error("The log level {0} wasn't found")]
    InvalidLogLevel(String),

    #[error(
        "Connection refused creating {kind} pool - check settings and that the service is running: {message}"
    )]
    Connectivity { kind: ResourceKind, message: String },

    #[error("Error creating {kind} pool: {message}")]
    ResourceStart { kind: ResourceKind, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn shard_config(msg: impl Into<String>) -> Self {
        Self::ShardConfig(msg.into())
    }

    pub fn missing_settings(kind: ResourceKind, field: impl Into<String>) -> Self {
        Self::MissingSettings {
            kind,
            field: field.into(),
        }
    }

    pub fn invalid_log_level(level: impl Into<String>) -> Self {
        Self::InvalidLogLevel(level.into())
    }

    pub fn connectivity(kind: ResourceKind, msg: impl Into<String>) -> Self {
        Self::Connectivity {
            kind,
            message: msg.into(),
        }
    }

    pub fn resource_start(kind: ResourceKind, msg: impl Into<String>) -> Self {
        Self::ResourceStart {
            kind,
            message: msg.into(),
        }
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 错误所属大类
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::ShardConfig(_) | Self::MissingSettings { .. } => {
                ErrorCategory::Configuration
            }
            Self::Connectivity { .. } => ErrorCategory::Connectivity,
            Self::ResourceStart { .. } => ErrorCategory::ResourceStart,
            Self::InvalidLogLevel(_) => ErrorCategory::Validation,
            Self::Database(_) | Self::Cache(_) | Self::Internal(_) => ErrorCategory::Runtime,
        }
    }

    /// 错误关联的资源（如果有）
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        match self {
            Self::MissingSettings { kind, .. }
            | Self::Connectivity { kind, .. }
            | Self::ResourceStart { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// 分片配置错误需要入口直接以非零状态退出
    pub fn is_shard_config(&self) -> bool {
        matches!(self, Self::ShardConfig(_))
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
