//! 日志级别配置
//!
//! 每个 [`Channel`] 对应一组 tracing target。级别分两遍叠加：
//! 先用全局级别填满所有 channel，再应用逐个 channel 的覆盖值。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use shardbot_errors::{AppError, AppResult};
use tracing_subscriber::filter::LevelFilter;

/// 未被任何 channel 覆盖的 target 使用的级别
pub const ROOT_LEVEL: LevelFilter = LevelFilter::WARN;

/// 日志 channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// 编排器与机器人本身
    Bot,
    /// 关系数据库客户端
    Database,
    /// Redis 客户端
    Redis,
    /// 聊天服务协议客户端
    Discord,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Bot,
        Channel::Database,
        Channel::Redis,
        Channel::Discord,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bot => "bot",
            Self::Database => "database",
            Self::Redis => "redis",
            Self::Discord => "discord",
        }
    }

    /// channel 覆盖的 tracing target
    pub fn targets(&self) -> &'static [&'static str] {
        match self {
            Self::Bot => &["shardbot", "shardbot_bootstrap"],
            Self::Database => &["shardbot_adapter_postgres", "sqlx"],
            Self::Redis => &["shardbot_adapter_redis", "redis"],
            Self::Discord => &["discord"],
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 单个日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel(LevelFilter);

impl LogLevel {
    /// 解析级别名称（大小写不敏感）
    ///
    /// 兼容常见的 `WARNING` / `CRITICAL` / `FATAL` 写法。
    pub fn parse(name: &str) -> AppResult<Self> {
        let upper = name.trim().to_uppercase();
        let filter = match upper.as_str() {
            "TRACE" => LevelFilter::TRACE,
            "DEBUG" => LevelFilter::DEBUG,
            "INFO" => LevelFilter::INFO,
            "WARN" | "WARNING" => LevelFilter::WARN,
            "ERROR" | "CRITICAL" | "FATAL" => LevelFilter::ERROR,
            "OFF" => LevelFilter::OFF,
            _ => return Err(AppError::invalid_log_level(upper)),
        };
        Ok(Self(filter))
    }

    pub fn filter(&self) -> LevelFilter {
        self.0
    }
}

impl FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// 命令行提供的原始级别参数
#[derive(Debug, Clone)]
pub struct LogLevelArgs {
    pub global: String,
    pub bot: Option<String>,
    pub discord: Option<String>,
    pub database: Option<String>,
    pub redis: Option<String>,
}

impl Default for LogLevelArgs {
    fn default() -> Self {
        Self {
            global: "INFO".to_string(),
            bot: None,
            discord: None,
            database: None,
            redis: None,
        }
    }
}

/// channel 到级别的映射
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLevelSet {
    levels: BTreeMap<Channel, LevelFilter>,
}

impl LogLevelSet {
    /// 所有 channel 都设为同一级别
    pub fn new(global: LogLevel) -> Self {
        Self {
            levels: Channel::ALL
                .iter()
                .map(|channel| (*channel, global.filter()))
                .collect(),
        }
    }

    /// 按命令行参数构建：先全局，再逐个覆盖
    pub fn from_args(args: &LogLevelArgs) -> AppResult<Self> {
        let mut set = Self::new(LogLevel::parse(&args.global)?);

        set.apply(Channel::Bot, args.bot.as_deref())?;
        set.apply(Channel::Database, args.database.as_deref())?;
        set.apply(Channel::Redis, args.redis.as_deref())?;
        set.apply(Channel::Discord, args.discord.as_deref())?;

        Ok(set)
    }

    /// 设置单个 channel 的级别
    ///
    /// `None` 不做任何修改；无法识别的级别在修改前就返回错误。
    pub fn apply(&mut self, channel: Channel, level: Option<&str>) -> AppResult<()> {
        let Some(level) = level else {
            return Ok(());
        };
        let level = LogLevel::parse(level)?;
        self.levels.insert(channel, level.filter());
        Ok(())
    }

    pub fn level(&self, channel: Channel) -> LevelFilter {
        self.levels.get(&channel).copied().unwrap_or(ROOT_LEVEL)
    }

    /// 渲染为 `EnvFilter` 指令串
    pub fn directives(&self) -> String {
        let mut directives = vec![ROOT_LEVEL.to_string().to_lowercase()];
        for (channel, level) in &self.levels {
            for target in channel.targets() {
                directives.push(format!("{}={}", target, level.to_string().to_lowercase()));
            }
        }
        directives.join(",")
    }
}

impl Default for LogLevelSet {
    fn default() -> Self {
        Self::new(LogLevel(LevelFilter::INFO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_names() {
        assert_eq!(LogLevel::parse("debug").unwrap().filter(), LevelFilter::DEBUG);
        assert_eq!(LogLevel::parse("WARNING").unwrap().filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::parse("Critical").unwrap().filter(), LevelFilter::ERROR);
        assert_eq!("off".parse::<LogLevel>().unwrap().filter(), LevelFilter::OFF);
    }

    #[test]
    fn test_invalid_level_names_offender() {
        let err = LogLevel::parse("loud").unwrap_err();
        assert!(matches!(err, AppError::InvalidLogLevel(ref name) if name == "LOUD"));
        assert!(err.to_string().contains("LOUD"));
    }

    #[test]
    fn test_override_layers_on_global() {
        let args = LogLevelArgs {
            global: "INFO".to_string(),
            database: Some("DEBUG".to_string()),
            ..Default::default()
        };
        let set = LogLevelSet::from_args(&args).unwrap();

        assert_eq!(set.level(Channel::Database), LevelFilter::DEBUG);
        assert_eq!(set.level(Channel::Bot), LevelFilter::INFO);
        assert_eq!(set.level(Channel::Redis), LevelFilter::INFO);
        assert_eq!(set.level(Channel::Discord), LevelFilter::INFO);
    }

    #[test]
    fn test_none_override_keeps_global() {
        let mut set = LogLevelSet::new(LogLevel::parse("ERROR").unwrap());
        for channel in Channel::ALL {
            set.apply(channel, None).unwrap();
            assert_eq!(set.level(channel), LevelFilter::ERROR);
        }
    }

    #[test]
    fn test_invalid_override_leaves_set_untouched() {
        let mut set = LogLevelSet::new(LogLevel::parse("INFO").unwrap());
        let before = set.clone();

        assert!(set.apply(Channel::Redis, Some("verbose")).is_err());
        assert_eq!(set, before);
    }

    #[test]
    fn test_invalid_global_fails() {
        let args = LogLevelArgs {
            global: "chatty".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            LogLevelSet::from_args(&args),
            Err(AppError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_directives() {
        let args = LogLevelArgs {
            global: "info".to_string(),
            redis: Some("trace".to_string()),
            discord: Some("error".to_string()),
            ..Default::default()
        };
        let directives = LogLevelSet::from_args(&args).unwrap().directives();

        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("shardbot=info"));
        assert!(directives.contains("sqlx=info"));
        assert!(directives.contains("shardbot_adapter_redis=trace"));
        assert!(directives.contains("redis=trace"));
        assert!(directives.contains("discord=error"));
    }
}
