//! 命令行参数

use std::path::PathBuf;

use clap::Parser;
use shardbot_bootstrap::{LaunchOptions, ShardArgs};
use shardbot_config::DEFAULT_CONFIG_FILE;
use shardbot_telemetry::LogLevelArgs;

/// Run a sharded chat bot.
#[derive(Parser, Debug)]
#[command(name = "shardbot", version, about)]
pub struct Cli {
    /// The configuration for the bot
    #[arg(value_name = "CONFIG_FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// The minimum shard ID that this instance will run with (inclusive)
    #[arg(long)]
    pub min: Option<u32>,

    /// The maximum shard ID that this instance will run with (inclusive)
    #[arg(long)]
    pub max: Option<u32>,

    /// The amount of shards that the bot should be using
    #[arg(long)]
    pub shardcount: Option<u32>,

    /// Global logging level - probably most useful is INFO and DEBUG
    #[arg(long, default_value = "INFO")]
    pub loglevel: String,

    /// Logging level for the bot
    #[arg(long)]
    pub loglevel_bot: Option<String>,

    /// Logging level for discord
    #[arg(long)]
    pub loglevel_discord: Option<String>,

    /// Logging level for the database
    #[arg(long)]
    pub loglevel_database: Option<String>,

    /// Logging level for redis
    #[arg(long)]
    pub loglevel_redis: Option<String>,
}

impl Cli {
    pub fn launch_options(self) -> LaunchOptions {
        LaunchOptions {
            config_path: self.config_file,
            shards: ShardArgs {
                count: self.shardcount,
                min: self.min,
                max: self.max,
            },
            log_levels: LogLevelArgs {
                global: self.loglevel,
                bot: self.loglevel_bot,
                discord: self.loglevel_discord,
                database: self.loglevel_database,
                redis: self.loglevel_redis,
            },
        }
    }
}
