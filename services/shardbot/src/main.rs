//! shardbot - 分片机器人进程入口

mod cli;
mod client;

use std::process::ExitCode;

use clap::Parser;
use shardbot_bootstrap::run_bot;
use tracing::{error, info};

use crate::cli::Cli;
use crate::client::ShardRunner;

fn main() -> ExitCode {
    // 加载 .env 文件
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run_bot(cli.launch_options(), ShardRunner::build) {
        Ok(report) => {
            info!(
                interrupted = report.interrupted,
                schema = ?report.schema,
                "Bot exited"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            if !shardbot_telemetry::is_initialized() {
                eprintln!("Error: {}", e);
            } else if !e.is_shard_config() {
                // 分片错误已经在校验时记录
                error!(error = %e, category = ?e.category(), "Bot failed to run");
            }
            ExitCode::FAILURE
        }
    }
}
