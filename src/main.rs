mod utils;

use clap::Parser;
use log::{ error, info };
use std::{ process::ExitCode, time::Instant };
use utils::{ common, config::{ Args, Config }, errors::AppError, logger, pipeline };

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let start_time = Instant::now();
    // .env 不存在时忽略
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if let Err(e) = logger::init_logger(logger::level_for(args.verbose, args.quiet)) {
        eprintln!("{}", AppError::from(e));
        return ExitCode::FAILURE;
    }

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match pipeline::run(&config).await {
        Ok(summary) => {
            let (elapsed_time, unit) = common::format_duration(start_time.elapsed());
            info!(
                "读取 {} 行，格式不符 {} 行，查询成功 {} 个，失败 {} 个，超出上限 {} 个，保留 {} 条，耗时：{:.2} {}",
                summary.lines_read,
                summary.skipped_malformed,
                summary.resolved,
                summary.unresolved,
                summary.dropped_over_cap,
                summary.retained,
                elapsed_time,
                unit
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
