// 初始化日志（设置日志格式）
pub fn init_logger(level: log::LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch
        ::new()
        .format(|out, message, record| {
            out.finish(
                format_args!(
                    "{} {:<5}{}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    message
                )
            )
        })
        .level(log::LevelFilter::Warn)
        .level_for(env!("CARGO_CRATE_NAME"), level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

// 根据命令行参数决定日志级别
pub fn level_for(verbose: bool, quiet: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else if quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_levels() {
        assert_eq!(level_for(false, false), log::LevelFilter::Info);
        assert_eq!(level_for(true, false), log::LevelFilter::Debug);
        assert_eq!(level_for(false, true), log::LevelFilter::Warn);
    }
}
