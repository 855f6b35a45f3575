//! 日志初始化
//!
//! 安装 `tracing-subscriber` 的 fmt 订阅者，过滤规则来自 `RUST_LOG`，
//! 再叠加调用方给出的默认指令。使用 `log` 宏的依赖库经 `tracing-log` 桥接。

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;

/// 日志初始化错误
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log directive: {0}")]
    Directive(#[from] ParseError),

    #[error("Global tracing subscriber already set: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Global logger already set: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// 构造过滤器：`RUST_LOG` 优先，`directive`（如 `"orca_client=info"`）作为补充
pub fn env_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    let mut filter = EnvFilter::from_default_env();
    for part in directive.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        filter = filter.add_directive(part.parse()?);
    }
    Ok(filter)
}

/// 初始化全局日志（每个进程只能成功一次）
///
/// ```no_run
/// orca_sdk::init_logging("orca_client=info,orca_driver=warn").unwrap();
/// ```
pub fn init_logging(directive: &str) -> Result<(), LoggingError> {
    let subscriber = tracing_subscriber::registry()
        .with(env_filter(directive)?)
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init_with_filter(log::LevelFilter::Trace)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_directive_list() {
        assert!(env_filter("orca_client=info, orca_driver=debug").is_ok());
        assert!(env_filter("").is_ok());
    }

    #[test]
    fn test_env_filter_rejects_bad_level() {
        assert!(matches!(
            env_filter("orca_client=loud"),
            Err(LoggingError::Directive(_))
        ));
    }

    #[test]
    fn test_second_init_fails() {
        // 同一进程内只有第一次安装成功
        let first = init_logging("orca_client=trace");
        let second = init_logging("orca_client=trace");
        assert!(first.is_ok());
        assert!(matches!(second, Err(LoggingError::Subscriber(_))));
        log::info!("bridged through tracing-log");
    }
}
