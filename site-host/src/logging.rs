//! # Logging 模块
//!
//! 基于 `tracing-subscriber` 的日志初始化。
//!
//! 日志写到 stderr，stdout 只输出渲染帧，便于重定向。

use tracing::Level;

/// 根据命令行的 verbose 开关选择日志级别
pub fn level_for(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::INFO }
}

/// 初始化全局日志
///
/// 重复调用时保留第一次的设置。
pub fn init_logging(verbose: bool) {
    let result = tracing_subscriber::fmt()
        .with_max_level(level_for(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if result.is_err() {
        tracing::debug!("日志系统已初始化，跳过");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(true), Level::DEBUG);
        assert_eq!(level_for(false), Level::INFO);
    }

    #[test]
    fn test_init_twice() {
        init_logging(false);
        init_logging(true);
    }
}
