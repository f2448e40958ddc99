//! # Error 模块
//!
//! 定义 site-runtime 中使用的错误类型。
//!
//! 计算管线本身没有可恢复的错误路径：`calculate` 与校验函数被视为纯函数，
//! 它们 panic 属于调用方的 bug，直接向上传播。这里只收录配置类错误。

use std::time::Duration;

use thiserror::Error;

/// 步骤序列错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    /// 延迟列表短于步骤数
    #[error("步骤数为 {total_steps}，但只提供了 {delays} 个延迟")]
    NotEnoughDelays { total_steps: usize, delays: usize },
}

/// 定时器错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimerError {
    /// 周期定时器的周期为零
    #[error("周期定时器的周期必须大于 0")]
    ZeroPeriod,
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 断点阈值不构成三个连续区间
    #[error("断点阈值无效：tablet_min={tablet_min}，desktop_min={desktop_min}")]
    InvalidBreakpoints { tablet_min: u32, desktop_min: u32 },

    /// 计数器刷新间隔为零
    #[error("计数器刷新间隔必须大于 0")]
    ZeroCounterTick,

    /// 防抖静默期为零
    #[error("防抖静默期必须大于 0，实际 {0:?}")]
    ZeroQuietPeriod(Duration),

    /// 解析失败
    #[error("配置解析失败: {0}")]
    Parse(String),
}

/// site-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiteError {
    /// 序列错误
    #[error("序列错误: {0}")]
    Sequence(#[from] SequenceError),

    /// 定时器错误
    #[error("定时器错误: {0}")]
    Timer(#[from] TimerError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type SiteResult<T> = Result<T, SiteError>;
