//! # Config 模块
//!
//! 状态单元的可配置常量：防抖静默期、断点阈值、计数器刷新间隔。
//!
//! 所有字段都有默认值，配置文件中可以只写需要覆盖的部分。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::breakpoint::Breakpoints;
use crate::easing::EasingFunction;
use crate::error::ConfigError;

/// 运行时配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// 计算器防抖配置
    #[serde(default)]
    pub debounce: DebounceConfig,

    /// 响应式断点
    #[serde(default)]
    pub breakpoints: Breakpoints,

    /// 计数器动画配置
    #[serde(default)]
    pub counter: CounterConfig,
}

/// 防抖配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// 静默期（毫秒）
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
}

/// 计数器动画配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// 刷新间隔（毫秒），默认约一帧
    #[serde(default = "default_counter_tick_ms")]
    pub tick_ms: u64,

    /// 缓动函数
    #[serde(default)]
    pub easing: EasingFunction,
}

// 默认值函数
fn default_quiet_period_ms() -> u64 {
    300
}

fn default_counter_tick_ms() -> u64 {
    16
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period_ms(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_counter_tick_ms(),
            easing: EasingFunction::default(),
        }
    }
}

impl DebounceConfig {
    /// 静默期
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

impl CounterConfig {
    /// 刷新间隔
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// 设置缓动函数
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }
}

impl RuntimeConfig {
    /// 从 JSON 文本解析
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce.quiet_period_ms == 0 {
            return Err(ConfigError::ZeroQuietPeriod(self.debounce.quiet_period()));
        }

        if self.counter.tick_ms == 0 {
            return Err(ConfigError::ZeroCounterTick);
        }

        self.breakpoints.validate()
    }
}
