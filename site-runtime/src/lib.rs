//! # Site Runtime
//!
//! 营销站点交互层的核心状态单元。
//!
//! ## 架构概述
//!
//! `site-runtime` 是纯逻辑核心，不依赖任何 IO、渲染框架或真实时钟。
//! 所有定时行为都挂在 [`Timeline`] 上，由宿主层（Host）推进：
//!
//! ```text
//! Host                              Runtime
//!   │                                  │
//!   │── set_inputs / resize ─────────►│  同步更新状态，通知订阅者
//!   │── timeline.advance(dt) ────────►│  触发到期的定时器
//!   │◄── snapshot() / subscribe() ─────│
//!   │                                  │
//! ```
//!
//! ## 核心类型
//!
//! - [`Calculator`]：带防抖的计算器管线
//! - [`StepSequence`]：按延迟逐步推进的步骤序列
//! - [`Counter`]：从 0 到目标值的计数动画
//! - [`BreakpointDetector`]：响应式断点检测
//!
//! 三者互不依赖，各自独占自己的状态；卸载（drop / `dispose`）时
//! 取消自己所有尚未触发的定时器，之后不会再修改任何状态。
//!
//! ## 使用示例
//!
//! ```ignore
//! use site_runtime::{Calculator, DebounceConfig, NoValidation, Timeline};
//!
//! let timeline = Timeline::new();
//! let calculator = Calculator::new(&timeline, 2.0, |x: &f64| x * 10.0, NoValidation, DebounceConfig::default());
//!
//! calculator.set_inputs(|_| 3.0);
//! assert!(calculator.loading());
//!
//! timeline.advance(calculator.quiet_period());
//! assert_eq!(calculator.results(), Some(30.0));
//! ```
//!
//! ## 模块结构
//!
//! - [`timeline`]：虚拟时钟与定时器
//! - [`observer`]：变更通知
//! - [`calculator`] / [`validation`]：计算器管线与校验规则
//! - [`sequence`] / [`counter`] / [`easing`]：动画时序
//! - [`breakpoint`]：响应式断点
//! - [`config`]：可配置常量
//! - [`error`]：错误类型定义

pub mod breakpoint;
pub mod calculator;
pub mod config;
pub mod counter;
pub mod easing;
pub mod error;
pub mod observer;
pub mod sequence;
pub mod timeline;
pub mod validation;

// 重导出核心类型
pub use breakpoint::{Breakpoint, BreakpointDetector, BreakpointState, Breakpoints};
pub use calculator::{Calculator, FormState};
pub use config::{CounterConfig, DebounceConfig, RuntimeConfig};
pub use counter::{Counter, CounterState};
pub use easing::EasingFunction;
pub use error::{ConfigError, SequenceError, SiteError, SiteResult, TimerError};
pub use observer::{ListenerId, Observable};
pub use sequence::{SequenceState, StepSequence};
pub use timeline::{Timeline, TimerControl, TimerId, TimerSlot};
pub use validation::{
    FieldErrors, FieldInputs, FieldRule, NoValidation, ValidationRules, Validator,
    get_validation_errors, get_warnings,
};
