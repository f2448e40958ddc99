//! # Site Host
//!
//! 落地页宿主：把 `site-runtime` 的状态单元组装成一张落地页，
//! 以文本帧的形式渲染，并通过场景脚本回放用户交互。
//!
//! ## 模块结构
//!
//! - [`config`]：应用配置（config.json）
//! - [`calculators`]：ROI 计算器
//! - [`ui`]：文本组件
//! - [`page`]：落地页组合与布局
//! - [`scenario`]：场景脚本与回放
//! - [`logging`]：日志初始化

pub mod calculators;
pub mod config;
pub mod logging;
pub mod page;
pub mod scenario;
pub mod ui;

pub use config::{AppConfig, ConfigError};
pub use page::LandingPage;
pub use scenario::{Frame, Scenario, ScenarioError, ScenarioReport, ScenarioRunner, Step};
