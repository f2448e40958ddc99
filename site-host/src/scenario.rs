//! # Scenario 模块
//!
//! 场景脚本：用 JSON 描述一串用户交互，在虚拟时间线上回放，
//! 收集渲染帧并检查断言。
//!
//! ```json
//! {
//!   "name": "调整访问量",
//!   "steps": [
//!     { "type": "set_field", "field": "monthly_visitors", "value": 20000 },
//!     { "type": "advance", "ms": 300 },
//!     { "type": "expect", "chart_ready": true },
//!     { "type": "render" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use site_runtime::{Breakpoint, SiteError, Timeline};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::page::LandingPage;

/// 场景脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// 覆盖初始视口宽度
    #[serde(default)]
    pub width: Option<u32>,
    pub steps: Vec<Step>,
}

/// 场景步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// 修改表单字段
    SetField { field: String, value: f64 },
    /// 调整视口宽度
    Resize { width: u32 },
    /// 推进时间
    Advance { ms: u64 },
    /// 点击按钮
    Click { button: String },
    /// 记录一帧
    Render,
    /// 检查页面状态，未给出的项不检查
    Expect {
        #[serde(default)]
        breakpoint: Option<Breakpoint>,
        #[serde(default)]
        loading: Option<bool>,
        #[serde(default)]
        chart_ready: Option<bool>,
        #[serde(default)]
        errors: Option<usize>,
    },
}

impl Scenario {
    /// 内置演示场景
    pub fn demo() -> Self {
        Self {
            name: "内置演示".to_string(),
            width: None,
            steps: vec![
                Step::Render,
                Step::SetField {
                    field: "monthly_visitors".to_string(),
                    value: 20_000.0,
                },
                Step::Advance { ms: 100 },
                Step::SetField {
                    field: "conversion_rate".to_string(),
                    value: 3.0,
                },
                Step::Expect {
                    breakpoint: None,
                    loading: Some(true),
                    chart_ready: Some(false),
                    errors: Some(0),
                },
                Step::Advance { ms: 1500 },
                Step::Expect {
                    breakpoint: None,
                    loading: Some(false),
                    chart_ready: Some(true),
                    errors: None,
                },
                Step::Render,
                Step::Resize { width: 375 },
                Step::Click {
                    button: "signup".to_string(),
                },
                Step::Render,
            ],
        }
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ScenarioError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(text).map_err(|e| ScenarioError::Parse(e.to_string()))
    }
}

/// 场景错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("无法读取场景文件 {path}: {message}")]
    Io { path: String, message: String },

    #[error("场景解析失败: {0}")]
    Parse(String),

    #[error("第 {step} 步：未知字段 '{field}'")]
    UnknownField { step: usize, field: String },

    #[error("第 {step} 步：未知按钮 '{button}'")]
    UnknownButton { step: usize, button: String },

    #[error("第 {step} 步：期望 {what} 为 {expected}，实际为 {actual}")]
    ExpectationFailed {
        step: usize,
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("页面创建失败: {0}")]
    Site(#[from] SiteError),
}

/// 一帧渲染结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// 渲染时刻（毫秒）
    pub at_ms: u64,
    pub text: String,
}

/// 场景执行报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: usize,
    pub elapsed_ms: u64,
    pub frames: Vec<Frame>,
    /// 生效的点击，按发生顺序
    pub clicks: Vec<String>,
}

/// 场景执行器
///
/// 每次执行都创建新的时间线和页面，场景之间互不影响。
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: AppConfig,
}

impl ScenarioRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, scenario: &Scenario) -> Result<ScenarioReport, ScenarioError> {
        let mut config = self.config.clone();
        config.apply_overrides(scenario.width, None);

        let timeline = Timeline::new();
        let mut page = LandingPage::new(&timeline, &config)?;
        let mut report = ScenarioReport {
            name: scenario.name.clone(),
            steps: scenario.steps.len(),
            elapsed_ms: 0,
            frames: Vec::new(),
            clicks: Vec::new(),
        };

        info!(name = %scenario.name, steps = scenario.steps.len(), "开始执行场景");

        for (index, step) in scenario.steps.iter().enumerate() {
            let step_no = index + 1;
            debug!(step = step_no, ?step, "执行场景步骤");

            match step {
                Step::SetField { field, value } => {
                    if !page.set_field(field, *value) {
                        return Err(ScenarioError::UnknownField {
                            step: step_no,
                            field: field.clone(),
                        });
                    }
                }
                Step::Resize { width } => {
                    page.resize(*width);
                }
                Step::Advance { ms } => {
                    page.advance(Duration::from_millis(*ms));
                }
                Step::Click { button } => match page.click(button) {
                    Some(true) => report.clicks.push(button.clone()),
                    Some(false) => {}
                    None => {
                        return Err(ScenarioError::UnknownButton {
                            step: step_no,
                            button: button.clone(),
                        });
                    }
                },
                Step::Render => report.frames.push(Frame {
                    at_ms: timeline.now().as_millis() as u64,
                    text: page.render(),
                }),
                Step::Expect {
                    breakpoint,
                    loading,
                    chart_ready,
                    errors,
                } => {
                    let calculator = page.calculator();
                    check(step_no, "breakpoint", *breakpoint, page.breakpoint())?;
                    check(step_no, "loading", *loading, calculator.loading())?;
                    check(step_no, "chart_ready", *chart_ready, calculator.chart_ready())?;
                    check(step_no, "errors", *errors, calculator.errors().len())?;
                }
            }
        }

        report.elapsed_ms = timeline.now().as_millis() as u64;
        info!(
            name = %scenario.name,
            frames = report.frames.len(),
            elapsed_ms = report.elapsed_ms,
            "场景执行完成"
        );
        Ok(report)
    }
}

fn check<T>(step: usize, what: &'static str, expected: Option<T>, actual: T) -> Result<(), ScenarioError>
where
    T: PartialEq + std::fmt::Debug,
{
    match expected {
        Some(expected) if expected != actual => Err(ScenarioError::ExpectationFailed {
            step,
            what,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let json = r#"{
            "name": "t",
            "steps": [
                { "type": "set_field", "field": "monthly_cost", "value": 100 },
                { "type": "resize", "width": 800 },
                { "type": "advance", "ms": 300 },
                { "type": "click", "button": "demo" },
                { "type": "render" },
                { "type": "expect", "breakpoint": "tablet" }
            ]
        }"#;
        let scenario = Scenario::from_json(json).unwrap();
        assert_eq!(scenario.width, None);
        assert_eq!(scenario.steps.len(), 6);
        assert_eq!(
            scenario.steps[5],
            Step::Expect {
                breakpoint: Some(Breakpoint::Tablet),
                loading: None,
                chart_ready: None,
                errors: None,
            }
        );
    }

    #[test]
    fn test_parse_error() {
        let err = Scenario::from_json(r#"{ "name": "t", "steps": [ { "type": "jump" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn test_run_demo() {
        let runner = ScenarioRunner::new(AppConfig::default());
        let report = runner.run(&Scenario::demo()).unwrap();
        assert_eq!(report.frames.len(), 3);
        assert_eq!(report.frames[1].at_ms, 1600);
        assert_eq!(report.elapsed_ms, 1600);
        assert_eq!(report.clicks, vec!["signup"]);
        assert!(report.frames[2].text.contains("[mobile 375px]"));
    }

    #[test]
    fn test_unknown_field() {
        let scenario = Scenario {
            name: "t".to_string(),
            width: None,
            steps: vec![Step::SetField {
                field: "discount".to_string(),
                value: 1.0,
            }],
        };
        let err = ScenarioRunner::new(AppConfig::default())
            .run(&scenario)
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioError::UnknownField {
                step: 1,
                field: "discount".to_string(),
            }
        );
    }

    #[test]
    fn test_expectation_failed() {
        let scenario = Scenario {
            name: "t".to_string(),
            width: Some(375),
            steps: vec![Step::Expect {
                breakpoint: Some(Breakpoint::Desktop),
                loading: None,
                chart_ready: None,
                errors: None,
            }],
        };
        let err = ScenarioRunner::new(AppConfig::default())
            .run(&scenario)
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"第 1 步：期望 breakpoint 为 Desktop，实际为 Mobile");
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        fs::write(&path, r#"{ "name": "空", "steps": [] }"#).unwrap();
        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.name, "空");

        let missing = Scenario::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, ScenarioError::Io { .. }));
    }
}
