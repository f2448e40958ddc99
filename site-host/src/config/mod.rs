//! # Config 模块
//!
//! 宿主配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use site_runtime::RuntimeConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 状态单元配置（防抖、断点、计数器）
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// 视口配置
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// 页面内容配置
    #[serde(default)]
    pub page: PageConfig,

    /// 默认场景脚本路径；未配置时运行内置演示场景
    #[serde(default)]
    pub scenario_path: Option<PathBuf>,
}

/// 视口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// 初始视口宽度
    #[serde(default = "default_initial_width")]
    pub initial_width: u32,
}

/// 页面内容配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// 页面标题
    #[serde(default = "default_title")]
    pub title: String,

    /// 展示区逐项出现的间隔（毫秒）
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,

    /// 数据计数动画时长（毫秒）
    #[serde(default = "default_counter_duration_ms")]
    pub counter_duration_ms: u64,

    /// 用户评价轮播间隔（毫秒）
    #[serde(default = "default_carousel_interval_ms")]
    pub carousel_interval_ms: u64,

    /// 柱状图宽度（字符）
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,
}

// 默认值函数
fn default_initial_width() -> u32 {
    1280
}

fn default_title() -> String {
    "Ring Growth".to_string()
}

fn default_reveal_interval_ms() -> u64 {
    150
}

fn default_counter_duration_ms() -> u64 {
    1200
}

fn default_carousel_interval_ms() -> u64 {
    5000
}

fn default_chart_width() -> usize {
    24
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            initial_width: default_initial_width(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            reveal_interval_ms: default_reveal_interval_ms(),
            counter_duration_ms: default_counter_duration_ms(),
            carousel_interval_ms: default_carousel_interval_ms(),
            chart_width: default_chart_width(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::load_strict(path) {
            Ok(config) => {
                info!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(error = %e, "配置文件无效，使用默认配置");
                Self::default()
            }
        }
    }

    /// 加载并验证配置文件，任何问题都返回错误
    pub fn load_strict(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))?;

        Ok(())
    }

    /// 用命令行参数覆盖配置
    pub fn apply_overrides(&mut self, width: Option<u32>, scenario: Option<PathBuf>) {
        if let Some(width) = width {
            self.viewport.initial_width = width;
        }
        if scenario.is_some() {
            self.scenario_path = scenario;
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.runtime.validate()?;

        if self.page.chart_width == 0 {
            return Err(ConfigError::ValidationFailed(
                "chart_width 必须大于 0".to_string(),
            ));
        }

        if self.page.carousel_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "carousel_interval_ms 必须大于 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),

    /// 解析失败
    #[error("配置解析失败: {0}")]
    Parse(String),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(String),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),

    /// 状态单元配置无效
    #[error("{0}")]
    Runtime(#[from] site_runtime::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.viewport.initial_width, 1280);
        assert_eq!(config.runtime.debounce.quiet_period_ms, 300);
        assert_eq!(config.page.chart_width, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "viewport": { "initial_width": 500 },
            "runtime": { "breakpoints": { "tablet_min": 600 } }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.viewport.initial_width, 500);
        assert_eq!(config.runtime.breakpoints.tablet_min, 600);
        assert_eq!(config.runtime.breakpoints.desktop_min, 1024);
        assert_eq!(config.page, PageConfig::default());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = AppConfig::load("/definitely/not/here/config.json");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_strict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.viewport.initial_width = 800;
        config.page.title = "测试页".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load_strict(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(AppConfig::load(&path), config);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load_strict(&path),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(AppConfig::load(&path), AppConfig::default());

        fs::write(&path, r#"{ "runtime": { "counter": { "tick_ms": 0 } } }"#).unwrap();
        assert!(matches!(
            AppConfig::load_strict(&path),
            Err(ConfigError::Runtime(_))
        ));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some(375), Some(PathBuf::from("a.json")));
        assert_eq!(config.viewport.initial_width, 375);
        assert_eq!(config.scenario_path, Some(PathBuf::from("a.json")));

        config.apply_overrides(None, None);
        assert_eq!(config.viewport.initial_width, 375);
        assert_eq!(config.scenario_path, Some(PathBuf::from("a.json")));
    }
}
