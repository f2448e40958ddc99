//! # Breakpoint 模块
//!
//! 响应式断点检测：跟踪视口宽度并划分为 mobile / tablet / desktop。
//!
//! ```text
//! 0 ──── mobile ──── tablet_min ──── tablet ──── desktop_min ──── desktop ────►
//! ```
//!
//! 三个区间连续、互不重叠，覆盖全部宽度。每次 resize 事件都同步重新分类，
//! 不做防抖。

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::observer::{ListenerId, Observable};

/// 断点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Breakpoint::Mobile => "mobile",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Desktop => "desktop",
        };
        f.write_str(name)
    }
}

/// 断点阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoints {
    /// tablet 区间起点（含）
    #[serde(default = "default_tablet_min")]
    pub tablet_min: u32,

    /// desktop 区间起点（含）
    #[serde(default = "default_desktop_min")]
    pub desktop_min: u32,
}

fn default_tablet_min() -> u32 {
    768
}

fn default_desktop_min() -> u32 {
    1024
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            tablet_min: default_tablet_min(),
            desktop_min: default_desktop_min(),
        }
    }
}

impl Breakpoints {
    /// 创建阈值，不满足 `0 < tablet_min < desktop_min` 时返回错误
    pub fn new(tablet_min: u32, desktop_min: u32) -> Result<Self, ConfigError> {
        let breakpoints = Self {
            tablet_min,
            desktop_min,
        };
        breakpoints.validate()?;
        Ok(breakpoints)
    }

    /// 验证三个区间都非空
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tablet_min == 0 || self.tablet_min >= self.desktop_min {
            return Err(ConfigError::InvalidBreakpoints {
                tablet_min: self.tablet_min,
                desktop_min: self.desktop_min,
            });
        }
        Ok(())
    }

    /// 对宽度分类
    pub fn classify(&self, width: u32) -> Breakpoint {
        if width < self.tablet_min {
            Breakpoint::Mobile
        } else if width < self.desktop_min {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }
}

/// 断点状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakpointState {
    /// 最近一次观察到的视口宽度
    pub width: u32,
    /// 当前断点
    pub breakpoint: Breakpoint,
}

impl BreakpointState {
    pub fn is_mobile(&self) -> bool {
        self.breakpoint == Breakpoint::Mobile
    }

    pub fn is_tablet(&self) -> bool {
        self.breakpoint == Breakpoint::Tablet
    }

    pub fn is_desktop(&self) -> bool {
        self.breakpoint == Breakpoint::Desktop
    }
}

/// 断点检测器
#[derive(Debug)]
pub struct BreakpointDetector {
    breakpoints: Breakpoints,
    state: RefCell<BreakpointState>,
    observers: Observable<BreakpointState>,
}

impl BreakpointDetector {
    /// 以当前视口宽度创建检测器
    pub fn new(initial_width: u32, breakpoints: Breakpoints) -> Self {
        Self {
            breakpoints,
            state: RefCell::new(BreakpointState {
                width: initial_width,
                breakpoint: breakpoints.classify(initial_width),
            }),
            observers: Observable::new(),
        }
    }

    /// 当前状态
    pub fn state(&self) -> BreakpointState {
        *self.state.borrow()
    }

    /// 当前断点
    pub fn breakpoint(&self) -> Breakpoint {
        self.state.borrow().breakpoint
    }

    /// 使用的阈值
    pub fn breakpoints(&self) -> Breakpoints {
        self.breakpoints
    }

    /// 处理一次 resize 事件
    ///
    /// # 返回
    /// - `true`: 状态发生变化，已通知订阅者
    /// - `false`: 宽度未变
    pub fn resize(&self, width: u32) -> bool {
        let next = BreakpointState {
            width,
            breakpoint: self.breakpoints.classify(width),
        };

        let previous = self.state.replace(next);
        if previous == next {
            return false;
        }

        if previous.breakpoint != next.breakpoint {
            debug!(
                width,
                from = %previous.breakpoint,
                to = %next.breakpoint,
                "断点切换"
            );
        }

        self.observers.notify(&next);
        true
    }

    /// 订阅状态变化
    pub fn subscribe(&self, listener: impl FnMut(&BreakpointState) + 'static) -> ListenerId {
        self.observers.subscribe(listener)
    }

    /// 取消订阅
    pub fn unsubscribe(&self, id: ListenerId) {
        self.observers.unsubscribe(id);
    }
}
