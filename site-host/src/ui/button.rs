//! # 按钮组件

use super::PointerState;

/// 按钮状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Normal,
    Hovered,
    Pressed,
    Disabled,
}

/// 按钮样式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    /// 主要按钮（强调）
    Primary,
    /// 次要按钮（描边）
    Secondary,
    /// 幽灵按钮（仅文字）
    Ghost,
}

/// 行动号召按钮
#[derive(Debug, Clone)]
pub struct CtaButton {
    /// 按钮标识，场景脚本通过它点击按钮
    pub id: String,
    /// 按钮文本
    pub label: String,
    /// 跳转地址
    pub href: String,
    /// 按钮样式
    pub style: ButtonStyle,
    /// 是否禁用
    pub disabled: bool,
    /// 当前状态
    state: ButtonState,
    /// 被点击的次数
    clicks: u32,
}

impl CtaButton {
    pub fn new(id: impl Into<String>, label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            href: href.into(),
            style: ButtonStyle::Primary,
            disabled: false,
            state: ButtonState::Normal,
            clicks: 0,
        }
    }

    /// 设置样式
    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    /// 设置禁用状态
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// 更新按钮状态并返回是否被点击
    pub fn update(&mut self, pointer: PointerState) -> bool {
        if self.disabled {
            self.state = ButtonState::Disabled;
            return false;
        }

        if !pointer.over {
            self.state = ButtonState::Normal;
            return false;
        }

        self.state = if pointer.pressed {
            ButtonState::Pressed
        } else {
            ButtonState::Hovered
        };

        // 释放时才算点击
        if pointer.just_released {
            self.clicks += 1;
            return true;
        }

        false
    }

    /// 按下并释放一次
    pub fn click(&mut self) -> bool {
        self.update(PointerState::press());
        self.update(PointerState::release())
    }

    /// 获取当前状态
    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// 被点击的次数
    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// 渲染为一行文本
    pub fn render(&self) -> String {
        let label = match self.style {
            ButtonStyle::Primary => format!("[ {} ]", self.label),
            ButtonStyle::Secondary => format!("( {} )", self.label),
            ButtonStyle::Ghost => self.label.clone(),
        };

        let marker = match self.state {
            ButtonState::Normal => "",
            ButtonState::Hovered => " <",
            ButtonState::Pressed => " *",
            ButtonState::Disabled => " (不可用)",
        };

        format!("{label}{marker} -> {}", self.href)
    }
}
