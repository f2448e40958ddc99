//! # UI 组件模块
//!
//! 落地页的文本组件：按钮、柱状图、逐项展示区、数据栏、评价轮播。
//!
//! 组件只负责把状态渲染成文本行，动画与防抖由 `site-runtime` 的状态单元驱动。

pub mod button;
pub mod chart;
pub mod showcase;
pub mod trust;

pub use button::{ButtonState, ButtonStyle, CtaButton};
pub use chart::BarChart;
pub use showcase::Showcase;
pub use trust::{Stat, Testimonial, TestimonialCarousel, TrustBar};

/// 指针输入，每帧由宿主填充
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    /// 指针是否位于组件上
    pub over: bool,
    /// 按键是否按下
    pub pressed: bool,
    /// 按键是否刚释放（本帧）
    pub just_released: bool,
}

impl PointerState {
    /// 指针悬停
    pub fn hover() -> Self {
        Self {
            over: true,
            ..Self::default()
        }
    }

    /// 指针按下
    pub fn press() -> Self {
        Self {
            over: true,
            pressed: true,
            just_released: false,
        }
    }

    /// 指针在组件上释放
    pub fn release() -> Self {
        Self {
            over: true,
            pressed: false,
            just_released: true,
        }
    }
}

/// 生成分隔线
pub fn divider(width: usize) -> String {
    "─".repeat(width)
}
