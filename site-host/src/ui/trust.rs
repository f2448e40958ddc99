//! # 信任背书区
//!
//! - [`TrustBar`]：一排数据指标，每项由一个 [`Counter`] 从 0 计数到目标值
//! - [`TestimonialCarousel`]：用户评价按固定间隔轮播

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use site_runtime::{Counter, CounterConfig, Timeline, TimerControl, TimerError, TimerSlot};
use tracing::trace;

/// 数据指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub target: f64,
    /// 数值后缀，例如 `+` 或 `%`
    #[serde(default)]
    pub suffix: String,
}

impl Stat {
    pub fn new(label: impl Into<String>, target: f64, suffix: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target,
            suffix: suffix.into(),
        }
    }
}

/// 数据指标栏
#[derive(Debug)]
pub struct TrustBar {
    entries: Vec<(Stat, Counter)>,
}

impl TrustBar {
    /// 创建并启动所有计数器
    pub fn new(
        timeline: &Timeline,
        stats: Vec<Stat>,
        duration: Duration,
        config: CounterConfig,
    ) -> Result<Self, TimerError> {
        let entries = stats
            .into_iter()
            .map(|stat| -> Result<_, TimerError> {
                let counter = Counter::new(timeline, stat.target, duration, config)?;
                Ok((stat, counter))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// 当前展示值
    pub fn values(&self) -> Vec<i64> {
        self.entries
            .iter()
            .map(|(_, counter)| counter.state().display_value())
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.entries.iter().all(|(_, counter)| counter.is_finished())
    }

    /// 渲染为单行（桌面）
    pub fn render_inline(&self) -> String {
        self.cells().join("  |  ")
    }

    /// 渲染为多行（移动端）
    pub fn render_stacked(&self) -> Vec<String> {
        self.cells()
    }

    fn cells(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(stat, counter)| {
                format!(
                    "{}{} {}",
                    counter.state().display_value(),
                    stat.suffix,
                    stat.label
                )
            })
            .collect()
    }
}

/// 用户评价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
}

impl Testimonial {
    pub fn new(quote: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            quote: quote.into(),
            author: author.into(),
        }
    }
}

/// 评价轮播
///
/// drop 时停止轮播。
#[derive(Debug)]
pub struct TestimonialCarousel {
    testimonials: Vec<Testimonial>,
    index: Rc<Cell<usize>>,
    _rotation: TimerSlot,
}

impl TestimonialCarousel {
    /// 创建轮播；不足两条评价时不启动定时器
    pub fn new(
        timeline: &Timeline,
        testimonials: Vec<Testimonial>,
        interval: Duration,
    ) -> Result<Self, TimerError> {
        let index = Rc::new(Cell::new(0));
        let mut rotation = TimerSlot::new(timeline.clone());

        let count = testimonials.len();
        if count > 1 {
            let weak = Rc::downgrade(&index);
            let id = timeline.schedule_interval(interval, move || {
                let Some(index) = weak.upgrade() else {
                    return TimerControl::Stop;
                };
                let next = (index.get() + 1) % count;
                index.set(next);
                trace!(index = next, "评价轮播切换");
                TimerControl::Continue
            })?;
            rotation.replace(id);
        }

        Ok(Self {
            testimonials,
            index,
            _rotation: rotation,
        })
    }

    /// 当前展示的评价
    pub fn current(&self) -> Option<&Testimonial> {
        self.testimonials.get(self.index.get())
    }

    pub fn index(&self) -> usize {
        self.index.get()
    }

    pub fn render(&self) -> Option<String> {
        self.current()
            .map(|t| format!("“{}” - {}", t.quote, t.author))
    }
}
