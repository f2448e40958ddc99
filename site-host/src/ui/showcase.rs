//! # 功能展示区
//!
//! 各功能条目按固定间隔逐项出现，由 [`StepSequence`] 驱动：
//! 当 `step > i` 时第 i 项可见。

use std::time::Duration;

use site_runtime::{SequenceError, StepSequence, Timeline};

/// 逐项出现的功能展示区
#[derive(Debug)]
pub struct Showcase {
    title: String,
    items: Vec<String>,
    sequence: StepSequence,
}

impl Showcase {
    pub fn new(
        timeline: &Timeline,
        title: impl Into<String>,
        items: Vec<String>,
        interval: Duration,
    ) -> Result<Self, SequenceError> {
        let sequence = StepSequence::uniform(timeline, items.len(), interval)?;
        Ok(Self {
            title: title.into(),
            items,
            sequence,
        })
    }

    /// 第 `index` 项是否可见
    pub fn is_visible(&self, index: usize) -> bool {
        self.sequence.step() > index
    }

    /// 已可见的条目数
    pub fn visible_count(&self) -> usize {
        self.sequence.step().min(self.items.len())
    }

    pub fn is_complete(&self) -> bool {
        self.sequence.is_complete()
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("## {}", self.title)];
        lines.extend(self.items.iter().enumerate().map(|(index, item)| {
            if self.is_visible(index) {
                format!("  ✓ {item}")
            } else {
                "  ·".to_string()
            }
        }));
        lines
    }
}
