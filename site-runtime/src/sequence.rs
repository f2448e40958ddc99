//! # Sequence 模块
//!
//! 步骤序列：按一组延迟依次推进整数步骤，用于分段展示动画。
//!
//! 创建时一次性调度 `total_steps` 个定时器，第 i 个定时器在
//! `delays[0] + .. + delays[i]` 时触发，把步骤推进到 `i + 1`。
//! 每个步骤独立触发，不依赖逐帧累计时间。序列只播放一次。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::error::SequenceError;
use crate::observer::{ListenerId, Observable};
use crate::timeline::{Timeline, TimerId};

/// 序列状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceState {
    /// 当前步骤（0..=total_steps）
    pub step: usize,
    /// 总步骤数
    pub total_steps: usize,
}

impl SequenceState {
    /// 是否已播放完毕
    pub fn is_complete(&self) -> bool {
        self.step >= self.total_steps
    }
}

struct Shared {
    step: Cell<usize>,
    total_steps: usize,
    observers: Observable<SequenceState>,
}

impl Shared {
    fn state(&self) -> SequenceState {
        SequenceState {
            step: self.step.get(),
            total_steps: self.total_steps,
        }
    }

    fn advance_to(&self, step: usize) {
        if step <= self.step.get() {
            return;
        }
        self.step.set(step);
        self.observers.notify(&self.state());
    }
}

/// 步骤序列
///
/// drop 时取消所有尚未触发的步骤定时器。
pub struct StepSequence {
    timeline: Timeline,
    shared: Rc<Shared>,
    timers: Vec<TimerId>,
}

impl std::fmt::Debug for StepSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepSequence")
            .field("state", &self.state())
            .finish()
    }
}

impl StepSequence {
    /// 创建并启动序列
    ///
    /// `delays` 至少要有 `total_steps` 个，多出的部分被忽略。
    pub fn new(
        timeline: &Timeline,
        total_steps: usize,
        delays: &[Duration],
    ) -> Result<Self, SequenceError> {
        if delays.len() < total_steps {
            return Err(SequenceError::NotEnoughDelays {
                total_steps,
                delays: delays.len(),
            });
        }

        let shared = Rc::new(Shared {
            step: Cell::new(0),
            total_steps,
            observers: Observable::new(),
        });

        let mut offset = Duration::ZERO;
        let timers: Vec<TimerId> = delays[..total_steps]
            .iter()
            .enumerate()
            .map(|(index, delay)| {
                offset += *delay;
                let weak = Rc::downgrade(&shared);
                timeline.schedule(offset, move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.advance_to(index + 1);
                    }
                })
            })
            .collect();

        debug!(total_steps, total_ms = offset.as_millis() as u64, "步骤序列已启动");

        Ok(Self {
            timeline: timeline.clone(),
            shared,
            timers,
        })
    }

    /// 所有步骤使用相同的间隔
    pub fn uniform(
        timeline: &Timeline,
        total_steps: usize,
        interval: Duration,
    ) -> Result<Self, SequenceError> {
        Self::new(timeline, total_steps, &vec![interval; total_steps])
    }

    /// 以毫秒给出延迟
    pub fn from_millis(
        timeline: &Timeline,
        total_steps: usize,
        delays_ms: &[u64],
    ) -> Result<Self, SequenceError> {
        let delays: Vec<Duration> = delays_ms.iter().map(|ms| Duration::from_millis(*ms)).collect();
        Self::new(timeline, total_steps, &delays)
    }

    /// 当前步骤
    pub fn step(&self) -> usize {
        self.shared.step.get()
    }

    /// 状态快照
    pub fn state(&self) -> SequenceState {
        self.shared.state()
    }

    /// 是否已播放完毕
    pub fn is_complete(&self) -> bool {
        self.state().is_complete()
    }

    /// 订阅步骤变化
    pub fn subscribe(&self, listener: impl FnMut(&SequenceState) + 'static) -> ListenerId {
        self.shared.observers.subscribe(listener)
    }

    /// 取消订阅
    pub fn unsubscribe(&self, id: ListenerId) {
        self.shared.observers.unsubscribe(id);
    }

    /// 卸载：取消剩余的步骤定时器
    pub fn dispose(self) {
        // 实际清理在 Drop 中
        debug!(step = self.step(), "步骤序列卸载");
    }
}

impl Drop for StepSequence {
    fn drop(&mut self) {
        let timeline = &self.timeline;
        let cancelled = self
            .timers
            .drain(..)
            .filter(|id| timeline.cancel(*id))
            .count();
        if cancelled > 0 {
            debug!(cancelled, "已取消未触发的步骤");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_cumulative_steps() {
        let timeline = Timeline::new();
        let sequence = StepSequence::from_millis(&timeline, 3, &[100, 200, 300]).unwrap();
        assert_eq!(sequence.step(), 0);
        assert_eq!(timeline.pending(), 3);

        timeline.advance(ms(99));
        assert_eq!(sequence.step(), 0);

        timeline.advance(ms(1));
        assert_eq!(sequence.step(), 1);

        timeline.advance_to(ms(299));
        assert_eq!(sequence.step(), 1);
        timeline.advance_to(ms(300));
        assert_eq!(sequence.step(), 2);

        timeline.advance_to(ms(599));
        assert_eq!(sequence.step(), 2);
        timeline.advance_to(ms(600));
        assert_eq!(sequence.step(), 3);
        assert!(sequence.is_complete());

        // 不再推进
        timeline.advance(ms(10_000));
        assert_eq!(sequence.step(), 3);
    }

    #[test]
    fn test_large_jump_fires_each_step() {
        let timeline = Timeline::new();
        let sequence = StepSequence::from_millis(&timeline, 3, &[100, 200, 300]).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        sequence.subscribe(move |state| s.borrow_mut().push(state.step));

        timeline.advance(ms(5_000));
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_not_enough_delays() {
        let timeline = Timeline::new();
        let err = StepSequence::from_millis(&timeline, 3, &[100, 200]).unwrap_err();
        assert_eq!(
            err,
            SequenceError::NotEnoughDelays {
                total_steps: 3,
                delays: 2
            }
        );
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn test_extra_delays_ignored() {
        let timeline = Timeline::new();
        let sequence = StepSequence::from_millis(&timeline, 2, &[10, 10, 10, 10]).unwrap();
        assert_eq!(timeline.pending(), 2);
        timeline.advance(ms(100));
        assert_eq!(sequence.step(), 2);
    }

    #[test]
    fn test_zero_steps_is_complete() {
        let timeline = Timeline::new();
        let sequence = StepSequence::new(&timeline, 0, &[]).unwrap();
        assert!(sequence.is_complete());
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn test_zero_delays_advance_in_order() {
        let timeline = Timeline::new();
        let sequence = StepSequence::from_millis(&timeline, 3, &[0, 0, 50]).unwrap();
        timeline.advance(Duration::ZERO);
        assert_eq!(sequence.step(), 2);
    }

    #[test]
    fn test_uniform() {
        let timeline = Timeline::new();
        let sequence = StepSequence::uniform(&timeline, 4, ms(150)).unwrap();
        timeline.advance(ms(450));
        assert_eq!(sequence.step(), 3);
    }

    #[test]
    fn test_drop_cancels_remaining() {
        let timeline = Timeline::new();
        let sequence = StepSequence::from_millis(&timeline, 3, &[100, 200, 300]).unwrap();
        let seen = Rc::new(Cell::new(0));

        let s = seen.clone();
        sequence.subscribe(move |state| s.set(state.step));

        timeline.advance(ms(150));
        assert_eq!(seen.get(), 1);

        sequence.dispose();
        assert_eq!(timeline.pending(), 0);

        // 原定触发时间已过，也不会再有任何状态变化
        timeline.advance(ms(1_000));
        assert_eq!(seen.get(), 1);
    }
}
