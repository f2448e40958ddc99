//! # Counter 模块
//!
//! 数字计数动画：数值在 `duration` 内从 0 变化到 `target`。
//!
//! - 按固定间隔刷新（默认约一帧），而不是一次性跳到终点
//! - 缓动曲线单调，`target >= 0` 时数值不减
//! - 另有一个一次性定时器在恰好 `duration` 时收尾，
//!   保证时长到达时数值严格等于 `target`，与刷新间隔是否整除无关
//!
//! 计数器只播放一次。

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::config::CounterConfig;
use crate::easing::EasingFunction;
use crate::error::TimerError;
use crate::observer::{ListenerId, Observable};
use crate::timeline::{Timeline, TimerControl, TimerSlot};

/// 计数器状态快照
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CounterState {
    /// 当前值
    pub value: f64,
    /// 目标值
    pub target: f64,
    /// 是否已到达目标
    pub finished: bool,
}

impl CounterState {
    /// 四舍五入后的展示值
    pub fn display_value(&self) -> i64 {
        self.value.round() as i64
    }
}

struct Shared {
    state: RefCell<CounterState>,
    elapsed: Cell<Duration>,
    duration: Duration,
    easing: EasingFunction,
    ticker: RefCell<TimerSlot>,
    finisher: RefCell<TimerSlot>,
    observers: Observable<CounterState>,
}

impl Shared {
    fn tick(&self, tick: Duration) -> TimerControl {
        if self.state.borrow().finished {
            return TimerControl::Stop;
        }

        let elapsed = self.elapsed.get() + tick;
        self.elapsed.set(elapsed);
        if elapsed >= self.duration {
            self.finish();
            return TimerControl::Stop;
        }

        let progress = self
            .easing
            .apply(elapsed.as_secs_f64() / self.duration.as_secs_f64());
        let snapshot = {
            let mut state = self.state.borrow_mut();
            state.value = state.target * progress;
            *state
        };
        self.observers.notify(&snapshot);
        TimerControl::Continue
    }

    fn finish(&self) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            if state.finished {
                return;
            }
            state.value = state.target;
            state.finished = true;
            *state
        };

        self.elapsed.set(self.duration);
        self.ticker.borrow_mut().clear();
        self.finisher.borrow_mut().clear();

        debug!(value = snapshot.target, "计数器到达目标值");
        self.observers.notify(&snapshot);
    }
}

/// 数字计数动画
///
/// drop 时取消刷新定时器和收尾定时器。
pub struct Counter {
    shared: Rc<Shared>,
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("state", &self.state())
            .field("duration", &self.shared.duration)
            .finish()
    }
}

impl Counter {
    /// 创建并启动计数器
    ///
    /// `duration` 为零时立即到达目标值。
    pub fn new(
        timeline: &Timeline,
        target: f64,
        duration: Duration,
        config: CounterConfig,
    ) -> Result<Self, TimerError> {
        let tick = config.tick();
        let immediate = duration.is_zero();

        let shared = Rc::new(Shared {
            state: RefCell::new(CounterState {
                value: if immediate { target } else { 0.0 },
                target,
                finished: immediate,
            }),
            elapsed: Cell::new(if immediate { duration } else { Duration::ZERO }),
            duration,
            easing: config.easing,
            ticker: RefCell::new(TimerSlot::new(timeline.clone())),
            finisher: RefCell::new(TimerSlot::new(timeline.clone())),
            observers: Observable::new(),
        });

        if immediate {
            return Ok(Self { shared });
        }

        let weak: Weak<Shared> = Rc::downgrade(&shared);
        let ticker = timeline.schedule_interval(tick, move || match weak.upgrade() {
            Some(shared) => shared.tick(tick),
            None => TimerControl::Stop,
        })?;
        shared.ticker.borrow_mut().replace(ticker);

        let weak = Rc::downgrade(&shared);
        let finisher = timeline.schedule(duration, move || {
            if let Some(shared) = weak.upgrade() {
                shared.finish();
            }
        });
        shared.finisher.borrow_mut().replace(finisher);

        debug!(
            goal = target,
            duration_ms = duration.as_millis() as u64,
            tick_ms = tick.as_millis() as u64,
            "计数器已启动"
        );

        Ok(Self { shared })
    }

    /// 当前值
    pub fn value(&self) -> f64 {
        self.shared.state.borrow().value
    }

    /// 目标值
    pub fn target(&self) -> f64 {
        self.shared.state.borrow().target
    }

    /// 是否已到达目标
    pub fn is_finished(&self) -> bool {
        self.shared.state.borrow().finished
    }

    /// 状态快照
    pub fn state(&self) -> CounterState {
        *self.shared.state.borrow()
    }

    /// 订阅数值变化
    pub fn subscribe(&self, listener: impl FnMut(&CounterState) + 'static) -> ListenerId {
        self.shared.observers.subscribe(listener)
    }

    /// 取消订阅
    pub fn unsubscribe(&self, id: ListenerId) {
        self.shared.observers.unsubscribe(id);
    }

    /// 卸载：停止刷新
    pub fn dispose(self) {
        self.shared.ticker.borrow_mut().clear();
        self.shared.finisher.borrow_mut().clear();
    }
}
