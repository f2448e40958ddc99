//! # Timeline 模块
//!
//! 单线程、协作式的定时器设施。
//!
//! ## 核心设计理念
//!
//! Runtime 不感知真实时间流逝：Host 通过 [`Timeline::advance`] 推进虚拟时钟，
//! 到期的定时器按到期时间依次触发（同一时刻按调度顺序）。
//!
//! ```text
//! Host                      Timeline
//!   │                          │
//!   │── schedule(delay, f) ──►│  返回 TimerId
//!   │── advance(dt) ─────────►│  触发所有 due <= now + dt 的回调
//!   │── cancel(id) ──────────►│  未触发的定时器被移除
//! ```
//!
//! `Timeline` 可廉价克隆，所有克隆共享同一个队列。
//! 回调执行期间不持有内部借用，回调中可以再次 `schedule` / `cancel`，
//! 但不能在回调中再次调用 `advance`。

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use crate::error::TimerError;

/// 定时器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 周期回调的返回值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerControl {
    /// 继续下一个周期
    Continue,
    /// 停止，不再调度
    Stop,
}

enum TimerCallback {
    Once(Box<dyn FnOnce()>),
    Repeat {
        period: Duration,
        callback: Box<dyn FnMut() -> TimerControl>,
    },
}

/// 正在执行的周期定时器
#[derive(Debug, Clone, Copy)]
struct Firing {
    id: TimerId,
    cancelled: bool,
}

#[derive(Default)]
struct TimelineInner {
    now: Duration,
    next_id: u64,
    /// (到期时间, id) -> 回调；BTreeMap 的顺序即触发顺序
    queue: BTreeMap<(Duration, TimerId), TimerCallback>,
    /// id -> 到期时间，用于取消
    index: HashMap<TimerId, Duration>,
    firing: Option<Firing>,
}

impl TimelineInner {
    fn next_timer_id(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    fn insert(&mut self, id: TimerId, due: Duration, callback: TimerCallback) {
        self.queue.insert((due, id), callback);
        self.index.insert(id, due);
    }
}

/// 虚拟时间轴
#[derive(Clone, Default)]
pub struct Timeline {
    inner: Rc<RefCell<TimelineInner>>,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Timeline")
            .field("now", &inner.now)
            .field("pending", &inner.queue.len())
            .finish()
    }
}

impl Timeline {
    /// 创建新的时间轴，时钟从 0 开始
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前时间
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// 调度一次性定时器，在 `now + delay` 触发
    pub fn schedule(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_timer_id();
        let due = inner.now + delay;
        inner.insert(id, due, TimerCallback::Once(Box::new(callback)));
        trace!(timer = id.0, due_ms = due.as_millis() as u64, "调度一次性定时器");
        id
    }

    /// 调度周期定时器
    ///
    /// 首次在 `now + period` 触发，之后每隔 `period` 触发一次，
    /// 直到回调返回 [`TimerControl::Stop`] 或被取消。
    pub fn schedule_interval(
        &self,
        period: Duration,
        callback: impl FnMut() -> TimerControl + 'static,
    ) -> Result<TimerId, TimerError> {
        if period.is_zero() {
            return Err(TimerError::ZeroPeriod);
        }

        let mut inner = self.inner.borrow_mut();
        let id = inner.next_timer_id();
        let due = inner.now + period;
        inner.insert(
            id,
            due,
            TimerCallback::Repeat {
                period,
                callback: Box::new(callback),
            },
        );
        trace!(timer = id.0, period_ms = period.as_millis() as u64, "调度周期定时器");
        Ok(id)
    }

    /// 取消定时器
    ///
    /// # 返回
    /// - `true`: 定时器尚未触发（或是正在执行的周期定时器），已取消
    /// - `false`: 定时器不存在、已经触发，或是正在执行的一次性定时器
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut inner = self.inner.borrow_mut();

        if let Some(firing) = inner.firing.as_mut()
            && firing.id == id
        {
            let was_cancelled = firing.cancelled;
            firing.cancelled = true;
            return !was_cancelled;
        }

        let Some(due) = inner.index.remove(&id) else {
            return false;
        };
        let callback = inner.queue.remove(&(due, id));
        drop(inner);
        // 回调在借用释放之后才被 drop
        drop(callback);
        trace!(timer = id.0, "取消定时器");
        true
    }

    /// 定时器是否仍在等待触发
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner.borrow().index.contains_key(&id)
    }

    /// 等待中的定时器数量
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// 最近一个定时器的到期时间
    pub fn next_due(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .queue
            .first_key_value()
            .map(|(&(due, _), _)| due)
    }

    /// 推进时钟 `dt`，返回触发的回调数量
    pub fn advance(&self, dt: Duration) -> usize {
        let target = self.now() + dt;
        self.advance_to(target)
    }

    /// 推进时钟到 `target`，返回触发的回调数量
    ///
    /// `target` 早于当前时间时不做任何事。
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;

        loop {
            let ((due, id), callback) = {
                let mut inner = self.inner.borrow_mut();
                match inner.queue.first_key_value() {
                    Some((&(due, _), _)) if due <= target => {}
                    _ => break,
                }
                let Some(entry) = inner.queue.pop_first() else {
                    break;
                };
                let (_, id) = entry.0;
                inner.index.remove(&id);
                inner.now = inner.now.max(entry.0.0);
                // 一次性定时器执行时已出队，不可再取消
                if let TimerCallback::Repeat { .. } = entry.1 {
                    inner.firing = Some(Firing {
                        id,
                        cancelled: false,
                    });
                }
                entry
            };

            match callback {
                TimerCallback::Once(callback) => callback(),
                TimerCallback::Repeat {
                    period,
                    mut callback,
                } => {
                    let control = callback();
                    let cancelled = self.inner.borrow().firing.is_some_and(|f| f.cancelled);
                    // 不再调度时，回调在借用释放之后才被 drop
                    if control == TimerControl::Continue && !cancelled {
                        self.inner.borrow_mut().insert(
                            id,
                            due + period,
                            TimerCallback::Repeat { period, callback },
                        );
                    }
                }
            }

            self.inner.borrow_mut().firing = None;
            fired += 1;
        }

        let mut inner = self.inner.borrow_mut();
        if inner.now < target {
            inner.now = target;
        }
        fired
    }
}

/// 单个定时器槽位："取消旧的，持有新的"
///
/// 替换或释放时都会取消尚未触发的旧定时器。
#[derive(Debug)]
pub struct TimerSlot {
    timeline: Timeline,
    current: Option<TimerId>,
}

impl TimerSlot {
    /// 创建空槽位
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            current: None,
        }
    }

    /// 放入新定时器，取消旧定时器
    pub fn replace(&mut self, id: TimerId) {
        if let Some(old) = self.current.replace(id) {
            self.timeline.cancel(old);
        }
    }

    /// 取消当前定时器
    ///
    /// 返回是否真的取消了一个尚未触发的定时器。
    pub fn clear(&mut self) -> bool {
        self.current
            .take()
            .is_some_and(|id| self.timeline.cancel(id))
    }

    /// 定时器已触发，释放槽位但不取消
    pub fn release(&mut self) -> Option<TimerId> {
        self.current.take()
    }

    /// 槽位中是否有等待触发的定时器
    pub fn is_armed(&self) -> bool {
        self.current.is_some_and(|id| self.timeline.is_pending(id))
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.clear();
    }
}
