//! # Calculator 模块
//!
//! 带防抖的计算器管线。
//!
//! ## 执行模型
//!
//! ```text
//! set_inputs(updater)
//!   ├─ 同步：inputs = updater(inputs)
//!   │        errors / warnings 立即重新计算
//!   │        loading = true, chart_ready = false
//!   └─ 异步：取消尚未触发的重算，在静默期之后重新调度
//!
//! 静默期结束（期间没有新的 set_inputs）
//!   └─ results = calculate(inputs), loading = false, chart_ready = true
//! ```
//!
//! 这是经典的后沿防抖：一个静默期内只有最后一次输入会触发计算，
//! 校验反馈则每次输入都立即更新。
//!
//! `calculate` 与校验器必须是纯函数。`calculate` panic 属于调用方的 bug，
//! 管线不做捕获。

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::DebounceConfig;
use crate::observer::{ListenerId, Observable};
use crate::timeline::{Timeline, TimerSlot};
use crate::validation::{FieldErrors, FieldInputs, Validator};

/// 表单状态快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState<I, R> {
    /// 当前输入
    pub inputs: I,
    /// 字段错误（只包含无效字段）
    pub errors: FieldErrors,
    /// 警告（有序）
    pub warnings: Vec<String>,
    /// 最近一次计算结果；创建时即已计算
    pub results: Option<R>,
    /// 是否有等待中的重算
    pub loading: bool,
    /// `results` 是否对应当前 `inputs`
    pub chart_ready: bool,
}

impl<I, R> FormState<I, R> {
    /// 是否存在字段错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

struct Shared<I, R> {
    state: RefCell<FormState<I, R>>,
    pending: RefCell<TimerSlot>,
    calculate: Box<dyn Fn(&I) -> R>,
    validator: Box<dyn Validator<I>>,
    observers: Observable<FormState<I, R>>,
}

impl<I: Clone, R: Clone> Shared<I, R> {
    fn snapshot(&self) -> FormState<I, R> {
        self.state.borrow().clone()
    }

    /// 静默期结束，执行重算
    fn recompute(&self) {
        self.pending.borrow_mut().release();

        let inputs = self.state.borrow().inputs.clone();
        let results = (self.calculate)(&inputs);

        let snapshot = {
            let mut state = self.state.borrow_mut();
            state.results = Some(results);
            state.loading = false;
            state.chart_ready = true;
            state.clone()
        };

        debug!("计算器重算完成");
        self.observers.notify(&snapshot);
    }
}

/// 带防抖的计算器
///
/// drop 时取消尚未触发的重算，之后不会再修改任何状态。
pub struct Calculator<I, R> {
    timeline: Timeline,
    quiet_period: Duration,
    shared: Rc<Shared<I, R>>,
}

impl<I, R> std::fmt::Debug for Calculator<I, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calculator")
            .field("quiet_period", &self.quiet_period)
            .field("pending", &self.shared.pending.borrow().is_armed())
            .finish()
    }
}

impl<I, R> Calculator<I, R>
where
    I: Clone + 'static,
    R: Clone + 'static,
{
    /// 创建计算器
    ///
    /// 创建时立即以默认输入计算一次结果；errors / warnings 为空，
    /// loading / chart_ready 均为 false。
    pub fn new(
        timeline: &Timeline,
        default_inputs: I,
        calculate: impl Fn(&I) -> R + 'static,
        validator: impl Validator<I> + 'static,
        config: DebounceConfig,
    ) -> Self {
        let results = calculate(&default_inputs);
        let state = FormState {
            inputs: default_inputs,
            errors: FieldErrors::new(),
            warnings: Vec::new(),
            results: Some(results),
            loading: false,
            chart_ready: false,
        };

        Self {
            timeline: timeline.clone(),
            quiet_period: config.quiet_period(),
            shared: Rc::new(Shared {
                state: RefCell::new(state),
                pending: RefCell::new(TimerSlot::new(timeline.clone())),
                calculate: Box::new(calculate),
                validator: Box::new(validator),
                observers: Observable::new(),
            }),
        }
    }

    /// 更新输入
    ///
    /// `updater` 接收当前输入，返回新输入。校验同步完成，
    /// 重算在静默期之后进行，并取消之前尚未触发的重算。
    pub fn set_inputs(&self, updater: impl FnOnce(&I) -> I) {
        let current = self.inputs();
        let next = updater(&current);

        let errors = self.shared.validator.errors(&next);
        let warnings = self.shared.validator.warnings(&next);

        let snapshot = {
            let mut state = self.shared.state.borrow_mut();
            state.inputs = next;
            state.errors = errors;
            state.warnings = warnings;
            state.loading = true;
            state.chart_ready = false;
            state.clone()
        };

        let weak: Weak<Shared<I, R>> = Rc::downgrade(&self.shared);
        let id = self.timeline.schedule(self.quiet_period, move || {
            if let Some(shared) = weak.upgrade() {
                shared.recompute();
            }
        });
        self.shared.pending.borrow_mut().replace(id);
        trace!(
            timer = id.value(),
            quiet_ms = self.quiet_period.as_millis() as u64,
            "计算器重算已调度"
        );

        self.shared.observers.notify(&snapshot);
    }

    /// 当前输入
    pub fn inputs(&self) -> I {
        self.shared.state.borrow().inputs.clone()
    }

    /// 字段错误
    pub fn errors(&self) -> FieldErrors {
        self.shared.state.borrow().errors.clone()
    }

    /// 警告
    pub fn warnings(&self) -> Vec<String> {
        self.shared.state.borrow().warnings.clone()
    }

    /// 最近一次计算结果
    pub fn results(&self) -> Option<R> {
        self.shared.state.borrow().results.clone()
    }

    /// 是否有等待中的重算
    pub fn loading(&self) -> bool {
        self.shared.state.borrow().loading
    }

    /// 结果是否对应当前输入
    pub fn chart_ready(&self) -> bool {
        self.shared.state.borrow().chart_ready
    }

    /// 完整状态快照
    pub fn snapshot(&self) -> FormState<I, R> {
        self.shared.snapshot()
    }

    /// 静默期
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// 订阅状态变化
    pub fn subscribe(&self, listener: impl FnMut(&FormState<I, R>) + 'static) -> ListenerId {
        self.shared.observers.subscribe(listener)
    }

    /// 取消订阅
    pub fn unsubscribe(&self, id: ListenerId) {
        self.shared.observers.unsubscribe(id);
    }

    /// 卸载：取消尚未触发的重算
    pub fn dispose(self) {
        if self.shared.pending.borrow_mut().clear() {
            debug!("计算器卸载，已取消等待中的重算");
        }
    }
}

impl<I, R> Calculator<I, R>
where
    I: Clone + FieldInputs + 'static,
    R: Clone + 'static,
{
    /// 按字段名更新单个输入
    ///
    /// 字段不存在时不做任何事并返回 `false`。
    pub fn set_field(&self, name: &str, value: f64) -> bool {
        let mut next = self.inputs();
        if !next.set_field(name, value) {
            return false;
        }
        self.set_inputs(move |_| next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldRule, NoValidation, ValidationRules};
    use std::cell::Cell;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Inputs {
        price: f64,
        quantity: f64,
    }

    impl FieldInputs for Inputs {
        fn field(&self, name: &str) -> Option<f64> {
            match name {
                "price" => Some(self.price),
                "quantity" => Some(self.quantity),
                _ => None,
            }
        }

        fn set_field(&mut self, name: &str, value: f64) -> bool {
            match name {
                "price" => self.price = value,
                "quantity" => self.quantity = value,
                _ => return false,
            }
            true
        }
    }

    fn defaults() -> Inputs {
        Inputs {
            price: 10.0,
            quantity: 2.0,
        }
    }

    fn rules() -> ValidationRules {
        ValidationRules::new()
            .with(FieldRule::new("price", "单价").min(0.0))
            .with(FieldRule::new("quantity", "数量").range(0.0, 100.0).warn_outside(
                1.0,
                50.0,
                "数量不常见",
            ))
    }

    /// 返回计算器和 calculate 调用次数
    fn counting_calculator(timeline: &Timeline) -> (Calculator<Inputs, f64>, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let calculator = Calculator::new(
            timeline,
            defaults(),
            move |i: &Inputs| {
                c.set(c.get() + 1);
                i.price * i.quantity
            },
            rules(),
            DebounceConfig::default(),
        );
        (calculator, calls)
    }

    #[test]
    fn test_initial_state() {
        let timeline = Timeline::new();
        let (calculator, calls) = counting_calculator(&timeline);

        assert_eq!(calculator.results(), Some(20.0));
        assert_eq!(calls.get(), 1);
        assert!(calculator.errors().is_empty());
        assert!(calculator.warnings().is_empty());
        assert!(!calculator.loading());
        assert!(!calculator.chart_ready());
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn test_debounced_recompute() {
        let timeline = Timeline::new();
        let (calculator, calls) = counting_calculator(&timeline);

        calculator.set_inputs(|i| Inputs {
            quantity: 3.0,
            ..i.clone()
        });
        // 立即进入 loading，结果尚未更新
        assert!(calculator.loading());
        assert!(!calculator.chart_ready());
        assert_eq!(calculator.results(), Some(20.0));

        timeline.advance(ms(299));
        assert!(calculator.loading());
        assert_eq!(calls.get(), 1);

        timeline.advance(ms(1));
        assert!(!calculator.loading());
        assert!(calculator.chart_ready());
        assert_eq!(calculator.results(), Some(30.0));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_only_last_update_in_window_is_computed() {
        let timeline = Timeline::new();
        let (calculator, calls) = counting_calculator(&timeline);

        for quantity in [3.0, 4.0, 5.0, 6.0] {
            calculator.set_field("quantity", quantity);
            timeline.advance(ms(100));
            assert!(calculator.loading());
            assert!(!calculator.chart_ready());
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(timeline.pending(), 1);

        timeline.advance(ms(200));
        assert_eq!(calls.get(), 2);
        assert_eq!(calculator.results(), Some(60.0));
        assert!(calculator.chart_ready());

        // 之后不会再有任何重算
        timeline.advance(ms(10_000));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_validation_is_synchronous() {
        let timeline = Timeline::new();
        let (calculator, _) = counting_calculator(&timeline);

        calculator.set_field("price", -5.0);
        assert_eq!(calculator.errors()["price"], "单价不能小于 0");
        assert!(calculator.warnings().is_empty());

        calculator.set_field("price", 5.0);
        calculator.set_field("quantity", 80.0);
        assert!(calculator.errors().is_empty());
        assert_eq!(calculator.warnings(), vec!["数量不常见"]);

        // 校验不依赖定时器
        assert_eq!(timeline.now(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_inputs_still_recompute() {
        let timeline = Timeline::new();
        let (calculator, _) = counting_calculator(&timeline);

        calculator.set_field("price", -1.0);
        timeline.advance(ms(300));
        assert_eq!(calculator.results(), Some(-2.0));
        assert!(calculator.snapshot().has_errors());
    }

    #[test]
    fn test_unknown_field() {
        let timeline = Timeline::new();
        let (calculator, _) = counting_calculator(&timeline);

        assert!(!calculator.set_field("discount", 1.0));
        assert!(!calculator.loading());
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn test_loading_and_chart_ready_flip_together() {
        let timeline = Timeline::new();
        let (calculator, _) = counting_calculator(&timeline);
        let snapshots = Rc::new(RefCell::new(Vec::new()));

        let s = snapshots.clone();
        calculator.subscribe(move |state| s.borrow_mut().push((state.loading, state.chart_ready)));

        calculator.set_field("quantity", 4.0);
        calculator.set_field("quantity", 5.0);
        timeline.advance(ms(300));

        assert_eq!(
            *snapshots.borrow(),
            vec![(true, false), (true, false), (false, true)]
        );
    }

    #[test]
    fn test_drop_cancels_pending_recompute() {
        let timeline = Timeline::new();
        let (calculator, calls) = counting_calculator(&timeline);

        calculator.set_field("quantity", 7.0);
        assert_eq!(timeline.pending(), 1);
        drop(calculator);
        assert_eq!(timeline.pending(), 0);

        timeline.advance(ms(1000));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_dispose_stops_notifications() {
        let timeline = Timeline::new();
        let (calculator, _) = counting_calculator(&timeline);
        let notified = Rc::new(Cell::new(0));

        let n = notified.clone();
        calculator.subscribe(move |_| n.set(n.get() + 1));
        calculator.set_field("quantity", 7.0);
        assert_eq!(notified.get(), 1);

        calculator.dispose();
        timeline.advance(ms(1000));
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn test_listener_reads_calculator() {
        let timeline = Timeline::new();
        let calculator = Rc::new(Calculator::new(
            &timeline,
            defaults(),
            |i: &Inputs| i.price * i.quantity,
            NoValidation,
            DebounceConfig::default(),
        ));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let c = Rc::downgrade(&calculator);
        let s = seen.clone();
        calculator.subscribe(move |_| {
            if let Some(c) = c.upgrade() {
                s.borrow_mut().push(c.results());
            }
        });

        calculator.set_field("price", 1.0);
        timeline.advance(ms(300));
        assert_eq!(*seen.borrow(), vec![Some(20.0), Some(2.0)]);
    }

    #[test]
    fn test_listener_clamps_inputs() {
        let timeline = Timeline::new();
        let calculator = Rc::new(Calculator::new(
            &timeline,
            defaults(),
            |i: &Inputs| i.price * i.quantity,
            NoValidation,
            DebounceConfig::default(),
        ));
        let prices = Rc::new(RefCell::new(Vec::new()));

        // 负数价格修正为 0
        let c = Rc::downgrade(&calculator);
        calculator.subscribe(move |state| {
            if state.inputs.price < 0.0
                && let Some(c) = c.upgrade()
            {
                c.set_inputs(|i| Inputs { price: 0.0, ..i.clone() });
            }
        });
        let p = prices.clone();
        calculator.subscribe(move |state| p.borrow_mut().push(state.inputs.price));

        calculator.set_field("price", -5.0);
        assert_eq!(*prices.borrow(), vec![-5.0, 0.0]);
        assert_eq!(calculator.inputs().price, 0.0);

        timeline.advance(ms(300));
        assert_eq!(calculator.results(), Some(0.0));
        assert_eq!(*prices.borrow(), vec![-5.0, 0.0, 0.0]);
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn test_custom_quiet_period() {
        let timeline = Timeline::new();
        let calculator = Calculator::new(
            &timeline,
            defaults(),
            |i: &Inputs| i.price,
            NoValidation,
            DebounceConfig {
                quiet_period_ms: 50,
            },
        );

        calculator.set_field("price", 3.0);
        timeline.advance(ms(50));
        assert_eq!(calculator.results(), Some(3.0));
        assert_eq!(calculator.quiet_period(), ms(50));
    }
}
