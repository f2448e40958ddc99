//! # Observer 模块
//!
//! 状态单元的变更通知。
//!
//! 每个状态单元对外暴露 "当前快照 + 变更通知"：渲染层订阅后，
//! 在每次状态变化时收到新的快照并重绘，不依赖任何具体 UI 框架。

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// 监听器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<S> = Box<dyn FnMut(&S)>;

/// 可观察对象
///
/// 使用内部可变性，`notify` 期间监听器可以再次读取所属状态单元，
/// 也可以订阅、取消订阅，或者修改状态单元触发新的通知。
/// 监听器中触发的通知会排队，在当前这一轮送达所有监听器之后按顺序送达。
pub struct Observable<S> {
    listeners: RefCell<Vec<(ListenerId, Listener<S>)>>,
    /// notify 期间被取消的监听器
    removed: RefCell<Vec<ListenerId>>,
    /// notify 期间产生的后续快照
    queued: RefCell<VecDeque<S>>,
    notifying: Cell<bool>,
    next_id: Cell<u64>,
}

impl<S> Default for Observable<S> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            removed: RefCell::new(Vec::new()),
            queued: RefCell::new(VecDeque::new()),
            notifying: Cell::new(false),
            next_id: Cell::new(0),
        }
    }
}

impl<S> std::fmt::Debug for Observable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<S> Observable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅变更
    pub fn subscribe(&self, listener: impl FnMut(&S) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.listeners.borrow_mut().push((id, Box::new(listener)));
        id
    }

    /// 取消订阅
    pub fn unsubscribe(&self, id: ListenerId) {
        if self.notifying.get() {
            // 正在 notify，延后到本轮通知结束再移除
            self.removed.borrow_mut().push(id);
        } else {
            self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
        }
    }

    /// 当前监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.try_borrow().map_or(0, |l| l.len())
    }

    /// 把一个快照送达所有监听器
    fn deliver(&self, snapshot: &S) {
        let mut current = std::mem::take(&mut *self.listeners.borrow_mut());

        for (id, listener) in current.iter_mut() {
            if self.removed.borrow().contains(id) {
                continue;
            }
            listener(snapshot);
        }

        let mut listeners = self.listeners.borrow_mut();
        // 本轮新增的监听器排在后面
        let added = std::mem::take(&mut *listeners);
        current.extend(added);

        let removed = std::mem::take(&mut *self.removed.borrow_mut());
        current.retain(|(id, _)| !removed.contains(id));
        *listeners = current;
    }
}

impl<S: Clone> Observable<S> {
    /// 通知所有监听器
    ///
    /// 在监听器内部调用时只把快照排队，由最外层调用送达。
    pub fn notify(&self, snapshot: &S) {
        if self.notifying.get() {
            self.queued.borrow_mut().push_back(snapshot.clone());
            return;
        }

        self.notifying.set(true);
        self.deliver(snapshot);
        loop {
            let Some(next) = self.queued.borrow_mut().pop_front() else {
                break;
            };
            self.deliver(&next);
        }
        self.notifying.set(false);
    }
}
