use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;

use crate::config::RevealConfig;
use crate::domain::{
    ledger::{LedgerEvent, new_ids_oldest_first},
    logging::LogComponent,
    reveal::RevealQueue,
};

struct Inner {
    queue: RefCell<RevealQueue>,
    timer: RefCell<Option<Timeout>>,
    on_change: Box<dyn Fn(Vec<String>)>,
}

/// Drives a [`RevealQueue`] with a single re-armed browser timeout.
///
/// `on_change` receives the full set of currently highlighted ids whenever it
/// changes. Dropping the scheduler cancels the pending timeout.
pub struct RevealScheduler {
    inner: Rc<Inner>,
}

impl RevealScheduler {
    pub fn new(config: RevealConfig, on_change: impl Fn(Vec<String>) + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                queue: RefCell::new(RevealQueue::new(config)),
                timer: RefCell::new(None),
                on_change: Box::new(on_change),
            }),
        }
    }

    pub fn push(&self, ids: Vec<String>) {
        if ids.is_empty() {
            return;
        }
        self.inner.queue.borrow_mut().enqueue(ids, js_sys::Date::now());
        pump(&self.inner);
    }

    pub fn is_animating(&self, id: &str) -> bool {
        self.inner.queue.borrow().is_animating(id)
    }

    pub fn stop(&self) {
        self.inner.timer.borrow_mut().take();
        self.inner.queue.borrow_mut().clear();
    }
}

fn pump(inner: &Rc<Inner>) {
    let now = js_sys::Date::now();
    let (step, animating, deadline) = {
        let mut queue = inner.queue.borrow_mut();
        let step = queue.advance(now);
        (step, queue.animating_ids(), queue.next_deadline())
    };
    if !step.is_empty() {
        (inner.on_change)(animating);
    }

    let weak: Weak<Inner> = Rc::downgrade(inner);
    let timer = deadline.map(|at| {
        let delay = (at - now).max(0.0).ceil() as u32;
        Timeout::new(delay, move || {
            if let Some(inner) = weak.upgrade() {
                pump(&inner);
            }
        })
    });
    // Старый таймер отменяется при замене
    *inner.timer.borrow_mut() = timer;
}

/// Remembers the last ledger page and feeds new entries to the scheduler.
pub struct LedgerWatcher {
    previous: Option<Vec<LedgerEvent>>,
    scheduler: RevealScheduler,
}

impl LedgerWatcher {
    pub fn new(scheduler: RevealScheduler) -> Self {
        Self { previous: None, scheduler }
    }

    /// The first page is a baseline and animates nothing.
    pub fn observe(&mut self, latest: Vec<LedgerEvent>) {
        if let Some(previous) = &self.previous {
            let fresh = new_ids_oldest_first(previous, &latest);
            if !fresh.is_empty() {
                crate::log_debug!(
                    LogComponent::Application("Ledger"),
                    "✨ {} new ledger entries",
                    fresh.len()
                );
                self.scheduler.push(fresh);
            }
        }
        self.previous = Some(latest);
    }

    pub fn scheduler(&self) -> &RevealScheduler {
        &self.scheduler
    }
}
