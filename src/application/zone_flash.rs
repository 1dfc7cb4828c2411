use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;

use crate::domain::game::Zone;

struct Inner {
    duration_ms: u32,
    timer: RefCell<Option<Timeout>>,
    on_change: Box<dyn Fn(Option<Zone>)>,
}

/// Короткая подсветка после смены зоны.
///
/// The clearing timer is owned: a new trigger replaces it, and `cancel`
/// (or dropping the last clone) stops it before it fires.
#[derive(Clone)]
pub struct ZoneFlash {
    inner: Rc<Inner>,
}

impl ZoneFlash {
    pub fn new(duration_ms: u32, on_change: impl Fn(Option<Zone>) + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                duration_ms,
                timer: RefCell::new(None),
                on_change: Box::new(on_change),
            }),
        }
    }

    pub fn trigger(&self, zone: Zone) {
        (self.inner.on_change)(Some(zone));
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let timer = Timeout::new(self.inner.duration_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.timer.borrow_mut().take();
                (inner.on_change)(None);
            }
        });
        *self.inner.timer.borrow_mut() = Some(timer);
    }

    pub fn is_active(&self) -> bool {
        self.inner.timer.borrow().is_some()
    }

    pub fn cancel(&self) {
        self.inner.timer.borrow_mut().take();
    }
}
