//! Event Loop Implementation
//!
//! Clock and timer services the monitor runs on, plus a single-threaded
//! virtual-time event loop implementing them. Time only moves when the
//! owner calls [`EventLoop::advance`], which keeps timing behaviour
//! deterministic.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

/// Monotonic clock in milliseconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Timer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

/// Timer and deferred-callback scheduling
pub trait Scheduler {
    /// Run `callback` every `interval_ms` until cleared
    fn set_interval(&self, interval_ms: u64, callback: Box<dyn FnMut()>) -> TimerId;

    /// Cancel an interval. Unknown ids are ignored.
    fn clear_interval(&self, id: TimerId);

    /// Run `task` once the current task has finished
    fn defer(&self, task: Box<dyn FnOnce()>);
}

/// Interval timer
struct Timer {
    id: TimerId,
    interval_ms: u64,
    next_due: u64,
    /// Taken out while the callback runs
    callback: Option<Box<dyn FnMut()>>,
}

#[derive(Default)]
struct LoopState {
    /// Pending timers
    timers: Vec<Timer>,
    /// Deferred tasks, run after each timer task
    deferred: VecDeque<Box<dyn FnOnce()>>,
    /// Next timer ID
    next_timer_id: u32,
    /// Current timestamp (ms)
    current_time: u64,
}

/// Virtual-time event loop
#[derive(Default)]
pub struct EventLoop {
    state: RefCell<LoopState>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (ms)
    pub fn current_time(&self) -> u64 {
        self.state.borrow().current_time
    }

    /// Advance time by `delta_ms`, firing due timers in due order.
    ///
    /// Each timer task runs to completion and is followed by the deferred
    /// tasks it queued.
    pub fn advance(&self, delta_ms: u64) {
        let target = self.current_time().saturating_add(delta_ms);

        while let Some((id, mut callback)) = self.take_due_timer(target) {
            callback();

            // Re-arm unless the timer was cleared while running
            if let Some(timer) = self.state.borrow_mut().timers.iter_mut().find(|t| t.id == id) {
                timer.callback = Some(callback);
            }
            self.run_deferred();
        }

        self.state.borrow_mut().current_time = target;
        self.run_deferred();
    }

    fn take_due_timer(&self, target: u64) -> Option<(TimerId, Box<dyn FnMut()>)> {
        let mut state = self.state.borrow_mut();
        let timer = state.timers
            .iter_mut()
            .filter(|t| t.callback.is_some() && t.next_due <= target)
            .min_by_key(|t| (t.next_due, t.id.0))?;

        let due = timer.next_due;
        timer.next_due = due + timer.interval_ms;
        let id = timer.id;
        let callback = timer.callback.take()?;
        state.current_time = due;
        Some((id, callback))
    }

    /// Run queued deferred tasks, including ones queued while draining
    pub fn run_deferred(&self) {
        loop {
            let task = self.state.borrow_mut().deferred.pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Number of active timers
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Check if there's pending work
    pub fn has_pending_work(&self) -> bool {
        let state = self.state.borrow();
        !state.timers.is_empty() || !state.deferred.is_empty()
    }
}

impl Clock for EventLoop {
    fn now(&self) -> f64 {
        self.current_time() as f64
    }
}

impl Scheduler for EventLoop {
    fn set_interval(&self, interval_ms: u64, callback: Box<dyn FnMut()>) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_timer_id);
        state.next_timer_id += 1;
        let interval_ms = interval_ms.max(1);
        let next_due = state.current_time + interval_ms;
        state.timers.push(Timer {
            id,
            interval_ms,
            next_due,
            callback: Some(callback),
        });
        tracing::trace!("Set interval {:?} every {}ms", id, interval_ms);
        id
    }

    fn clear_interval(&self, id: TimerId) {
        self.state.borrow_mut().timers.retain(|t| t.id != id);
    }

    fn defer(&self, task: Box<dyn FnOnce()>) {
        self.state.borrow_mut().deferred.push_back(task);
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventLoop")
            .field("current_time", &state.current_time)
            .field("timers", &state.timers.len())
            .field("deferred", &state.deferred.len())
            .finish()
    }
}
