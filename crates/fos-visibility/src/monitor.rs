//! Monitor / Timer
//!
//! Periodic sampling of one element. A monitor runs a single session:
//! `Idle -> Running -> Stopped`, and a stopped monitor is never restarted.
//!
//! Ticks come from a [`Scheduler`] and each runs to completion. Timer and
//! event callbacks only hold weak references back to the monitor, so
//! dropping the [`Monitor`] tears the session down.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use fos_dom::{DomEvent, DomEventType};
use serde::Serialize;

use crate::error::{Result, VisibilityError};
use crate::evaluator::Visibility;
use crate::event_loop::{Clock, Scheduler, TimerId};
use crate::events::{EmitterListenerId, EventEmitter, EventScope, EventSource};
use crate::host::ElementHost;
use crate::page_visibility::DocumentVisibility;
use crate::reading::{VisibilityReading, VisibilityState};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    Idle,
    Running,
    /// Terminal
    Stopped,
}

/// Handle of a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorHandle(TimerId);

/// Events emitted by a monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    Started,
    /// Every sample, scheduled or event-driven
    Update(VisibilityReading),
    StateChanged { previous: VisibilityState, current: VisibilityState },
    PercentageChanged { previous: f64, current: f64 },
    /// The `every` condition held for its full duration
    ThresholdPassed { elapsed_ms: f64 },
    Stopped,
}

/// Callback run once when an `every` condition is met
pub type ThresholdCallback = Box<dyn FnOnce(&VisibilityReading)>;

/// Threshold-over-time test for [`Monitor::every`]
pub struct EveryOptions {
    /// Minimum visible fraction, in [0, 1]
    pub percentage_threshold: f64,
    /// How long the fraction must hold without interruption
    pub duration_ms: u64,
    /// Sampling cadence; defaults from the configuration
    pub sample_interval_ms: Option<u64>,
    /// Take the first sample when the session starts
    pub fire_immediately: bool,
    on_passed: ThresholdCallback,
}

impl EveryOptions {
    pub fn new(percentage_threshold: f64, duration_ms: u64, on_passed: impl FnOnce(&VisibilityReading) + 'static) -> Self {
        Self {
            percentage_threshold,
            duration_ms,
            sample_interval_ms: None,
            fire_immediately: false,
            on_passed: Box::new(on_passed),
        }
    }

    pub fn sample_interval(mut self, interval_ms: u64) -> Self {
        self.sample_interval_ms = Some(interval_ms);
        self
    }

    pub fn fire_immediately(mut self, fire: bool) -> Self {
        self.fire_immediately = fire;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.percentage_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(VisibilityError::invalid_config(format!(
                "percentage threshold {} outside [0, 1]", threshold
            )));
        }
        if self.sample_interval_ms == Some(0) {
            return Err(VisibilityError::invalid_config("sample interval must be positive"));
        }
        Ok(())
    }
}

impl fmt::Debug for EveryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EveryOptions")
            .field("percentage_threshold", &self.percentage_threshold)
            .field("duration_ms", &self.duration_ms)
            .field("sample_interval_ms", &self.sample_interval_ms)
            .field("fire_immediately", &self.fire_immediately)
            .finish_non_exhaustive()
    }
}

/// Progress of a threshold-over-time test
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConditionState {
    /// When the current qualifying run began
    pub threshold_start_time: Option<f64>,
}

impl ConditionState {
    /// Feed one sample. Returns how long the condition has held, or `None`
    /// (and resets) when the sample is below the threshold.
    pub fn observe(&mut self, percentage: f64, threshold: f64, now: f64) -> Option<f64> {
        if percentage < threshold {
            self.threshold_start_time = None;
            return None;
        }
        let start = *self.threshold_start_time.get_or_insert(now);
        Some(now - start)
    }

    pub fn reset(&mut self) {
        self.threshold_start_time = None;
    }
}

#[derive(Debug)]
struct MonitorSession {
    state: MonitorState,
    handle: Option<TimerId>,
    interval_ms: u64,
    condition: ConditionState,
    last: Option<VisibilityReading>,
    last_event_sample: Option<f64>,
}

struct MonitorInner<H: ElementHost + 'static> {
    target: H::Node,
    visibility: Rc<Visibility<H>>,
    scheduler: Rc<dyn Scheduler>,
    clock: Rc<dyn Clock>,
    events: EventEmitter<MonitorEvent>,
    session: RefCell<MonitorSession>,
    scope: EventScope,
    event_source: RefCell<Option<Rc<dyn EventSource>>>,
}

/// Periodic visibility sampler for one element
pub struct Monitor<H: ElementHost + 'static> {
    inner: Rc<MonitorInner<H>>,
}

impl<H: ElementHost + 'static> Monitor<H> {
    /// Idle monitor for `target`, ticking on `runtime`
    pub fn new<R>(visibility: Rc<Visibility<H>>, target: H::Node, runtime: Rc<R>) -> Self
    where
        R: Clock + Scheduler + 'static,
    {
        let scheduler: Rc<dyn Scheduler> = runtime.clone();
        let clock: Rc<dyn Clock> = runtime;
        Self {
            inner: Rc::new(MonitorInner {
                target,
                visibility,
                scheduler,
                clock,
                events: EventEmitter::new(),
                session: RefCell::new(MonitorSession {
                    state: MonitorState::Idle,
                    handle: None,
                    interval_ms: 0,
                    condition: ConditionState::default(),
                    last: None,
                    last_event_sample: None,
                }),
                scope: EventScope::new(),
                event_source: RefCell::new(None),
            }),
        }
    }

    /// Also sample on scroll and resize, and stop on unload
    pub fn with_event_source(self, source: Rc<dyn EventSource>) -> Self {
        self.set_event_source(source);
        self
    }

    /// Takes effect when the session starts
    pub fn set_event_source(&self, source: Rc<dyn EventSource>) {
        *self.inner.event_source.borrow_mut() = Some(source);
    }

    pub fn target(&self) -> H::Node {
        self.inner.target
    }

    pub fn state(&self) -> MonitorState {
        self.inner.session.borrow().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == MonitorState::Running
    }

    /// Handle of the current session, while running
    pub fn handle(&self) -> Option<MonitorHandle> {
        self.inner.session.borrow().handle.map(MonitorHandle)
    }

    /// Sampling cadence of the session; 0 before it starts
    pub fn interval_ms(&self) -> u64 {
        self.inner.session.borrow().interval_ms
    }

    pub fn last_reading(&self) -> Option<VisibilityReading> {
        self.inner.session.borrow().last
    }

    pub fn condition(&self) -> ConditionState {
        self.inner.session.borrow().condition
    }

    pub fn events(&self) -> &EventEmitter<MonitorEvent> {
        &self.inner.events
    }

    pub fn on(&self, listener: impl Fn(&MonitorEvent) + 'static) -> EmitterListenerId {
        self.inner.events.on(listener)
    }

    pub fn off(&self, id: EmitterListenerId) -> bool {
        self.inner.events.off(id)
    }

    /// Take a reading now and emit it
    pub fn sample(&self) -> VisibilityReading {
        self.inner.sample()
    }

    /// Call `callback` with a fresh reading every `interval_ms` until stopped
    pub fn start(&self, interval_ms: u64, callback: impl FnMut(&VisibilityReading) + 'static) -> Result<MonitorHandle> {
        if interval_ms == 0 {
            return Err(VisibilityError::invalid_config("sample interval must be positive"));
        }
        self.inner.begin("start", interval_ms)?;

        let weak = Rc::downgrade(&self.inner);
        let callback = RefCell::new(callback);
        let tick: Rc<dyn Fn()> = Rc::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            if !inner.is_running() {
                return;
            }
            let reading = inner.sample();
            (&mut *callback.borrow_mut())(&reading);
        });

        Ok(self.inner.schedule(tick))
    }

    /// Run `options.on_passed` once the element has stayed at least
    /// `percentage_threshold` visible for `duration_ms`, then stop.
    pub fn every(&self, options: EveryOptions) -> Result<MonitorHandle> {
        options.validate()?;
        let interval_ms = options.sample_interval_ms
            .unwrap_or_else(|| self.inner.visibility.config().sample_interval_for(options.duration_ms));
        self.inner.begin("every", interval_ms)?;

        let EveryOptions { percentage_threshold, duration_ms, fire_immediately, on_passed, .. } = options;
        let weak = Rc::downgrade(&self.inner);
        let on_passed = RefCell::new(Some(on_passed));
        // Samples once; true when this sample met the condition and ran `on_passed`
        let check: Rc<dyn Fn() -> bool> = Rc::new(move || {
            let Some(inner) = weak.upgrade() else { return false };
            if !inner.is_running() {
                return false;
            }
            let reading = inner.sample();
            let now = inner.clock.now();
            let elapsed = inner.session.borrow_mut().condition.observe(reading.percentage, percentage_threshold, now);

            let Some(elapsed) = elapsed else { return false };
            if elapsed < duration_ms as f64 {
                return false;
            }
            let Some(callback) = on_passed.borrow_mut().take() else { return false };

            tracing::debug!("Threshold {} held for {}ms on {:?}", percentage_threshold, elapsed, inner.target);
            inner.events.emit(&MonitorEvent::ThresholdPassed { elapsed_ms: elapsed });
            callback(&reading);
            true
        });

        let weak = Rc::downgrade(&self.inner);
        let scheduled = Rc::clone(&check);
        let handle = self.inner.schedule(Rc::new(move || {
            if !scheduled() {
                return;
            }
            let Some(inner) = weak.upgrade() else { return };
            // stopping from inside the tick would cancel the running timer
            let deferred = Weak::clone(&weak);
            inner.scheduler.defer(Box::new(move || {
                if let Some(inner) = deferred.upgrade() {
                    inner.stop();
                }
            }));
        }));

        if fire_immediately && check() {
            self.inner.stop();
        }
        Ok(handle)
    }

    /// End the session. Idempotent; a no-op before the session starts.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Stop the session `handle` belongs to. Stale or unknown handles are ignored.
    pub fn stop_handle(&self, handle: MonitorHandle) {
        let current = self.inner.session.borrow().handle;
        if current == Some(handle.0) {
            self.inner.stop();
        }
    }
}

impl<H: ElementHost + 'static> MonitorInner<H> {
    fn is_running(&self) -> bool {
        self.session.borrow().state == MonitorState::Running
    }

    /// Move Idle -> Running and wire up event-driven sampling
    fn begin(self: &Rc<Self>, operation: &'static str, interval_ms: u64) -> Result<()> {
        {
            let mut session = self.session.borrow_mut();
            if session.state != MonitorState::Idle {
                return Err(VisibilityError::InvalidState { operation, state: session.state });
            }
            session.state = MonitorState::Running;
            session.interval_ms = interval_ms;
        }

        let weak = Rc::downgrade(self);
        self.scope.add(self.visibility.page_visibility().on_change(Rc::new(move |state: DocumentVisibility| {
            if let Some(inner) = weak.upgrade() {
                tracing::trace!("Page visibility now {:?}", state);
                inner.sample_on_event(false);
            }
        })));

        let source = self.event_source.borrow().clone();
        if let Some(source) = source {
            for event_type in [DomEventType::Scroll, DomEventType::Resize] {
                let weak = Rc::downgrade(self);
                self.scope.add(source.subscribe(event_type, Rc::new(move |_: &DomEvent| {
                    if let Some(inner) = weak.upgrade() {
                        inner.sample_on_event(true);
                    }
                })));
            }
            let weak = Rc::downgrade(self);
            self.scope.add(source.subscribe(DomEventType::Unload, Rc::new(move |_: &DomEvent| {
                if let Some(inner) = weak.upgrade() {
                    inner.stop();
                }
            })));
        }

        tracing::debug!("Monitor {} on {:?} every {}ms", operation, self.target, interval_ms);
        self.events.emit(&MonitorEvent::Started);
        Ok(())
    }

    fn schedule(&self, tick: Rc<dyn Fn()>) -> MonitorHandle {
        let interval_ms = self.session.borrow().interval_ms;
        let id = self.scheduler.set_interval(interval_ms, Box::new(move || tick()));
        self.session.borrow_mut().handle = Some(id);
        MonitorHandle(id)
    }

    fn sample(&self) -> VisibilityReading {
        let reading = self.visibility.reading(self.target);
        let previous = self.session.borrow_mut().last.replace(reading);
        tracing::trace!("Sample {:?}: {:?}", self.target, reading);

        self.events.emit(&MonitorEvent::Update(reading));
        if let Some(previous) = previous {
            if previous.state() != reading.state() {
                self.events.emit(&MonitorEvent::StateChanged {
                    previous: previous.state(),
                    current: reading.state(),
                });
            }
            if previous.percentage != reading.percentage {
                self.events.emit(&MonitorEvent::PercentageChanged {
                    previous: previous.percentage,
                    current: reading.percentage,
                });
            }
        }
        reading
    }

    /// Sample outside the tick cadence. Does not touch threshold progress.
    fn sample_on_event(&self, throttled: bool) {
        let now = self.clock.now();
        {
            let mut session = self.session.borrow_mut();
            if session.state != MonitorState::Running {
                return;
            }
            if throttled {
                let throttle = self.visibility.config().event_throttle_ms as f64;
                if session.last_event_sample.is_some_and(|last| now - last < throttle) {
                    return;
                }
                session.last_event_sample = Some(now);
            }
        }
        self.sample();
    }

    fn stop(&self) {
        let handle = {
            let mut session = self.session.borrow_mut();
            if session.state != MonitorState::Running {
                return;
            }
            session.state = MonitorState::Stopped;
            session.handle.take()
        };
        if let Some(id) = handle {
            self.scheduler.clear_interval(id);
        }
        self.scope.dispose_all();

        tracing::debug!("Monitor on {:?} stopped", self.target);
        self.events.emit(&MonitorEvent::Stopped);
    }
}

impl<H: ElementHost + 'static> Drop for MonitorInner<H> {
    fn drop(&mut self) {
        if let Some(id) = self.session.get_mut().handle.take() {
            self.scheduler.clear_interval(id);
        }
    }
}

impl<H: ElementHost + 'static> fmt::Debug for Monitor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("target", &self.inner.target)
            .field("session", &*self.inner.session.borrow())
            .finish()
    }
}

impl<H: ElementHost + 'static> Visibility<H> {
    /// Idle monitor for `target` on this evaluator
    pub fn create_monitor<R>(self: &Rc<Self>, target: H::Node, runtime: Rc<R>) -> Monitor<H>
    where
        R: Clock + Scheduler + 'static,
    {
        Monitor::new(Rc::clone(self), target, runtime)
    }
}
