//! Clarity easing.
//!
//! Moving the clarity slider sets a target; the displayed value follows it
//! one frame at a time:
//!
//! ```text
//! current += (target - current) * 0.2
//! ```
//!
//! Once `|target - current| < 0.5` the value snaps to the target and the
//! frame task is cancelled. Retargeting mid-animation continues from the
//! current value with the same task; at most one task is ever active.
//!
//! The frame loop itself belongs to the host. [`Scheduler`] is the seam:
//! a browser host maps it to animation frames, a native host to a timer,
//! and tests to [`ManualScheduler`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::filter::clamp_param;

/// Fraction of the remaining distance covered per frame.
pub const EASING_RATE: f64 = 0.2;
/// Distance below which the value snaps to the target.
pub const SNAP_THRESHOLD: f64 = 0.5;

/// Handle to a scheduled repeating task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

/// Schedules a repeating per-frame callback.
///
/// The scheduler only tracks *whether* a task runs; on each frame the host
/// calls [`ClarityEasing::on_frame`].
pub trait Scheduler {
    /// Start a repeating task.
    fn schedule_repeating(&mut self) -> TaskId;
    /// Stop a task. Unknown ids are ignored.
    fn cancel(&mut self, id: TaskId);
}

/// A scheduler driven by explicit ticks.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    active: Vec<TaskId>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks currently scheduled.
    pub fn active(&self) -> &[TaskId] {
        &self.active
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.active.push(id);
        id
    }

    fn cancel(&mut self, id: TaskId) {
        self.active.retain(|t| *t != id);
    }
}

/// Animated clarity value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClarityEasing {
    target: f64,
    current: f64,
    #[serde(skip)]
    task: Option<TaskId>,
}

impl ClarityEasing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// The value to render with.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Whether a frame task is running.
    pub fn is_animating(&self) -> bool {
        self.task.is_some()
    }

    /// Set a new target, starting the frame task if none is running.
    pub fn set_target(&mut self, target: f64, scheduler: &mut impl Scheduler) {
        self.target = clamp_param(target);
        if self.current == self.target {
            self.stop(scheduler);
            return;
        }
        if self.task.is_none() {
            self.task = Some(scheduler.schedule_repeating());
        }
    }

    /// Jump straight to a value, cancelling any animation.
    pub fn jump_to(&mut self, value: f64, scheduler: &mut impl Scheduler) {
        let value = clamp_param(value);
        self.target = value;
        self.current = value;
        self.stop(scheduler);
    }

    /// Advance one frame. Returns `true` while the animation continues.
    pub fn on_frame(&mut self, scheduler: &mut impl Scheduler) -> bool {
        if self.task.is_none() {
            return false;
        }
        self.step();
        trace!(current = self.current, target = self.target, "clarity easing frame");
        if self.current == self.target {
            self.stop(scheduler);
            return false;
        }
        true
    }

    /// One easing step without any scheduling.
    pub fn step(&mut self) {
        self.current += (self.target - self.current) * EASING_RATE;
        if (self.target - self.current).abs() < SNAP_THRESHOLD {
            self.current = self.target;
        }
    }

    fn stop(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(id) = self.task.take() {
            scheduler.cancel(id);
        }
    }
}
