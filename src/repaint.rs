//! Repaint pacing.
//!
//! egui only repaints on input by default, but the music loop has to
//! keep running while the user stares at a blank canvas. The controller
//! keeps a continuous repaint interval going and lets the sequencer pull
//! the next wakeup earlier when a beat lands sooner than that.

use std::time::Duration;

pub struct RepaintController {
    /// Baseline frame interval while idle.
    interval: Duration,
    /// Earliest deadline requested this frame, if any.
    deadline: Option<Duration>,
}

impl RepaintController {
    pub fn new(interval: Duration) -> Self {
        Self { interval, deadline: None }
    }

    /// Ask for a wakeup no later than `d` from now (e.g. the next beat).
    pub fn wake_within(&mut self, d: Duration) {
        self.deadline = Some(self.deadline.map_or(d, |cur| cur.min(d)));
    }

    fn next_wakeup(&mut self) -> Duration {
        self.deadline.take().map_or(self.interval, |d| d.min(self.interval))
    }

    /// Call at the end of `update()`; schedules the next frame.
    pub fn end_frame(&mut self, ctx: &egui::Context) {
        ctx.request_repaint_after(self.next_wakeup());
    }
}
