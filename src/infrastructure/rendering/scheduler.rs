//! Animation-frame scheduling with at most one pending frame.

use crate::domain::logging::{LogComponent, get_logger};
use gloo::render::{AnimationFrame, request_animation_frame};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Coalesces redraw requests into the next animation frame.
///
/// Scheduling while a frame is pending cancels it and schedules the new
/// callback instead, so no render backlog builds up.
#[derive(Default, Clone)]
pub struct FrameScheduler {
    handle: Rc<RefCell<Option<AnimationFrame>>>,
    pending: Rc<Cell<bool>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `callback` for the next frame. Returns `true` when a pending
    /// frame was superseded.
    pub fn schedule<F>(&self, callback: F) -> bool
    where
        F: FnOnce(f64) + 'static,
    {
        let superseded = self.pending.replace(true);
        let pending = self.pending.clone();
        let frame = request_animation_frame(move |timestamp| {
            pending.set(false);
            callback(timestamp);
        });
        // dropping the previous handle cancels it
        *self.handle.borrow_mut() = Some(frame);
        if superseded {
            get_logger().trace(LogComponent::Infrastructure("FrameScheduler"), "pending frame superseded");
        }
        superseded
    }

    pub fn cancel(&self) {
        self.pending.set(false);
        self.handle.borrow_mut().take();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}
