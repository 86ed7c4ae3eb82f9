//! Frame scheduling
//!
//! The game never drives itself. It asks a [`Scheduler`] for the next frame
//! and the host hands fired frames back through `Game::frame`. Handles are
//! single-use: a frame fires at most once and a cancelled handle never fires.

use std::cell::RefCell;
use std::rc::Rc;

/// Identifies one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Per-frame callback source (requestAnimationFrame-like)
pub trait Scheduler {
    /// Request one callback on the next frame
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a request. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualClock {
    next_id: u64,
    now_ms: f64,
    pending: Vec<FrameHandle>,
}

/// Deterministic scheduler for tests and headless runs.
///
/// Clones share state, so the driver keeps one handle while the game owns
/// another. [`ManualScheduler::advance`] moves time forward and returns every
/// frame due, in request order.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time (ms)
    pub fn now_ms(&self) -> f64 {
        self.clock.borrow().now_ms
    }

    /// Outstanding requests
    pub fn pending(&self) -> Vec<FrameHandle> {
        self.clock.borrow().pending.clone()
    }

    /// Advance time and drain all outstanding requests as `(handle, timestamp)`
    pub fn advance(&self, step_ms: f64) -> Vec<(FrameHandle, f64)> {
        let mut clock = self.clock.borrow_mut();
        clock.now_ms += step_ms.max(0.0);
        let now = clock.now_ms;
        clock.pending.drain(..).map(|h| (h, now)).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut clock = self.clock.borrow_mut();
        clock.next_id += 1;
        let handle = FrameHandle(clock.next_id);
        clock.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.clock.borrow_mut().pending.retain(|h| *h != handle);
    }
}

/// Frame sink invoked by [`RafScheduler`]
#[cfg(target_arch = "wasm32")]
pub type FrameSink = Box<dyn FnMut(FrameHandle, f64)>;

/// `window.requestAnimationFrame` scheduler.
///
/// Fired frames are delivered to the sink installed through
/// [`RafScheduler::sink_slot`], normally a closure that forwards to
/// `Game::frame`.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct RafScheduler {
    sink: Rc<RefCell<Option<FrameSink>>>,
    ids: Rc<RefCell<std::collections::HashMap<FrameHandle, i32>>>,
    next_id: u64,
}

#[cfg(target_arch = "wasm32")]
impl RafScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared slot for the frame sink. Install the sink after the game that
    /// owns this scheduler has been wrapped for sharing.
    pub fn sink_slot(&self) -> Rc<RefCell<Option<FrameSink>>> {
        Rc::clone(&self.sink)
    }
}

#[cfg(target_arch = "wasm32")]
impl Scheduler for RafScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::closure::Closure;

        self.next_id += 1;
        let handle = FrameHandle(self.next_id);

        let sink = Rc::clone(&self.sink);
        let ids = Rc::clone(&self.ids);
        let callback = Closure::once_into_js(move |time: f64| {
            ids.borrow_mut().remove(&handle);
            match sink.try_borrow_mut() {
                Ok(mut slot) => {
                    if let Some(deliver) = slot.as_mut() {
                        deliver(handle, time);
                    }
                }
                Err(_) => log::warn!("Frame {:?} fired while the sink was busy", handle),
            }
        });

        let Some(window) = web_sys::window() else {
            log::warn!("No window; frame {:?} will never fire", handle);
            return handle;
        };
        match window.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => {
                self.ids.borrow_mut().insert(handle, id);
            }
            Err(err) => log::warn!("requestAnimationFrame failed: {:?}", err),
        }
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if let Some(id) = self.ids.borrow_mut().remove(&handle) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_fires_once() {
        let driver = ManualScheduler::new();
        let mut sched = driver.clone();

        let a = sched.request_frame();
        let b = sched.request_frame();
        assert_ne!(a, b);

        let fired = driver.advance(16.0);
        assert_eq!(fired, vec![(a, 16.0), (b, 16.0)]);
        assert!(driver.advance(16.0).is_empty());
        assert_eq!(driver.now_ms(), 32.0);
    }

    #[test]
    fn test_manual_scheduler_cancel() {
        let driver = ManualScheduler::new();
        let mut sched = driver.clone();

        let a = sched.request_frame();
        let b = sched.request_frame();
        sched.cancel(a);
        sched.cancel(FrameHandle(999));

        assert_eq!(driver.pending(), vec![b]);
        assert_eq!(driver.advance(10.0), vec![(b, 10.0)]);
    }
}
