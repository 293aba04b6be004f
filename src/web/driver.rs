use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::Window;

use crate::error::FxResult;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Calls `tick` once per display refresh until stopped.
pub struct RafLoop {
    window: Window,
    pending: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl RafLoop {
    pub fn start(window: &Window, mut tick: impl FnMut(f64) + 'static) -> FxResult<Self> {
        // `f` holds the animation-frame closure so that it can keep calling
        // `request_animation_frame` on itself. Storing it inside an `Option`
        // allows us to create the `Closure` first and then obtain a reference
        // to it from within itself.
        let f: FrameCallback = Rc::new(RefCell::new(None));
        let g = f.clone();
        let pending = Rc::new(Cell::new(None));
        let next = pending.clone();
        let win = window.clone();

        let closure = Closure::wrap(Box::new(move |now: f64| {
            next.set(None);
            tick(now);

            // schedule next
            let slot = f.borrow();
            let Some(cb) = slot.as_ref() else {
                return;
            };
            match win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                Ok(id) => next.set(Some(id)),
                Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
            }
        }) as Box<dyn FnMut(f64)>);

        let first = window.request_animation_frame(closure.as_ref().unchecked_ref())?;
        pending.set(Some(first));
        *g.borrow_mut() = Some(closure);

        Ok(Self { window: window.clone(), pending, callback: g })
    }

    pub fn is_running(&self) -> bool {
        self.callback.borrow().is_some()
    }

    /// Cancel the pending frame and release the callback.
    pub fn stop(&self) {
        if let Some(id) = self.pending.take() {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {e:?}");
            }
        }
        // Dropping the closure also breaks its self-reference.
        self.callback.borrow_mut().take();
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
