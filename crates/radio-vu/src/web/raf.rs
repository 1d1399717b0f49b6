use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::scheduler::{FrameHandle, FrameScheduler};

/// [`FrameScheduler`] backed by `requestAnimationFrame`.
pub struct RafScheduler {
    window: web_sys::Window,
    callback: Closure<dyn FnMut(f64)>,
}

impl RafScheduler {
    pub fn new(window: web_sys::Window, mut on_frame: impl FnMut() + 'static) -> Self {
        let callback = Closure::wrap(Box::new(move |_timestamp: f64| on_frame()) as Box<dyn FnMut(f64)>);
        Self { window, callback }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.window
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
            .map(FrameHandle)
            .map_err(|err| log::error!("requestAnimationFrame failed: {err:?}"))
            .ok()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("cancelAnimationFrame({}) failed: {err:?}", handle.0);
        }
    }
}
