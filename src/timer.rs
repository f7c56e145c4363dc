use crate::core::{Scheduler, TaskHandle};
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Scheduler backed by `window.setTimeout`.
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskHandle {
        let handle = TaskHandle::new();
        let guard = handle.clone();
        let callback = Closure::once_into_js(move || {
            if !guard.is_cancelled() {
                task();
            }
        });
        let millis = delay.as_millis().min(i32::MAX as u128) as i32;
        match web::window() {
            Some(window) => {
                if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.unchecked_ref(),
                    millis,
                ) {
                    log::error!("[timer] setTimeout error: {:?}", e);
                }
            }
            None => log::error!("[timer] no window; dropping task"),
        }
        handle
    }
}
