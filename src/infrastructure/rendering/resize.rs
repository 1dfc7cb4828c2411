use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, ResizeObserver};

use crate::domain::errors::{AppError, RenderingResult};

/// Наблюдение за размером контейнера графика.
///
/// Fires on any size change of the observed element, including ones the
/// window never hears about (a sidebar opening). Dropping the handle
/// disconnects the observer and releases the callback.
pub struct ResizeWatch {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl ResizeWatch {
    pub fn observe(target: &Element, mut on_resize: impl FnMut() + 'static) -> RenderingResult<Self> {
        let callback = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
            on_resize();
        }) as Box<dyn FnMut(js_sys::Array)>);

        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| AppError::RenderingError(format!("ResizeObserver unavailable: {e:?}")))?;
        observer.observe(target);
        Ok(Self { observer, _callback: callback })
    }
}

impl Drop for ResizeWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
