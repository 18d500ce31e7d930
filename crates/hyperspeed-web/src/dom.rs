use hyperspeed_core::ListenerGuard;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

pub fn canvas_by_id(id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let document = web::window()
        .and_then(|w| w.document())
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{id}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|_| anyhow::anyhow!("#{id} is not a canvas"))
}

/// Match the canvas backing store to its CSS size times devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (u32, u32) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = ((rect.width() * dpr) as u32).max(1);
        let h_px = ((rect.height() * dpr) as u32).max(1);
        canvas.set_width(w_px);
        canvas.set_height(h_px);
    }
    (canvas.width().max(1), canvas.height().max(1))
}

pub fn is_document_visible() -> bool {
    web::window()
        .and_then(|w| w.document())
        .map(|d| d.visibility_state() == web::VisibilityState::Visible)
        .unwrap_or(true)
}

/// JSON text for a JS value; `None` for `undefined`/`null` or values
/// `JSON.stringify` rejects.
pub fn json_text(value: &JsValue) -> Option<String> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
}

/// Register `handler` for `name` on `target`. The listener is removed and
/// its closure freed when the returned guard is released or dropped.
pub fn listen<E>(
    target: &web::EventTarget,
    name: &'static str,
    handler: impl FnMut(E) + 'static,
) -> anyhow::Result<ListenerGuard>
where
    E: FromWasmAbi + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target
        .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        .map_err(js_err)?;
    let target = target.clone();
    Ok(ListenerGuard::new(name, move || {
        let _ = target.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        drop(closure);
    }))
}
