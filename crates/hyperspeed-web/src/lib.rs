#![cfg(target_arch = "wasm32")]
//! Browser host: mounts the tunnel on a canvas and drives it from
//! `requestAnimationFrame`. Input handlers only enqueue into the engine's
//! sink; the loop applies them at the start of the next frame.

mod dom;
mod events;

use hyperspeed_core::{
    config, input_for_key, instance_capacity, InputEvent, ParamSink, Status, TelemetryBindings,
    Visualization, POINTER_PRESS_EVENTS, TOUCH_PRESS_EVENTS,
};
use hyperspeed_gpu::GpuRenderer;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

type Viz = Visualization<GpuRenderer>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("hyperspeed-web loaded");
}

struct Shared {
    viz: RefCell<Viz>,
    canvas: web::HtmlCanvasElement,
    capacity: usize,
    reacquiring: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Shared {
    fn request_frame(&self) {
        let tick = self.tick.borrow();
        let (Some(window), Some(cb)) = (web::window(), tick.as_ref()) else {
            return;
        };
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(e) => log::error!("[loop] requestAnimationFrame failed: {:?}", e),
        }
    }

    fn stop_loop(&self) {
        if let (Some(id), Some(window)) = (self.raf_id.take(), web::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.tick.borrow_mut().take();
    }

    fn dispose(self: &Rc<Self>) {
        match self.viz.try_borrow_mut() {
            Ok(mut viz) => viz.dispose(),
            Err(_) => {
                // called from inside an engine callback; finish after it returns
                let weak = Rc::downgrade(self);
                spawn_local(async move {
                    if let Some(shared) = weak.upgrade() {
                        shared.dispose();
                    }
                });
                return;
            }
        }
        self.stop_loop();
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.stop_loop();
    }
}

fn start_loop(shared: &Rc<Shared>) {
    let weak = Rc::downgrade(shared);
    *shared.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        shared.raf_id.set(None);
        let needs_renderer = match shared.viz.try_borrow_mut() {
            Ok(mut viz) => {
                if viz.status() == Status::Disposed {
                    return;
                }
                viz.frame_at(Instant::now());
                viz.needs_renderer() && viz.is_visible()
            }
            Err(_) => false,
        };
        if needs_renderer {
            reacquire(&shared);
        }
        shared.request_frame();
    }) as Box<dyn FnMut()>));
    shared.request_frame();
}

/// Acquire a fresh renderer after a context loss and hand it to the
/// lifecycle manager. At most one acquisition runs at a time.
fn reacquire(shared: &Rc<Shared>) {
    if shared.reacquiring.replace(true) {
        return;
    }
    let weak = Rc::downgrade(shared);
    let canvas = shared.canvas.clone();
    let capacity = shared.capacity;
    spawn_local(async move {
        let (w, h) = dom::sync_canvas_backing_size(&canvas);
        log::info!("[lifecycle] re-acquiring renderer at {}x{}", w, h);
        let renderer = GpuRenderer::new(wgpu::SurfaceTarget::Canvas(canvas), w, h, capacity).await;
        let Some(shared) = weak.upgrade() else {
            return;
        };
        shared.reacquiring.set(false);
        let Ok(mut viz) = shared.viz.try_borrow_mut() else {
            log::warn!("[lifecycle] visualization busy; retrying next frame");
            return;
        };
        if let Err(e) = viz.reattach(renderer) {
            log::error!("[lifecycle] {e}");
        }
    });
}

fn install_listeners(shared: &Rc<Shared>, sink: &ParamSink) -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: &web::EventTarget = shared.canvas.as_ref();
    let mut guards = Vec::new();

    for (name, ev) in POINTER_PRESS_EVENTS {
        let sink = sink.clone();
        guards.push(dom::listen(canvas, name, move |_: web::PointerEvent| {
            sink.input(ev);
        })?);
    }
    for (name, ev) in TOUCH_PRESS_EVENTS {
        let sink = sink.clone();
        guards.push(dom::listen(canvas, name, move |e: web::TouchEvent| {
            e.prevent_default();
            sink.input(ev);
        })?);
    }
    for (name, pressed) in [("keydown", true), ("keyup", false)] {
        let sink = sink.clone();
        guards.push(dom::listen(
            window.as_ref(),
            name,
            move |e: web::KeyboardEvent| {
                if e.repeat() {
                    return;
                }
                let key = e.key();
                if let Some(ev) = input_for_key(&key, pressed) {
                    if key == " " {
                        e.prevent_default();
                    }
                    sink.input(ev);
                }
            },
        )?);
    }

    let weak: Weak<Shared> = Rc::downgrade(shared);
    guards.push(dom::listen(window.as_ref(), "resize", move |_: web::Event| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let (w, h) = dom::sync_canvas_backing_size(&shared.canvas);
        if let Ok(mut viz) = shared.viz.try_borrow_mut() {
            viz.resize(w, h);
        }
    })?);

    let weak: Weak<Shared> = Rc::downgrade(shared);
    guards.push(dom::listen(
        document.as_ref(),
        "visibilitychange",
        move |_: web::Event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let visible = dom::is_document_visible();
            let needs_renderer = match shared.viz.try_borrow_mut() {
                Ok(mut viz) => viz.set_visible(visible),
                Err(_) => false,
            };
            if visible && needs_renderer {
                reacquire(&shared);
            }
        },
    )?);

    let mut viz = shared.viz.borrow_mut();
    for g in guards {
        viz.add_listener(g);
    }
    log::info!("[lifecycle] {} listeners registered", viz.listener_count());
    Ok(())
}

/// Handle returned to JavaScript by [`mount`].
#[wasm_bindgen]
pub struct Hyperspeed {
    shared: Rc<Shared>,
    sink: ParamSink,
    bindings: TelemetryBindings,
}

/// Mount the visualization on `<canvas id=canvas_id>`.
///
/// `config` is any JSON-compatible object (or `undefined` for the defaults).
/// Rejects when WebGPU is unavailable so the page can show its fallback.
#[wasm_bindgen]
pub async fn mount(canvas_id: String, config: JsValue) -> Result<Hyperspeed, JsValue> {
    let report = match dom::json_text(&config) {
        Some(text) => config::load_str(&text),
        None => config::load(&serde_json::Value::Null),
    };
    if !report.issues.is_empty() {
        log::warn!("[config] {} issue(s) while loading", report.issues.len());
    }
    let cfg = report.config;
    let canvas = dom::canvas_by_id(&canvas_id).map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
    let (w, h) = dom::sync_canvas_backing_size(&canvas);
    let capacity = instance_capacity(&cfg);
    let bindings = TelemetryBindings::new(&cfg.bindings);

    let renderer =
        GpuRenderer::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), w, h, capacity).await;
    let mut viz = Visualization::mount(cfg, renderer, w, h)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let sink = viz.engine().sink();
    if !dom::is_document_visible() {
        viz.set_visible(false);
    }

    let shared = Rc::new(Shared {
        viz: RefCell::new(viz),
        canvas,
        capacity,
        reacquiring: Cell::new(false),
        raf_id: Cell::new(None),
        tick: RefCell::new(None),
    });
    if let Err(e) = install_listeners(&shared, &sink) {
        log::error!("[lifecycle] listener registration failed: {e:#}");
        shared.dispose();
        return Err(JsValue::from_str(&format!("{e:#}")));
    }
    start_loop(&shared);
    Ok(Hyperspeed {
        shared,
        sink,
        bindings,
    })
}

#[wasm_bindgen]
impl Hyperspeed {
    /// Set a parameter target by name. Unknown names return `false`.
    #[wasm_bindgen(js_name = setParam)]
    pub fn set_param(&self, name: &str, value: f32) -> bool {
        self.sink.set(name, value)
    }

    /// Feed one named statistic through the telemetry bindings.
    #[wasm_bindgen(js_name = setStat)]
    pub fn set_stat(&self, stat: &str, value: f32) -> usize {
        self.bindings.apply(stat, value, &self.sink)
    }

    /// Feed a `{ stat: number, ... }` snapshot through the telemetry bindings.
    #[wasm_bindgen(js_name = setStats)]
    pub fn set_stats(&self, stats: JsValue) -> usize {
        let Some(text) = dom::json_text(&stats) else {
            return 0;
        };
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(v) => self.bindings.apply_json(&v, &self.sink),
            Err(e) => {
                log::debug!("[telemetry] ignoring unparsable stats: {}", e);
                0
            }
        }
    }

    pub fn press(&self) {
        self.sink.input(InputEvent::PressStart);
    }

    pub fn release(&self) {
        self.sink.input(InputEvent::PressEnd);
    }

    #[wasm_bindgen(js_name = toggleUi)]
    pub fn toggle_ui(&self) {
        self.sink.input(InputEvent::ToggleUi);
    }

    /// Current (interpolated) value of a parameter.
    pub fn param(&self, name: &str) -> Option<f32> {
        let viz = self.shared.viz.try_borrow().ok()?;
        viz.engine().store().read_named(name)
    }

    pub fn intent(&self) -> String {
        self.shared
            .viz
            .try_borrow()
            .map(|v| v.engine().intent().name().to_string())
            .unwrap_or_default()
    }

    /// Resolved configuration as JSON.
    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> Result<String, JsValue> {
        let viz = self
            .shared
            .viz
            .try_borrow()
            .map_err(|_| JsValue::from_str("busy"))?;
        serde_json::to_string(viz.engine().config()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Deliver engine events to `callback` as `{ type, intent?, message? }`.
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: js_sys::Function) {
        let Ok(mut viz) = self.shared.viz.try_borrow_mut() else {
            log::warn!("[lifecycle] onEvent called re-entrantly; ignored");
            return;
        };
        viz.on_event(move |e| {
            if let Err(err) = callback.call1(&JsValue::NULL, &events::to_js(e)) {
                log::warn!("[lifecycle] event callback threw: {:?}", err);
            }
        });
    }

    /// Re-read the canvas size, e.g. after a layout change the window did not report.
    pub fn resize(&self) {
        let (w, h) = dom::sync_canvas_backing_size(&self.shared.canvas);
        if let Ok(mut viz) = self.shared.viz.try_borrow_mut() {
            viz.resize(w, h);
        }
    }

    /// Stop the loop and release the renderer and every listener. Idempotent.
    pub fn dispose(&self) {
        self.shared.dispose();
    }
}
