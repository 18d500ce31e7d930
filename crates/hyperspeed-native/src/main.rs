//! Desktop host: a winit window driving the same engine as the browser build.
//!
//! Usage: `hyperspeed-native [config.json | preset-name]`

use hyperspeed_core::{
    config, input_for_key, instance_capacity, EngineConfig, EngineEvent, InputEvent, ParamSink,
    Visualization,
};
use hyperspeed_gpu::GpuRenderer;
use instant::Instant;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

fn load_config(arg: Option<String>) -> EngineConfig {
    let report = match arg {
        None => config::load(&serde_json::Value::Null),
        Some(path) if path.ends_with(".json") => match std::fs::read_to_string(&path) {
            Ok(text) => config::load_str(&text),
            Err(e) => {
                log::warn!("[config] cannot read {}: {}; using defaults", path, e);
                config::load(&serde_json::Value::Null)
            }
        },
        Some(preset) => config::load(&serde_json::json!({ "preset": preset })),
    };
    report.config
}

/// DOM-style key name for the shared key map.
fn key_name(key: &Key) -> Option<&str> {
    match key {
        Key::Named(NamedKey::Space) => Some(" "),
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp"),
        Key::Character(s) => Some(s.as_str()),
        _ => None,
    }
}

fn acquire(
    window: &Arc<Window>,
    size: PhysicalSize<u32>,
    capacity: usize,
) -> anyhow::Result<GpuRenderer> {
    pollster::block_on(GpuRenderer::new(
        window.clone(),
        size.width,
        size.height,
        capacity,
    ))
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cfg = load_config(std::env::args().nth(1));
    let capacity = instance_capacity(&cfg);
    let title = format!("Hyperspeed ({})", cfg.preset);

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(title.as_str())
            .with_inner_size(PhysicalSize::new(1280u32, 720u32))
            .build(&event_loop)?,
    );
    let size = window.inner_size();
    let mut viz = Visualization::mount(
        cfg,
        acquire(&window, size, capacity),
        size.width,
        size.height,
    )?;
    let sink: ParamSink = viz.engine().sink();
    {
        let window = window.clone();
        let mut show_intent = false;
        viz.on_event(move |e| {
            log::info!("[loop] event: {}", e.kind());
            match e {
                EngineEvent::UiToggled => {
                    show_intent = !show_intent;
                    if !show_intent {
                        window.set_title(&title);
                    }
                }
                EngineEvent::IntentChanged(intent) if show_intent => {
                    window.set_title(&format!("{} [{}]", title, intent.name()));
                }
                _ => {}
            }
        });
    }

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                viz.dispose();
                elwt.exit();
            }
            WindowEvent::Resized(size) => viz.resize(size.width, size.height),
            WindowEvent::Occluded(occluded) => {
                if viz.set_visible(!occluded) && !occluded {
                    if let Err(e) = viz.reattach(acquire(&window, window.inner_size(), capacity)) {
                        log::error!("[lifecycle] {e}");
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                sink.input(match state {
                    ElementState::Pressed => InputEvent::PressStart,
                    ElementState::Released => InputEvent::PressEnd,
                });
            }
            WindowEvent::CursorLeft { .. } => {
                sink.input(InputEvent::PressEnd);
            }
            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started => {
                    sink.input(InputEvent::PressStart);
                }
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    sink.input(InputEvent::PressEnd);
                }
                TouchPhase::Moved => {}
            },
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if event.logical_key == Key::Named(NamedKey::Escape) {
                    viz.dispose();
                    elwt.exit();
                    return;
                }
                let pressed = event.state == ElementState::Pressed;
                let key = key_name(&event.logical_key);
                if let Some(ev) = key.and_then(|k| input_for_key(k, pressed)) {
                    sink.input(ev);
                }
            }
            WindowEvent::RedrawRequested => {
                viz.frame_at(Instant::now());
                if viz.needs_renderer() && viz.is_visible() {
                    if let Err(e) = viz.reattach(acquire(&window, window.inner_size(), capacity)) {
                        log::error!("[lifecycle] {e}");
                    }
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            if viz.is_running() {
                window.request_redraw();
            }
        }
        _ => {}
    })?;
    Ok(())
}
