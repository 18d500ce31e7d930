//! Mount, visibility, context loss and teardown around an [`Engine`].
//!
//! The host owns the frame callback and the GPU acquisition (both may be
//! asynchronous); this type owns every decision about what happens between.

use crate::clock::FrameClock;
use crate::config::EngineConfig;
use crate::engine::{Engine, EngineEvent, LoopState};
use crate::error::{EngineError, RenderError};
use crate::frame::FrameRenderer;

/// Runs its release action exactly once, on [`ListenerGuard::release`] or drop.
pub struct ListenerGuard {
    name: &'static str,
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    pub fn new(name: &'static str, release: impl FnOnce() + 'static) -> Self {
        Self {
            name,
            release: Some(Box::new(release)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn release(&mut self) {
        if let Some(f) = self.release.take() {
            log::debug!("[lifecycle] removing listener '{}'", self.name);
            f();
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Renderer attached; frames are produced while visible.
    Mounted,
    /// Renderer evicted; waiting for [`Visualization::reattach`].
    Lost,
    /// Re-acquisition failed or the renderer reported a fatal error.
    Failed,
    Disposed,
}

pub struct Visualization<R: FrameRenderer> {
    engine: Engine,
    renderer: Option<R>,
    status: Status,
    visible: bool,
    clock: FrameClock,
    listeners: Vec<ListenerGuard>,
    on_event: Option<Box<dyn FnMut(&EngineEvent)>>,
    events: Vec<EngineEvent>,
}

impl<R: FrameRenderer> Visualization<R> {
    /// Start a visualization on an acquired renderer.
    ///
    /// A failed acquisition is reported as [`EngineError::Unavailable`] and
    /// nothing is started, so the host can show its fallback.
    pub fn mount(
        config: EngineConfig,
        renderer: anyhow::Result<R>,
        width: u32,
        height: u32,
    ) -> Result<Self, EngineError> {
        let mut renderer = match renderer {
            Ok(r) => r,
            Err(e) => {
                log::warn!("[lifecycle] renderer unavailable: {e:#}");
                return Err(EngineError::Unavailable(format!("{e:#}")));
            }
        };
        let mut engine = Engine::new(config);
        engine.resize(width, height);
        renderer.resize(width.max(1), height.max(1));
        engine.start();
        log::info!("[lifecycle] mounted at {}x{}", width, height);
        Ok(Self {
            engine,
            renderer: Some(renderer),
            status: Status::Mounted,
            visible: true,
            clock: FrameClock::default(),
            listeners: Vec::new(),
            on_event: None,
            events: Vec::new(),
        })
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Keep a host listener registration alive until dispose.
    pub fn add_listener(&mut self, guard: ListenerGuard) {
        if self.status == Status::Disposed {
            // dropping the guard unregisters it straight away
            return;
        }
        self.listeners.push(guard);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver events to `f` instead of queueing them for [`Self::take_events`].
    pub fn on_event(&mut self, f: impl FnMut(&EngineEvent) + 'static) {
        self.on_event = Some(Box::new(f));
        self.flush_events();
    }

    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.flush_events();
        std::mem::take(&mut self.events)
    }

    /// Frame callback with an explicit delta. Returns whether a frame was submitted.
    pub fn frame(&mut self, dt_sec: f32) -> bool {
        if self.status != Status::Mounted {
            return false;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return false;
        };
        let result = match self.engine.tick(dt_sec) {
            Some(frame) => renderer.render(&frame),
            None => {
                self.flush_events();
                return false;
            }
        };
        let submitted = match result {
            Ok(()) => true,
            Err(RenderError::Outdated) => {
                let (w, h) = self.engine.viewport();
                renderer.resize(w, h);
                false
            }
            Err(RenderError::ContextLost) => {
                self.context_lost();
                false
            }
            Err(RenderError::Fatal(msg)) => {
                log::error!("[lifecycle] renderer failed: {}", msg);
                self.fail(msg);
                false
            }
        };
        self.flush_events();
        submitted
    }

    /// Frame callback driven by wall-clock time.
    pub fn frame_at(&mut self, now: instant::Instant) -> bool {
        let dt = self.clock.delta(now);
        self.frame(dt)
    }

    /// Host visibility change. Returns `true` when a renderer must be
    /// re-acquired before frames can resume.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.status == Status::Disposed || self.visible == visible {
            return self.needs_renderer();
        }
        self.visible = visible;
        self.clock.reset();
        if visible {
            if self.status == Status::Mounted {
                self.engine.resume();
            }
        } else {
            self.engine.pause();
        }
        self.flush_events();
        self.needs_renderer()
    }

    /// Whether the loop would currently tick.
    pub fn is_running(&self) -> bool {
        self.status == Status::Mounted && self.engine.state() == LoopState::Running
    }

    #[inline]
    pub fn needs_renderer(&self) -> bool {
        self.status == Status::Lost
    }

    /// Complete a re-acquisition started after a context loss.
    ///
    /// Parameters, pools and intent survive; only the renderer is replaced.
    pub fn reattach(&mut self, renderer: anyhow::Result<R>) -> Result<(), EngineError> {
        match self.status {
            Status::Disposed => return Err(EngineError::Disposed),
            Status::Lost => {}
            Status::Mounted | Status::Failed => {
                log::debug!("[lifecycle] reattach ignored in {:?}", self.status);
                return Ok(());
            }
        }
        let result = match renderer {
            Ok(mut r) => {
                let (w, h) = self.engine.viewport();
                r.resize(w, h);
                self.renderer = Some(r);
                self.status = Status::Mounted;
                self.clock.reset();
                if self.visible {
                    self.engine.resume();
                }
                log::info!("[lifecycle] renderer re-acquired");
                Ok(())
            }
            Err(e) => {
                let msg = format!("{e:#}");
                log::warn!("[lifecycle] re-acquisition failed: {}", msg);
                self.fail(msg.clone());
                Err(EngineError::Unavailable(msg))
            }
        };
        self.flush_events();
        result
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.status == Status::Disposed || width == 0 || height == 0 {
            return;
        }
        self.engine.resize(width, height);
        if let Some(r) = self.renderer.as_mut() {
            r.resize(width, height);
        }
    }

    /// Release listeners, the renderer and the loop. Idempotent.
    pub fn dispose(&mut self) {
        if self.status == Status::Disposed {
            return;
        }
        let n = self.listeners.len();
        for mut guard in self.listeners.drain(..) {
            guard.release();
        }
        self.renderer = None;
        self.engine.dispose();
        self.status = Status::Disposed;
        log::info!("[lifecycle] disposed ({} listeners released)", n);
        self.flush_events();
        self.on_event = None;
    }

    fn context_lost(&mut self) {
        log::warn!("[lifecycle] graphics context lost");
        self.renderer = None;
        self.status = Status::Lost;
        self.engine.pause();
        self.events.push(EngineEvent::ContextLost);
    }

    fn fail(&mut self, msg: String) {
        self.renderer = None;
        self.status = Status::Failed;
        self.engine.pause();
        self.events.push(EngineEvent::Unavailable(msg));
    }

    fn flush_events(&mut self) {
        // engine events first so Paused precedes ContextLost
        let mut pending = self.engine.take_events();
        pending.append(&mut self.events);
        match self.on_event.as_mut() {
            Some(f) => pending.iter().for_each(|e| f(e)),
            None => self.events = pending,
        }
    }
}

impl<R: FrameRenderer> Drop for Visualization<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}
