use hyperspeed_core::{
    EngineConfig, EngineError, EngineEvent, Frame, FrameRenderer, ListenerGuard, ParamId,
    RenderError, Status, Visualization,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Records submissions and replays scripted failures.
#[derive(Default)]
struct MockRenderer {
    frames: Rc<Cell<u32>>,
    sizes: Rc<RefCell<Vec<(u32, u32)>>>,
    script: VecDeque<RenderError>,
}

impl MockRenderer {
    fn failing_with(errs: impl IntoIterator<Item = RenderError>) -> Self {
        Self {
            script: errs.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl FrameRenderer for MockRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.sizes.borrow_mut().push((width, height));
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if let Some(err) = self.script.pop_front() {
            return Err(err);
        }
        assert!(!frame.instances.is_empty());
        self.frames.set(self.frames.get() + 1);
        Ok(())
    }
}

fn mount(r: MockRenderer) -> Visualization<MockRenderer> {
    Visualization::mount(EngineConfig::default(), Ok(r), 640, 480).expect("mounted")
}

#[test]
fn mount_sizes_the_renderer_and_starts() {
    let r = MockRenderer::default();
    let sizes = r.sizes.clone();
    let frames = r.frames.clone();
    let mut v = mount(r);
    assert_eq!(v.status(), Status::Mounted);
    assert!(v.is_running());
    assert_eq!(sizes.borrow().as_slice(), &[(640, 480)]);
    assert!(v.frame(0.016));
    assert!(v.frame(0.016));
    assert_eq!(frames.get(), 2);
    assert_eq!(v.take_events(), vec![EngineEvent::Started]);
}

#[test]
fn unavailable_renderer_is_reported() {
    let res = Visualization::<MockRenderer>::mount(
        EngineConfig::default(),
        Err(anyhow::anyhow!("no adapter")),
        640,
        480,
    );
    match res {
        Err(EngineError::Unavailable(msg)) => assert!(msg.contains("no adapter")),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("mount should fail"),
    }
}

#[test]
fn hidden_visualization_stops_ticking() {
    let r = MockRenderer::default();
    let frames = r.frames.clone();
    let mut v = mount(r);
    v.frame(0.016);
    assert!(!v.set_visible(false));
    let t = v.engine().time();
    assert!(!v.frame(0.5));
    assert_eq!(v.engine().time(), t);
    v.set_visible(true);
    assert!(v.frame(0.016));
    assert_eq!(frames.get(), 2);
}

#[test]
fn context_loss_pauses_and_reattach_restores() {
    let mut v = mount(MockRenderer::failing_with([RenderError::ContextLost]));
    v.engine().set_target("speed", 2.5);
    assert!(!v.frame(0.016));
    assert_eq!(v.status(), Status::Lost);
    assert!(v.needs_renderer());
    assert!(v.renderer().is_none());
    assert!(!v.frame(0.016));

    // state survives the loss
    assert_eq!(v.engine().store().target(ParamId::Speed), 2.5);

    let fresh = MockRenderer::default();
    let sizes = fresh.sizes.clone();
    assert!(v.reattach(Ok(fresh)).is_ok());
    assert_eq!(v.status(), Status::Mounted);
    assert_eq!(sizes.borrow().as_slice(), &[(640, 480)]);
    assert!(v.frame(0.016));
    let events = v.take_events();
    assert!(events.contains(&EngineEvent::ContextLost));
    assert!(events.contains(&EngineEvent::Resumed));
}

#[test]
fn failed_reacquisition_reports_unavailable() {
    let mut v = mount(MockRenderer::failing_with([RenderError::ContextLost]));
    v.frame(0.016);
    let err = v.reattach(Err(anyhow::anyhow!("device lost for good")));
    assert!(matches!(err, Err(EngineError::Unavailable(_))));
    assert_eq!(v.status(), Status::Failed);
    assert!(!v.frame(0.016));
    let events = v.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::Unavailable(m) if m.contains("for good"))));
}

#[test]
fn outdated_surface_is_resized_and_skipped() {
    let r = MockRenderer::failing_with([RenderError::Outdated]);
    let sizes = r.sizes.clone();
    let mut v = mount(r);
    assert!(!v.frame(0.016));
    assert_eq!(v.status(), Status::Mounted);
    assert_eq!(sizes.borrow().len(), 2);
    assert!(v.frame(0.016));
}

#[test]
fn fatal_render_error_fails_the_visualization() {
    let mut v = mount(MockRenderer::failing_with([RenderError::Fatal("oom".into())]));
    assert!(!v.frame(0.016));
    assert_eq!(v.status(), Status::Failed);
    assert!(!v.needs_renderer());
}

#[test]
fn dispose_releases_every_listener_once() {
    let released = Rc::new(Cell::new(0));
    let mut v = mount(MockRenderer::default());
    for name in ["pointerdown", "pointerup", "keydown", "resize"] {
        let r = released.clone();
        v.add_listener(ListenerGuard::new(name, move || r.set(r.get() + 1)));
    }
    assert_eq!(v.listener_count(), 4);
    v.dispose();
    assert_eq!(released.get(), 4);
    v.dispose();
    assert_eq!(released.get(), 4);
    assert_eq!(v.status(), Status::Disposed);
    assert!(!v.frame(0.016));
    assert!(matches!(
        v.reattach(Ok(MockRenderer::default())),
        Err(EngineError::Disposed)
    ));
}

#[test]
fn dropping_the_visualization_disposes_it() {
    let released = Rc::new(Cell::new(false));
    {
        let mut v = mount(MockRenderer::default());
        let r = released.clone();
        v.add_listener(ListenerGuard::new("touchstart", move || r.set(true)));
    }
    assert!(released.get());
}

#[test]
fn listeners_added_after_dispose_are_released_immediately() {
    let released = Rc::new(Cell::new(false));
    let mut v = mount(MockRenderer::default());
    v.dispose();
    let r = released.clone();
    v.add_listener(ListenerGuard::new("late", move || r.set(true)));
    assert!(released.get());
    assert_eq!(v.listener_count(), 0);
}

#[test]
fn event_callback_receives_events_in_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut v = mount(MockRenderer::default());
    let sink = seen.clone();
    v.on_event(move |e| sink.borrow_mut().push(e.clone()));
    v.set_visible(false);
    v.set_visible(true);
    v.dispose();
    assert_eq!(
        seen.borrow().as_slice(),
        &[
            EngineEvent::Started,
            EngineEvent::Paused,
            EngineEvent::Resumed,
            EngineEvent::Disposed,
        ]
    );
    assert!(v.take_events().is_empty());
}

#[test]
fn resize_reaches_engine_and_renderer() {
    let r = MockRenderer::default();
    let sizes = r.sizes.clone();
    let mut v = mount(r);
    v.resize(1024, 768);
    v.resize(0, 768);
    assert_eq!(v.engine().viewport(), (1024, 768));
    assert_eq!(sizes.borrow().last(), Some(&(1024, 768)));
    assert_eq!(sizes.borrow().len(), 2);
}
