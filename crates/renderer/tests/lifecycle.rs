use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use effects::EffectKind;
use renderer::{
    BackendError, FrameOutcome, GraphicsBackend, GraphicsContext, LifecycleError, LifecycleEvent,
    InstanceId, LifecycleManager, LifecycleObserver, ManualClock, OffscreenProvider,
    OffscreenSurface, PixelSize, ShaderProgram, SoftwareBackend, SurfaceId, Uniforms,
};
use scheduler::{FrameHandle, FrameId, FrameQueue, FrameScheduler};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateContext(SurfaceId),
    SetSize(PixelSize),
    Allocate(EffectKind),
    Render { time: f32, resolution: PixelSize },
    ReleaseBundle,
    Release,
    Request(FrameId),
    Cancel(FrameId),
}

type Log = Rc<RefCell<Vec<Call>>>;

#[derive(Default)]
struct Faults {
    context: bool,
    release: bool,
    max_edge: Option<u32>,
}

struct RecordingBackend {
    log: Log,
    faults: Faults,
    available: Rc<Cell<bool>>,
    programs: Rc<RefCell<Vec<ShaderProgram>>>,
}

struct RecordingContext {
    log: Log,
    fail_release: bool,
    max_edge: Option<u32>,
    available: Rc<Cell<bool>>,
    programs: Rc<RefCell<Vec<ShaderProgram>>>,
}

impl GraphicsBackend for RecordingBackend {
    type Surface = OffscreenSurface;
    type Context = RecordingContext;

    fn create_context(&mut self, surface: &OffscreenSurface) -> Result<RecordingContext, BackendError> {
        use renderer::DrawingSurface;

        self.log
            .borrow_mut()
            .push(Call::CreateContext(surface.id()));
        if self.faults.context {
            return Err(BackendError::ContextUnavailable("no adapter".into()));
        }
        Ok(RecordingContext {
            log: Rc::clone(&self.log),
            fail_release: self.faults.release,
            max_edge: self.faults.max_edge,
            available: Rc::clone(&self.available),
            programs: Rc::clone(&self.programs),
        })
    }
}

impl RecordingBackend {
    fn with_faults(log: &Log, faults: Faults) -> Self {
        Self {
            log: Rc::clone(log),
            faults,
            available: Rc::new(Cell::new(true)),
            programs: Rc::default(),
        }
    }
}

impl GraphicsContext for RecordingContext {
    type Bundle = ();

    fn set_size(&mut self, size: PixelSize) -> PixelSize {
        self.log.borrow_mut().push(Call::SetSize(size));
        match self.max_edge {
            Some(edge) => PixelSize::new(size.width.min(edge), size.height.min(edge)),
            None => size,
        }
    }

    fn allocate(&mut self, program: &ShaderProgram, _uniforms: &Uniforms) -> Result<(), BackendError> {
        self.log.borrow_mut().push(Call::Allocate(program.effect));
        self.programs.borrow_mut().push(program.clone());
        Ok(())
    }

    fn render(&mut self, _bundle: &mut (), uniforms: &Uniforms) -> Result<(), BackendError> {
        self.log.borrow_mut().push(Call::Render {
            time: uniforms.time,
            resolution: uniforms.resolution,
        });
        Ok(())
    }

    fn release_bundle(&mut self, _bundle: ()) -> Result<(), BackendError> {
        self.log.borrow_mut().push(Call::ReleaseBundle);
        Ok(())
    }

    fn release(self) -> Result<(), BackendError> {
        self.log.borrow_mut().push(Call::Release);
        if self.fail_release {
            return Err(BackendError::Lost);
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.get()
    }
}

struct FailingAllocBackend(RecordingBackend);

impl GraphicsBackend for FailingAllocBackend {
    type Surface = OffscreenSurface;
    type Context = FailingAllocContext;

    fn create_context(&mut self, surface: &OffscreenSurface) -> Result<FailingAllocContext, BackendError> {
        self.0.create_context(surface).map(FailingAllocContext)
    }
}

struct FailingAllocContext(RecordingContext);

impl GraphicsContext for FailingAllocContext {
    type Bundle = ();

    fn set_size(&mut self, size: PixelSize) -> PixelSize {
        self.0.set_size(size)
    }

    fn allocate(&mut self, program: &ShaderProgram, _uniforms: &Uniforms) -> Result<(), BackendError> {
        self.0.log.borrow_mut().push(Call::Allocate(program.effect));
        Err(BackendError::Allocation("shader rejected".into()))
    }

    fn render(&mut self, bundle: &mut (), uniforms: &Uniforms) -> Result<(), BackendError> {
        self.0.render(bundle, uniforms)
    }

    fn release_bundle(&mut self, bundle: ()) -> Result<(), BackendError> {
        self.0.release_bundle(bundle)
    }

    fn release(self) -> Result<(), BackendError> {
        self.0.release()
    }
}

struct RecordingScheduler {
    log: Log,
    queue: FrameQueue<InstanceId>,
}

impl RecordingScheduler {
    fn new(log: &Log) -> Self {
        Self {
            log: Rc::clone(log),
            queue: FrameQueue::new(),
        }
    }

    fn take_due(&mut self) -> Vec<FrameId> {
        self.queue.take_due().into_iter().map(|due| due.id).collect()
    }
}

impl FrameScheduler<InstanceId> for RecordingScheduler {
    fn request_frame(&mut self, key: &InstanceId) -> FrameHandle {
        let handle = self.queue.request_frame(key);
        self.log.borrow_mut().push(Call::Request(handle.id()));
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.log.borrow_mut().push(Call::Cancel(handle.id()));
        self.queue.cancel_frame(handle);
    }
}

#[derive(Default, Clone)]
struct EventLog(Rc<RefCell<Vec<String>>>);

impl LifecycleObserver for EventLog {
    fn on_event(&mut self, event: &LifecycleEvent<'_>) {
        let entry = match event {
            LifecycleEvent::Created { id, .. } => format!("created {id}"),
            LifecycleEvent::EffectFallback { requested, bound, .. } => {
                format!("fallback {requested} -> {bound}")
            }
            LifecycleEvent::Resized { from, to, .. } => format!("resized {from} -> {to}"),
            LifecycleEvent::FrameSkipped { reason, .. } => format!("skipped {reason}"),
            LifecycleEvent::ReleaseFailed { id, .. } => format!("release failed {id}"),
            LifecycleEvent::TornDown { instances } => format!("torn down {instances}"),
        };
        self.0.borrow_mut().push(entry);
    }
}

struct Harness {
    log: Log,
    clock: ManualClock,
    events: EventLog,
    manager: LifecycleManager<RecordingBackend, RecordingScheduler>,
}

impl Harness {
    fn new() -> Self {
        Self::with_faults(Faults::default())
    }

    fn with_faults(faults: Faults) -> Self {
        let log = Log::default();
        let clock = ManualClock::new();
        let events = EventLog::default();
        let manager = LifecycleManager::with_observer(
            RecordingBackend::with_faults(&log, faults),
            RecordingScheduler::new(&log),
            clock.clone(),
            events.clone(),
        );
        Self {
            log,
            clock,
            events,
            manager,
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// Delivers every due frame once.
    fn tick(&mut self) -> Vec<FrameOutcome> {
        let due = self.manager.scheduler_mut().take_due();
        due.into_iter().map(|id| self.manager.frame(id)).collect()
    }

    fn render_times(&self) -> Vec<f32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Render { time, .. } => Some(time),
                _ => None,
            })
            .collect()
    }
}

fn surface(id: &str) -> OffscreenSurface {
    OffscreenSurface::new(id, 800.0, 600.0)
}

#[test]
fn create_draw_and_destroy_end_to_end() {
    let mut harness = Harness::new();
    harness.clock.set_secs(10.0);

    let id = harness
        .manager
        .create_instance(surface("hero").with_device_pixel_ratio(2.0), "liquid-metal")
        .unwrap();
    assert_eq!(id.to_string(), "hero-liquid-metal");

    let instance = harness.manager.instance(&id).unwrap();
    assert_eq!(instance.uniforms().resolution, PixelSize::new(1600, 1200));
    assert!(instance.is_animating());

    for at in [10.0, 10.016, 10.033] {
        harness.clock.set_secs(at);
        let outcomes = harness.tick();
        assert!(matches!(outcomes[..], [FrameOutcome::Drawn { .. }]));
    }

    let times = harness.render_times();
    assert_eq!(times.len(), 3);
    for (actual, expected) in times.iter().zip([0.0_f32, 0.016, 0.033]) {
        assert!((actual - expected).abs() < 1e-3, "{actual} vs {expected}");
    }
    assert_eq!(harness.manager.instance(&id).unwrap().frames_drawn(), 3);

    harness.manager.destroy_all();
    assert!(harness.manager.is_empty());
    assert!(harness.manager.scheduler().queue.is_empty());
}

#[test]
fn create_acquires_resources_in_order() {
    let mut harness = Harness::new();
    harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();

    let calls = harness.calls();
    assert_eq!(calls[0], Call::CreateContext(SurfaceId::new("a")));
    assert_eq!(calls[1], Call::SetSize(PixelSize::new(800, 600)));
    assert_eq!(calls[2], Call::Allocate(EffectKind::PulseGrid));
    assert!(matches!(calls[3], Call::Request(_)));
    assert_eq!(calls.len(), 4);
}

#[test]
fn duplicate_is_rejected_without_touching_the_backend() {
    let mut harness = Harness::new();
    harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();
    harness.clear();

    let err = harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap_err();
    assert!(matches!(err, LifecycleError::DuplicateInstance(_)));
    assert!(harness.calls().is_empty());
    assert_eq!(harness.manager.len(), 1);

    // Same surface, different effect is a distinct instance.
    harness
        .manager
        .create_instance(surface("a"), "neon-genesis")
        .unwrap();
    assert_eq!(harness.manager.len(), 2);
}

#[test]
fn duplicate_check_ignores_surrounding_whitespace() {
    let mut harness = Harness::new();
    let id = harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();
    harness.clear();

    let err = harness
        .manager
        .create_instance(surface("a"), " pulse-grid\t")
        .unwrap_err();
    assert!(matches!(err, LifecycleError::DuplicateInstance(ref dup) if *dup == id));
    assert!(harness.calls().is_empty());
    assert_eq!(harness.manager.len(), 1);
}

#[test]
fn time_written_is_strictly_increasing() {
    let mut harness = Harness::new();
    harness.clock.set_secs(1.0);
    let id = harness
        .manager
        .create_instance(surface("a"), "chrome-weaver")
        .unwrap();

    harness.clock.set_secs(1.5);
    assert!(matches!(harness.tick()[..], [FrameOutcome::Drawn { .. }]));

    // Clock did not move: nothing written, loop still alive.
    let outcomes = harness.tick();
    assert!(matches!(outcomes[..], [FrameOutcome::Stalled { .. }]));
    assert!(harness.manager.instance(&id).unwrap().is_animating());

    harness.clock.set_secs(2.0);
    assert!(matches!(harness.tick()[..], [FrameOutcome::Drawn { .. }]));

    let times = harness.render_times();
    assert_eq!(times.len(), 2);
    assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
    assert!((harness.manager.instance(&id).unwrap().uniforms().time - 1.0).abs() < 1e-6);
}

#[test]
fn frames_keep_drawing_after_days_of_uptime() {
    let mut harness = Harness::new();
    harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();

    // Past 2^18 seconds an f32 step is longer than one 60 Hz frame.
    let uptime = Duration::from_secs(4 * 24 * 60 * 60);
    for frame in 1..=12 {
        harness
            .clock
            .set(uptime + Duration::from_millis(16 * frame));
        let outcomes = harness.tick();
        assert!(
            matches!(outcomes[..], [FrameOutcome::Drawn { .. }]),
            "frame {frame}: {outcomes:?}"
        );
    }
    assert_eq!(harness.render_times().len(), 12);
}

#[test]
fn unavailable_context_skips_draw_but_advances_time() {
    let mut harness = Harness::new();
    let available = Rc::clone(&harness.manager.backend().available);
    let id = harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();

    available.set(false);
    harness.clock.set_secs(0.25);
    let outcomes = harness.tick();
    assert!(matches!(
        outcomes[..],
        [FrameOutcome::Skipped { time, .. }] if (time - 0.25).abs() < 1e-6
    ));
    assert!(harness.render_times().is_empty());

    let instance = harness.manager.instance(&id).unwrap();
    assert!((instance.uniforms().time - 0.25).abs() < 1e-6);
    assert!(instance.is_animating());
    assert!(harness.events.0.borrow().iter().any(|event| event.starts_with("skipped")));
}

#[test]
fn resize_is_idempotent() {
    let mut harness = Harness::new();
    let id = harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();
    harness.clear();

    assert_eq!(harness.manager.resize_all(), 0);
    assert!(harness.calls().is_empty());

    harness
        .manager
        .surface_mut(&id)
        .unwrap()
        .set_layout_size(1024.0, 768.0);
    assert_eq!(harness.manager.resize_all(), 1);
    assert_eq!(harness.calls(), vec![Call::SetSize(PixelSize::new(1024, 768))]);

    assert_eq!(harness.manager.resize_all(), 0);
    assert_eq!(harness.calls().len(), 1);

    let instance = harness.manager.instance(&id).unwrap();
    assert_eq!(instance.uniforms().resolution, PixelSize::new(1024, 768));
    assert!(harness
        .events
        .0
        .borrow()
        .contains(&"resized 800x600 -> 1024x768".to_string()));
}

#[test]
fn resolution_follows_the_size_the_context_applied() {
    use renderer::DrawingSurface;

    let mut harness = Harness::with_faults(Faults {
        max_edge: Some(1000),
        ..Faults::default()
    });
    let id = harness
        .manager
        .create_instance(surface("a").with_device_pixel_ratio(2.0), "pulse-grid")
        .unwrap();

    let clamped = PixelSize::new(1000, 1000);
    let instance = harness.manager.instance(&id).unwrap();
    assert_eq!(instance.uniforms().resolution, clamped);
    assert_eq!(instance.surface().backing_size(), clamped);

    harness
        .manager
        .surface_mut(&id)
        .unwrap()
        .set_layout_size(900.0, 300.0);
    assert_eq!(harness.manager.resize_all(), 1);
    let instance = harness.manager.instance(&id).unwrap();
    assert_eq!(instance.uniforms().resolution, PixelSize::new(1000, 600));
    assert_eq!(instance.surface().backing_size(), PixelSize::new(1000, 600));

    // The layout still asks for more than the limit; nothing to redo.
    harness.clear();
    assert_eq!(harness.manager.resize_all(), 0);
    assert!(harness.calls().is_empty());

    harness.clock.set_secs(0.1);
    harness.tick();
    let drawn = harness
        .calls()
        .into_iter()
        .find(|call| matches!(call, Call::Render { .. }));
    assert_eq!(
        drawn,
        Some(Call::Render {
            time: 0.1,
            resolution: PixelSize::new(1000, 600),
        })
    );
}

#[test]
fn resized_instances_draw_at_new_resolution() {
    let mut harness = Harness::new();
    let id = harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();
    harness
        .manager
        .surface_mut(&id)
        .unwrap()
        .set_device_pixel_ratio(1.5);
    harness.manager.resize_all();

    harness.clock.set_secs(0.1);
    harness.tick();
    let last = harness
        .calls()
        .into_iter()
        .rev()
        .find(|call| matches!(call, Call::Render { .. }));
    assert_eq!(
        last,
        Some(Call::Render {
            time: 0.1,
            resolution: PixelSize::new(1200, 900),
        })
    );
}

#[test]
fn teardown_cancels_before_releasing() {
    let mut harness = Harness::new();
    harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();
    harness
        .manager
        .create_instance(surface("b"), "neon-genesis")
        .unwrap();
    harness.clear();

    harness.manager.destroy_all();
    let calls = harness.calls();
    let last_cancel = calls
        .iter()
        .rposition(|call| matches!(call, Call::Cancel(_)))
        .unwrap();
    let first_release = calls
        .iter()
        .position(|call| matches!(call, Call::ReleaseBundle | Call::Release))
        .unwrap();
    assert!(last_cancel < first_release);
    assert_eq!(
        calls.iter().filter(|call| matches!(call, Call::Cancel(_))).count(),
        2
    );
    assert_eq!(
        calls.iter().filter(|call| **call == Call::Release).count(),
        2
    );
    assert!(!calls.iter().any(|call| matches!(call, Call::Request(_))));

    harness.clear();
    harness.manager.destroy_all();
    assert!(harness.calls().is_empty());
    assert_eq!(
        harness
            .events
            .0
            .borrow()
            .iter()
            .filter(|event| event.starts_with("torn down"))
            .count(),
        1
    );
}

#[test]
fn release_failures_do_not_stop_teardown() {
    let mut harness = Harness::with_faults(Faults {
        release: true,
        ..Faults::default()
    });
    harness.manager.create_instance(surface("a"), "a").unwrap();
    harness.manager.create_instance(surface("b"), "b").unwrap();

    harness.manager.destroy_all();
    assert!(harness.manager.is_empty());
    let events = harness.events.0.borrow();
    assert_eq!(
        events
            .iter()
            .filter(|event| event.starts_with("release failed"))
            .count(),
        2
    );
    assert_eq!(events.last().map(String::as_str), Some("torn down 2"));
}

#[test]
fn cancelled_frames_are_ignored() {
    let mut harness = Harness::new();
    let id = harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();
    let stale = harness.manager.instance(&id).unwrap().animation_id().unwrap();

    harness.manager.destroy_all();
    harness.clear();

    assert!(matches!(harness.manager.frame(stale), FrameOutcome::Ignored));
    assert!(harness.calls().is_empty());
}

#[test]
fn spent_frames_are_ignored() {
    let mut harness = Harness::new();
    let id = harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();
    let first = harness.manager.instance(&id).unwrap().animation_id().unwrap();

    harness.clock.set_secs(0.1);
    assert!(matches!(harness.manager.frame(first), FrameOutcome::Drawn { .. }));
    harness.clock.set_secs(0.2);
    assert!(matches!(harness.manager.frame(first), FrameOutcome::Ignored));
    assert_eq!(harness.render_times().len(), 1);
}

#[test]
fn unknown_effect_binds_liquid_metal() {
    let mut harness = Harness::new();
    let id = harness
        .manager
        .create_instance(surface("a"), "sparkles")
        .unwrap();

    assert_eq!(id.effect(), "sparkles");
    let instance = harness.manager.instance(&id).unwrap();
    assert!(instance.effect().is_fallback());
    assert_eq!(instance.effect().kind(), EffectKind::LiquidMetal);

    let programs = harness.manager.backend().programs.borrow();
    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0], ShaderProgram::for_effect(EffectKind::LiquidMetal));
    assert!(programs[0]
        .fragment
        .contains(EffectKind::LiquidMetal.fragment_source()));
    assert!(harness
        .events
        .0
        .borrow()
        .contains(&"fallback sparkles -> liquid-metal".to_string()));
}

#[test]
fn detached_surface_is_unavailable() {
    let mut harness = Harness::new();
    let err = harness
        .manager
        .create_instance(surface("a").detached(), "pulse-grid")
        .unwrap_err();
    assert!(matches!(err, LifecycleError::SurfaceUnavailable { .. }));
    assert!(harness.calls().is_empty());
    assert!(harness.manager.is_empty());
}

#[test]
fn context_failure_is_surface_unavailable() {
    let mut harness = Harness::with_faults(Faults {
        context: true,
        ..Faults::default()
    });
    let err = harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap_err();
    assert!(matches!(err, LifecycleError::SurfaceUnavailable { .. }));
    assert_eq!(harness.calls(), vec![Call::CreateContext(SurfaceId::new("a"))]);
    assert!(harness.manager.is_empty());
}

#[test]
fn allocation_failure_releases_the_context() {
    let log = Log::default();
    let mut manager = LifecycleManager::new(
        FailingAllocBackend(RecordingBackend::with_faults(&log, Faults::default())),
        RecordingScheduler::new(&log),
        ManualClock::new(),
    );
    let err = manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap_err();
    assert!(matches!(err, LifecycleError::SurfaceUnavailable { .. }));
    assert!(manager.is_empty());

    let calls = log.borrow().clone();
    assert_eq!(calls.last(), Some(&Call::Release));
    assert!(!calls.iter().any(|call| matches!(call, Call::Request(_))));
}

#[test]
fn attach_discovered_continues_past_failures() {
    let mut harness = Harness::new();
    let mut provider = OffscreenProvider::new(vec![
        surface("left").with_effect("neon-genesis"),
        surface("gone").with_effect("pulse-grid").detached(),
        surface("right"),
    ]);

    let attachments = harness.manager.attach_discovered(&mut provider);
    assert_eq!(attachments.len(), 3);
    assert!(attachments[0].1.is_ok());
    assert!(matches!(
        attachments[1].1,
        Err(LifecycleError::SurfaceUnavailable { .. })
    ));
    let right = attachments[2].1.as_ref().unwrap();
    assert_eq!(
        harness.manager.instance(right).unwrap().effect().kind(),
        EffectKind::LiquidMetal
    );
    assert_eq!(harness.manager.len(), 2);
}

#[test]
fn dropping_the_manager_tears_down() {
    let harness = Harness::new();
    let Harness {
        log, mut manager, ..
    } = harness;
    manager.create_instance(surface("a"), "pulse-grid").unwrap();
    log.borrow_mut().clear();

    drop(manager);
    let calls = log.borrow().clone();
    assert!(matches!(calls.first(), Some(Call::Cancel(_))));
    assert_eq!(calls.last(), Some(&Call::Release));
}

#[test]
fn elapsed_time_is_relative_to_creation() {
    let mut harness = Harness::new();
    harness.clock.set(Duration::from_secs(100));
    let id = harness
        .manager
        .create_instance(surface("a"), "pulse-grid")
        .unwrap();
    assert_eq!(
        harness.manager.instance(&id).unwrap().created_at(),
        Duration::from_secs(100)
    );

    harness.clock.advance(Duration::from_millis(500));
    harness.tick();
    assert_eq!(harness.render_times(), vec![0.5]);
}

#[test]
fn software_teardown_drops_published_frames() {
    let backend = SoftwareBackend::new();
    let clock = ManualClock::new();
    let mut manager = LifecycleManager::new(
        backend.clone(),
        FrameQueue::<InstanceId>::new(),
        clock.clone(),
    );
    manager
        .create_instance(OffscreenSurface::new("s", 4.0, 4.0), "pulse-grid")
        .unwrap();

    clock.set_secs(0.5);
    for due in manager.scheduler_mut().take_due() {
        assert!(matches!(manager.frame(due.id), FrameOutcome::Drawn { .. }));
    }
    let surface = SurfaceId::new("s");
    assert_eq!(
        backend.latest_frame(&surface).map(|frame| frame.dimensions()),
        Some((4, 4))
    );

    manager.destroy_all();
    assert!(backend.latest_frame(&surface).is_none());

    // A fresh instance on the same surface has nothing to show until it draws.
    manager
        .create_instance(OffscreenSurface::new("s", 4.0, 4.0), "pulse-grid")
        .unwrap();
    assert!(backend.latest_frame(&surface).is_none());
}
