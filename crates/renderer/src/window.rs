//! Desktop host: one winit window per stage surface, all driven by a single
//! lifecycle manager on the GPU backend.
//!
//! ```text
//!   AboutToWait ──▶ FrameQueue::take_due ──▶ request_redraw (per window)
//!   RedrawRequested ──▶ LifecycleManager::frame
//!   Resized / ScaleFactorChanged ──▶ ResizeDebouncer ──▶ resize_all
//!   CloseRequested / LoopExiting ──▶ destroy_all
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use effects::EffectId;
use scheduler::{FrameId, FrameQueue, ResizeDebouncer};
use stageconfig::StageConfig;
use winit::dpi::LogicalSize as WinitLogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder, WindowId};

use crate::gpu::GpuBackend;
use crate::manager::LifecycleManager;
use crate::runtime::SystemClock;
use crate::surface::{DrawingSurface, SurfaceProvider};
use crate::types::{InstanceId, LogicalSize, PixelSize, SurfaceId};

/// A winit window acting as a drawing surface.
pub struct WindowSurface {
    id: SurfaceId,
    effect: Option<EffectId>,
    window: Arc<Window>,
    ratio_override: Option<f64>,
    backing: PixelSize,
}

impl WindowSurface {
    pub fn new(id: SurfaceId, effect: Option<EffectId>, window: Arc<Window>) -> Self {
        let size = window.inner_size();
        Self {
            id,
            effect,
            window,
            ratio_override: None,
            backing: PixelSize::new(size.width, size.height),
        }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: Option<f64>) -> Self {
        self.ratio_override = ratio;
        self
    }

    pub fn window(&self) -> Arc<Window> {
        Arc::clone(&self.window)
    }
}

impl DrawingSurface for WindowSurface {
    fn id(&self) -> SurfaceId {
        self.id.clone()
    }

    fn requested_effect(&self) -> Option<EffectId> {
        self.effect.clone()
    }

    fn layout_size(&self) -> LogicalSize {
        let logical: WinitLogicalSize<f64> = self
            .window
            .inner_size()
            .to_logical(self.window.scale_factor());
        LogicalSize::new(logical.width, logical.height)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.ratio_override
            .unwrap_or_else(|| self.window.scale_factor())
    }

    fn is_attached(&self) -> bool {
        true
    }

    fn backing_size(&self) -> PixelSize {
        self.backing
    }

    fn set_backing_size(&mut self, size: PixelSize) {
        self.backing = size;
    }
}

/// Opens one window per stage surface and hands them out on discovery.
pub struct StageWindows {
    surfaces: Vec<WindowSurface>,
    windows: HashMap<SurfaceId, Arc<Window>>,
}

impl StageWindows {
    pub fn open(target: &EventLoopWindowTarget<()>, stage: &StageConfig) -> Result<Self> {
        let mut surfaces = Vec::new();
        let mut windows = HashMap::new();
        for resolved in stage.resolved_surfaces() {
            let window = WindowBuilder::new()
                .with_title(resolved.title.as_str())
                .with_inner_size(WinitLogicalSize::new(
                    f64::from(resolved.width),
                    f64::from(resolved.height),
                ))
                .build(target)
                .with_context(|| format!("failed to create window for '{}'", resolved.name))?;
            let window = Arc::new(window);
            let id = SurfaceId::new(resolved.name.clone());
            windows.insert(id.clone(), Arc::clone(&window));
            surfaces.push(
                WindowSurface::new(id, Some(resolved.effect), window)
                    .with_device_pixel_ratio(resolved.device_pixel_ratio),
            );
        }
        Ok(Self { surfaces, windows })
    }

    fn window_for(&self, surface: &SurfaceId) -> Option<Arc<Window>> {
        self.windows.get(surface).cloned()
    }
}

impl SurfaceProvider for StageWindows {
    type Surface = WindowSurface;

    fn discover(&mut self) -> Vec<WindowSurface> {
        std::mem::take(&mut self.surfaces)
    }
}

/// Routes due frames to windows and window events back to instances.
#[derive(Default)]
struct FrameRouter {
    windows: HashMap<InstanceId, Arc<Window>>,
    pending: HashMap<WindowId, FrameId>,
}

impl FrameRouter {
    fn route(&mut self, instance: InstanceId, window: Arc<Window>) {
        self.windows.insert(instance, window);
    }

    fn dispatch(&mut self, queue: &mut FrameQueue<InstanceId>) {
        for due in queue.take_due() {
            match self.windows.get(&due.key) {
                Some(window) => {
                    self.pending.insert(window.id(), due.id);
                    window.request_redraw();
                }
                None => tracing::debug!(instance = %due.key, "dropping frame for unrouted instance"),
            }
        }
    }

    fn take(&mut self, window: WindowId) -> Option<FrameId> {
        self.pending.remove(&window)
    }
}

/// Runs the stage until any window closes. Every instance is torn down before
/// returning.
pub fn run_windows(stage: &StageConfig) -> Result<()> {
    let event_loop: EventLoop<()> = EventLoop::new().context("failed to initialize event loop")?;
    let mut provider = StageWindows::open(&event_loop, stage)?;

    let mut manager =
        LifecycleManager::new(GpuBackend::new(), FrameQueue::<InstanceId>::new(), SystemClock::new());
    let mut router = FrameRouter::default();
    for (surface, result) in manager.attach_discovered(&mut provider) {
        if let (Ok(instance), Some(window)) = (result, provider.window_for(&surface)) {
            router.route(instance, window);
        }
    }
    if manager.is_empty() {
        anyhow::bail!("no surface could be attached to a graphics context");
    }
    tracing::info!(instances = manager.len(), "stage running");

    let mut debouncer = ResizeDebouncer::from_config(stage);
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    manager.destroy_all();
                    elwt.exit();
                }
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    debouncer.notify(Instant::now());
                }
                WindowEvent::RedrawRequested => {
                    if let Some(frame) = router.take(window_id) {
                        manager.frame(frame);
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if debouncer.poll(Instant::now()) {
                    let resized = manager.resize_all();
                    tracing::debug!(resized, "viewport change reconciled");
                }
                router.dispatch(manager.scheduler_mut());
                match debouncer.deadline() {
                    Some(deadline) => elwt.set_control_flow(ControlFlow::WaitUntil(deadline)),
                    None => elwt.set_control_flow(ControlFlow::Wait),
                }
            }
            Event::LoopExiting => manager.destroy_all(),
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}
