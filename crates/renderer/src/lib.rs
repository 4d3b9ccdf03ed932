//! Renderer crate for doppelshade.
//!
//! Binds procedural effects to drawing surfaces and keeps them animating
//! until the host tears everything down. The overall flow is:
//!
//! ```text
//!   SurfaceProvider ──▶ LifecycleManager::create_instance ──▶ InstanceDirectory
//!                                  │                                 │
//!                                  ▼                                 ▼
//!                        GraphicsBackend::create_context     FrameScheduler
//!                                  │                                 │
//!                                  └──────▶ frame(id) ◀──────────────┘
//!                                              │
//!                                              └─▶ GraphicsContext::render
//! ```
//!
//! Two backends ship with the crate: [`GpuBackend`] drives winit windows
//! through `wgpu`, and [`SoftwareBackend`] evaluates effects on the CPU into
//! RGBA images for headless rendering and tests.

mod animation;
mod backend;
mod compile;
mod directory;
mod error;
mod gpu;
mod instance;
mod manager;
mod observer;
mod resize;
mod runtime;
mod software;
mod surface;
mod types;
mod window;

pub use animation::{FrameOutcome, SkipReason};
pub use backend::{GraphicsBackend, GraphicsContext};
pub use compile::ShaderProgram;
pub use error::{BackendError, LifecycleError};
pub use gpu::{GpuBackend, GpuBundle, GpuContext};
pub use instance::RenderingInstance;
pub use manager::{Attachment, LifecycleManager};
pub use observer::{LifecycleEvent, LifecycleObserver, TracingObserver};
pub use resize::ResizeOutcome;
pub use runtime::{BoxedClock, Clock, ManualClock, SystemClock};
pub use software::{
    rasterise, OffscreenProvider, OffscreenSurface, SoftwareBackend, SoftwareBundle,
    SoftwareContext,
};
pub use surface::{DrawingSurface, SurfaceProvider};
pub use types::{InstanceId, LogicalSize, PixelSize, SurfaceId, Uniforms};
pub use window::{run_windows, StageWindows, WindowSurface};
