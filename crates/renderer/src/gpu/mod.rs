//! wgpu backend: one device and swapchain per instance.
//!
//! - `context` owns wgpu instance/device/surface wiring and reconfigures the
//!   swapchain when the backing size changes.
//! - `pipeline` compiles the wrapped GLSL program into a render pipeline with
//!   a single uniform bind group.
//! - `uniforms` mirrors the std140 block declared by the program prelude.

mod context;
mod pipeline;
mod uniforms;

use anyhow::anyhow;

use crate::backend::{GraphicsBackend, GraphicsContext};
use crate::compile::ShaderProgram;
use crate::error::BackendError;
use crate::surface::DrawingSurface;
use crate::types::{PixelSize, Uniforms};
use crate::window::WindowSurface;

use context::DeviceContext;
pub use pipeline::GpuBundle;

#[derive(Debug, Default, Clone, Copy)]
pub struct GpuBackend;

impl GpuBackend {
    pub fn new() -> Self {
        Self
    }
}

impl GraphicsBackend for GpuBackend {
    type Surface = WindowSurface;
    type Context = GpuContext;

    fn create_context(&mut self, surface: &WindowSurface) -> Result<GpuContext, BackendError> {
        let device = DeviceContext::new(surface.window(), surface.pixel_size())
            .map_err(|err| BackendError::ContextUnavailable(format!("{err:#}")))?;
        Ok(GpuContext {
            device,
            lost: false,
        })
    }
}

pub struct GpuContext {
    device: DeviceContext,
    lost: bool,
}

impl GraphicsContext for GpuContext {
    type Bundle = GpuBundle;

    fn set_size(&mut self, size: PixelSize) -> PixelSize {
        self.device.resize(size)
    }

    fn allocate(
        &mut self,
        program: &ShaderProgram,
        uniforms: &Uniforms,
    ) -> Result<GpuBundle, BackendError> {
        let device = &self.device.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let bundle = GpuBundle::new(device, self.device.surface_format, program, uniforms);
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(BackendError::Allocation(format!(
                "{}: {err}",
                program.label
            )));
        }
        tracing::debug!(effect = %program.effect, "compiled effect pipeline");
        Ok(bundle)
    }

    fn render(&mut self, bundle: &mut GpuBundle, uniforms: &Uniforms) -> Result<(), BackendError> {
        let frame = match self.device.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.device.reconfigure();
                return Err(BackendError::Lost);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.lost = true;
                return Err(BackendError::ContextUnavailable(
                    "surface out of memory".into(),
                ));
            }
            Err(other) => return Err(BackendError::Gpu(anyhow!("surface error: {other}"))),
        };

        bundle.write_uniforms(&self.device.queue, uniforms);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("effect encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("effect pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&bundle.pipeline);
            render_pass.set_bind_group(0, &bundle.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        self.device.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release_bundle(&mut self, bundle: GpuBundle) -> Result<(), BackendError> {
        bundle.uniform_buffer.destroy();
        Ok(())
    }

    fn release(self) -> Result<(), BackendError> {
        self.device.device.destroy();
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.lost
    }
}
