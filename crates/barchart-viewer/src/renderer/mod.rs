//! The main rendering orchestrator. Owns the GPU context, the depth target
//! and the pipelines for bars, ground and reticle.

pub mod context;
pub mod meshes;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{
        bars::BarPipeline,
        flat::{FlatMesh, FlatPipeline},
    },
    targets::Targets,
};
use crate::data::types::{BarsGpu, SceneUniformStd140};
use glam::Mat4;
use std::sync::Arc;
use winit::window::Window;

/// Scene background, `#f7f7fb`.
pub const BACKGROUND_SRGB: [f32; 3] = [0xf7 as f32 / 255.0, 0xf7 as f32 / 255.0, 0xfb as f32 / 255.0];
/// Ground plane colour, `#ececec`.
pub const GROUND_SRGB: [f32; 3] = [0xec as f32 / 255.0; 3];
/// Reticle colour, `#00ffcc`.
pub const RETICLE_SRGB: [f32; 3] = [0.0, 1.0, 0xcc as f32 / 255.0];
/// Side length of the square ground plane.
pub const GROUND_EXTENT: f32 = 300.0;

/// What to draw this frame.
pub struct SceneFrame {
    pub view_proj: Mat4,
    pub chart_transform: Mat4,
    pub chart_visible: bool,
    pub ground_visible: bool,
    /// Reticle model matrix, when shown.
    pub reticle: Option<Mat4>,
}

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub bars: BarPipeline,
    pub flat: FlatPipeline,
    pub ground: FlatMesh,
    pub reticle: FlatMesh,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let size = gfx.size;
        let color_fmt = gfx.config.format;

        let targets = Targets::new(&gfx.device, size);
        let bars = BarPipeline::new(&gfx.device, color_fmt, targets.depth_fmt);
        let flat = FlatPipeline::new(&gfx.device, color_fmt, targets.depth_fmt);

        let ground = flat.create_mesh(
            &gfx.device,
            "Ground Plane",
            &meshes::ground_plane(GROUND_EXTENT),
            GROUND_SRGB,
            true,
        );
        let reticle = flat.create_mesh(
            &gfx.device,
            "AR Reticle",
            &meshes::ring(0.12, 0.15, 32),
            RETICLE_SRGB,
            false,
        );

        if !gfx.surface_is_srgb() {
            log::warn!("Surface format {:?} is not sRGB; colours will look dark", color_fmt);
        }

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, color_fmt, None, 1);

        Ok(Self {
            gfx,
            targets,
            bars,
            flat,
            ground,
            reticle,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
        }
    }

    pub fn render(&mut self, swap_view: &wgpu::TextureView, scene: &SceneFrame, bars: &BarsGpu) {
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let clear = srgb_to_linear(BACKGROUND_SRGB);
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear[0] as f64,
                            g: clear[1] as f64,
                            b: clear[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if scene.ground_visible {
                self.flat.draw(
                    &mut pass,
                    &self.gfx.queue,
                    &self.ground,
                    scene.view_proj,
                    Mat4::IDENTITY,
                );
            }

            if scene.chart_visible {
                let uniform = SceneUniformStd140 {
                    view_proj: scene.view_proj.to_cols_array_2d(),
                    model: scene.chart_transform.to_cols_array_2d(),
                };
                self.bars.draw(&mut pass, &self.gfx.queue, &uniform, bars);
            }

            if let Some(model) = scene.reticle {
                self.flat.draw(
                    &mut pass,
                    &self.gfx.queue,
                    &self.reticle,
                    scene.view_proj,
                    model,
                );
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}

/// sRGB → linear, per component.
pub fn srgb_to_linear(c: [f32; 3]) -> [f32; 3] {
    c.map(|v| {
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    })
}
