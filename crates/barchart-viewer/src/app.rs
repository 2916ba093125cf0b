use crate::{
    camera::{Camera, CameraController},
    config::Config,
    data::types::BarsGpu,
    renderer::{Renderer, SceneFrame},
    ui,
    xr::{SimulatedXr, SIMULATED_RETICLE_SCALE},
};
use anyhow::{Context, Result};
use barchart::{
    context::{ChartEvent, EventQueue},
    load_csv,
    picking::{pointer_to_ndc, ray_from_ndc, Ray},
    run_frame, ChartContext, XrHost,
};
use glam::{Mat4, Vec2, Vec3};
use std::sync::Arc;
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

pub struct App {
    pub renderer: Renderer,
    pub camera: Camera,
    pub camera_controller: CameraController,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub chart: ChartContext,
    pub events: EventQueue,
    pub xr: SimulatedXr,
    config: Config,
    bars: BarsGpu,
    /// Last cursor position, physical pixels.
    cursor: Option<Vec2>,
}

impl App {
    pub async fn new(window: Arc<Window>, config: Config) -> Result<Self> {
        let renderer = Renderer::new(window.clone()).await?;
        let size = renderer.gfx.size;

        let camera = Camera::chart_default(size.width as f32 / size.height.max(1) as f32);
        let mut camera_controller = CameraController::new();
        camera_controller.save_state(&camera);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        let xr = SimulatedXr::new(!config.no_xr);
        if !xr.is_supported() {
            log::warn!("XR disabled; running the desktop view only");
        }

        let bars = BarsGpu::new(&renderer.gfx.device, 64);
        let chart = ChartContext::new(config.layout_params(), config.ar_scale);

        Ok(Self {
            renderer,
            camera,
            camera_controller,
            egui_ctx,
            egui_state,
            chart,
            events: EventQueue::new(),
            xr,
            config,
            bars,
            cursor: None,
        })
    }

    /// Read the CSV and queue a rebuild of the chart.
    pub fn load(&mut self) -> Result<()> {
        let dataset = load_csv(&self.config.csv, self.config.cell_policy())
            .with_context(|| format!("loading {}", self.config.csv.display()))?;
        self.events.push(ChartEvent::DataLoaded(dataset));
        Ok(())
    }

    /// Like [`Self::load`], but a failure keeps the current chart.
    pub fn reload(&mut self) {
        if let Err(err) = self.load() {
            log::error!("Reload failed, keeping the current chart: {:#}", err);
        }
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.camera.set_aspect(new_size.width, new_size.height);
        }
    }

    /// Returns `true` when the event was consumed (by egui).
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        self.camera_controller
            .handle_event(event, &mut self.camera, self.renderer.gfx.size.height);

        match event {
            WindowEvent::Resized(physical_size) => self.resize(*physical_size),
            WindowEvent::CursorMoved { position, .. } => {
                let cursor = Vec2::new(position.x as f32, position.y as f32);
                self.cursor = Some(cursor);
                let ray = self.pointer_ray(cursor);
                self.xr.set_pointer_ray(Some(ray));
                self.events.push(ChartEvent::PointerMoved {
                    ray,
                    screen: cursor / window.scale_factor() as f32,
                });
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.xr.set_pointer_ray(None);
                self.events.push(ChartEvent::PointerLeft);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } if self.xr.is_presenting() => {
                self.events.push(ChartEvent::Select);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::KeyA) => self.xr.toggle_session(&mut self.events),
                    PhysicalKey::Code(KeyCode::KeyR) => {
                        self.camera_controller.reset(&mut self.camera)
                    }
                    PhysicalKey::Code(KeyCode::F5) => self.reload(),
                    _ => {}
                }
            }
            _ => {}
        }

        false
    }

    fn pointer_ray(&self, cursor: Vec2) -> Ray {
        let size = self.renderer.gfx.size;
        let ndc = pointer_to_ndc(
            cursor,
            Vec2::ZERO,
            Vec2::new(size.width as f32, size.height as f32),
        );
        ray_from_ndc(ndc, &self.camera.view_proj())
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        // Chart state first: queued events, AR step, then camera.
        run_frame(&mut self.chart, &mut self.xr, &mut self.events);
        self.camera_controller.enabled = self.chart.scene.controls_enabled;
        self.camera_controller.update(&mut self.camera);

        self.bars
            .sync(&self.renderer.gfx.device, &self.renderer.gfx.queue, &self.chart);

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let scene = SceneFrame {
            view_proj: self.camera.view_proj(),
            chart_transform: self.chart.chart_transform(),
            chart_visible: self.chart.placement.visible,
            ground_visible: self.chart.scene.ground_visible,
            reticle: self.chart.reticle.visible.then(|| {
                self.chart.reticle.pose * Mat4::from_scale(Vec3::splat(SIMULATED_RETICLE_SCALE))
            }),
        };
        self.renderer.render(&swap_view, &scene, &self.bars);

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        let source = self.config.csv.display().to_string();
        let actions = ui::draw_panel(
            &self.egui_ctx,
            &source,
            &self.chart.legend,
            self.xr.is_supported(),
            self.xr.is_presenting(),
        );
        if let Some(tooltip) = &self.chart.tooltip {
            ui::draw_tooltip(&self.egui_ctx, tooltip);
        }

        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);

        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        // Overlay actions take effect next frame, like any other input.
        if actions.toggle_ar {
            self.xr.toggle_session(&mut self.events);
        }
        if actions.reload {
            self.reload();
        }

        Ok(())
    }
}
