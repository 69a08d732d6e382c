use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use orrery_kernel::Session;
use orrery_render::{SceneGraph, SceneRenderer, Stage};
use orrery_render_wgpu::{OrbitCamera, WgpuRenderer};
use orrery_scene::{ParamTarget, SceneDescription, Viewport, presets};
use orrery_tools::{Binding, BindingId, DebugPanel, SessionInspector};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "orrery-desktop", about = "Orrery desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Built-in preset to open
    #[arg(short, long, default_value = "solar-system", conflicts_with = "scene")]
    preset: String,

    /// Scene description file (.yaml, .yml or .json)
    #[arg(short, long)]
    scene: Option<PathBuf>,
}

/// Application state.
struct AppState {
    scene_name: String,
    session: Session<SceneGraph>,
    panel: DebugPanel,
    orbit: OrbitCamera,
    show_panel: bool,
    paused: bool,
    dragging: bool,
}

impl AppState {
    fn new(scene: &SceneDescription) -> Result<Self> {
        let session = Stage::build(scene, SceneGraph::default())?;
        let mut panel = DebugPanel::from_specs(&scene.bindings);
        panel.retain_resolvable(session.sink());
        let orbit = OrbitCamera::from_camera(session.sink().camera(), &scene.controls);
        Ok(Self {
            scene_name: scene.name.clone(),
            session,
            panel,
            orbit,
            show_panel: true,
            paused: false,
            dragging: false,
        })
    }

    /// One animation frame: tick the kernel once, then move the camera.
    fn update(&mut self) {
        if !self.paused {
            self.session.tick();
        }
        self.orbit.update();
        self.orbit.apply_to(self.session.sink_mut().camera_mut());
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Space => {
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, "toggled animation");
            }
            KeyCode::Period if self.paused => self.session.tick(),
            KeyCode::F1 => self.show_panel = !self.show_panel,
            _ => {}
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.session.sink_mut().resize(viewport);
    }

    fn set_binding(&mut self, id: BindingId, value: f32) {
        match self.panel.set(id, value, self.session.sink_mut()) {
            Ok(_) => {
                let camera_moved = self
                    .panel
                    .get(id)
                    .is_ok_and(|b| matches!(b.target, ParamTarget::CameraPosition { .. }));
                if camera_moved {
                    self.orbit.reset_from(self.session.sink().camera());
                }
            }
            Err(e) => tracing::warn!("panel write failed: {e}"),
        }
    }

    fn draw_binding(&mut self, ui: &mut egui::Ui, id: BindingId, binding: &Binding) {
        let Ok(current) = self.panel.value(id, self.session.sink()) else {
            return;
        };
        let mut value = current;
        let step = binding.step.unwrap_or(0.01);
        match (binding.min, binding.max) {
            (Some(min), Some(max)) => {
                ui.add(
                    egui::Slider::new(&mut value, min..=max)
                        .step_by(step as f64)
                        .text(&binding.label),
                );
            }
            _ => {
                ui.horizontal(|ui| {
                    ui.add(egui::DragValue::new(&mut value).speed(step));
                    ui.label(&binding.label);
                });
            }
        }
        if value != current {
            self.set_binding(id, value);
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = SessionInspector::summary(&self.session);

        egui::SidePanel::left("panel")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading(&self.scene_name);
                ui.separator();
                ui.label(summary.to_string());
                let eye = self.session.sink().camera().position;
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
                ui.horizontal(|ui| {
                    ui.checkbox(&mut self.paused, "Paused (Space)");
                    if ui
                        .add_enabled(self.paused, egui::Button::new("Step (.)"))
                        .clicked()
                    {
                        self.session.tick();
                    }
                });

                if !self.panel.is_empty() {
                    ui.separator();
                    ui.heading("Controls");
                    let bindings: Vec<(BindingId, Binding)> = self
                        .panel
                        .bindings()
                        .map(|(id, b)| (id, b.clone()))
                        .collect();
                    for (id, binding) in &bindings {
                        self.draw_binding(ui, *id, binding);
                    }
                }

                if summary.body_count > 0 {
                    ui.separator();
                    ui.heading("Bodies");
                    for info in SessionInspector::bodies(&self.session) {
                        ui.monospace(info.to_string());
                    }
                }

                ui.separator();
                ui.small("F1: Toggle Panel | LMB: Orbit | Wheel: Zoom");
            });
    }
}

/// Window, surface and GPU objects, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext, title: &str) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("orrery_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let extents = FrameExtents::new(window.inner_size(), &viewport_for(&window));
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: extents.surface.0,
            height: extents.surface.1,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (scene_width, scene_height) = extents.scene;
        let renderer = WgpuRenderer::new(&device, surface_format, scene_width, scene_height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    /// Reconfigure the surface at the window size and the scene target at the
    /// capped pixel ratio.
    fn resize(&mut self, viewport: &Viewport) {
        let extents = FrameExtents::new(self.window.inner_size(), viewport);
        (self.config.width, self.config.height) = extents.surface;
        self.surface.configure(&self.device, &self.config);
        let (width, height) = extents.scene;
        self.renderer.resize(&self.device, width, height);
        tracing::debug!(?extents, "resized");
    }
}

/// Pixel sizes for one window configuration.
///
/// The surface always matches the window so egui's pixels-per-point lines up
/// with the swapchain. Only the scene target follows the capped pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameExtents {
    surface: (u32, u32),
    scene: (u32, u32),
}

impl FrameExtents {
    fn new(window: PhysicalSize<u32>, viewport: &Viewport) -> Self {
        let surface = (window.width.max(1), window.height.max(1));
        let (width, height) = viewport.physical_size();
        Self {
            surface,
            scene: (width.clamp(1, surface.0), height.clamp(1, surface.1)),
        }
    }
}

/// Logical window size plus the monitor's scale factor.
fn viewport_for(window: &Window) -> Viewport {
    let scale = window.scale_factor();
    let logical = window.inner_size().to_logical::<f64>(scale);
    Viewport {
        width: logical.width.round() as u32,
        height: logical.height.round() as u32,
        device_pixel_ratio: scale as f32,
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, self.state.session.sink());
        self.state.session.sink_mut().render_frame();

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let title = format!("Orrery - {}", self.state.scene_name);
        match Gpu::new(event_loop, &self.egui_ctx, &title) {
            Ok(gpu) => {
                self.state.resize(viewport_for(&gpu.window));
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise GPU: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(gpu) = &mut self.gpu {
                    let viewport = viewport_for(&gpu.window);
                    gpu.resize(&viewport);
                    self.state.resize(viewport);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.dragging = btn_state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.state.orbit.zoom(lines);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.dragging {
                self.state.orbit.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let scene = match &cli.scene {
        Some(path) => SceneDescription::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => presets::load(&cli.preset)?,
    };
    tracing::info!(scene = %scene.name, "orrery-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(&scene)?);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: u32, height: u32, device_pixel_ratio: f32) -> Viewport {
        Viewport {
            width,
            height,
            device_pixel_ratio,
        }
    }

    #[test]
    fn surface_keeps_window_size_above_the_cap() {
        let extents = FrameExtents::new(PhysicalSize::new(3840, 2160), &viewport(1280, 720, 3.0));
        assert_eq!(extents.surface, (3840, 2160));
        assert_eq!(extents.scene, (2560, 1440));
    }

    #[test]
    fn scene_matches_surface_below_the_cap() {
        let extents = FrameExtents::new(PhysicalSize::new(1920, 1080), &viewport(1280, 720, 1.5));
        assert_eq!(extents.surface, (1920, 1080));
        assert_eq!(extents.scene, extents.surface);
    }

    #[test]
    fn minimised_window_keeps_one_pixel() {
        let extents = FrameExtents::new(PhysicalSize::new(0, 0), &viewport(0, 0, 2.0));
        assert_eq!(extents.surface, (1, 1));
        assert_eq!(extents.scene, (1, 1));
    }

    #[test]
    fn scene_never_exceeds_surface() {
        // Logical size rounded up past the physical window.
        let extents = FrameExtents::new(PhysicalSize::new(1001, 1001), &viewport(501, 501, 2.0));
        assert_eq!(extents.scene, (1001, 1001));
    }
}
