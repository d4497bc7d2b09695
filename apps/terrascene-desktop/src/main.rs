use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use terrascene_common::SceneConfig;
use terrascene_input::{PointerEvent, PointerTracker};
use terrascene_kernel::Scene;
use terrascene_render::Projection;
use terrascene_render_wgpu::WgpuRenderer;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "terrascene-desktop", about = "Animated terrain and particle scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Failures while bringing up the window and GPU. Any of these skips the
/// scene loop entirely.
#[derive(Debug, thiserror::Error)]
enum SetupError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Frame-rate estimate smoothed over about half a second.
#[derive(Debug, Default)]
struct FpsCounter {
    frames: u32,
    window_start: Option<Instant>,
    fps: f32,
}

impl FpsCounter {
    fn tick(&mut self, now: Instant) {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let elapsed = (now - start).as_secs_f32();
        if elapsed >= 0.5 {
            self.fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.window_start = Some(now);
        }
    }
}

/// Application state that exists independently of the GPU.
struct AppState {
    scene: Scene,
    pointer: PointerTracker,
    projection: Projection,
    cursor: Vec2,
    show_hud: bool,
    last_frame: Instant,
    fps: FpsCounter,
}

impl AppState {
    fn new(config: &SceneConfig) -> Self {
        Self {
            scene: Scene::new(config),
            pointer: PointerTracker::new(),
            projection: Projection::default(),
            cursor: Vec2::ZERO,
            show_hud: true,
            last_frame: Instant::now(),
            fps: FpsCounter::default(),
        }
    }

    fn pointer(&mut self, event: PointerEvent) {
        let action = self.pointer.handle(event);
        self.scene.apply(action);
    }

    /// Decide whether pointer input belongs to the scene when egui may have
    /// claimed it. Presses and hovers over the HUD stay with egui; releases,
    /// and moves during a drag, always reach the tracker so a drag cannot
    /// outlive the button. Returns whether the event was forwarded.
    fn route_pointer(&mut self, event: PointerEvent, over_ui: bool) -> bool {
        let forward = match event {
            PointerEvent::Down(_) => !over_ui,
            PointerEvent::Move(_) => !over_ui || self.pointer.is_dragging(),
            PointerEvent::Up => true,
        };
        if forward {
            self.pointer(event);
        }
        forward
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f64().min(0.1);
        self.last_frame = now;
        self.fps.tick(now);
        self.scene.step(dt);
    }

    fn handle_key(&mut self, key: KeyCode, event_loop: &ActiveEventLoop) {
        match key {
            KeyCode::F1 => {
                self.show_hud = !self.show_hud;
            }
            KeyCode::Escape => {
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let summary = self.scene.summary();
        egui::Window::new("terrascene")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.0}", self.fps.fps));
                ui.label(format!("Time: {:.1}s  Frames: {}", summary.time, summary.frames));
                ui.label(format!("Particles: {}", summary.particle_count));
                ui.separator();
                let p = summary.camera.position;
                let r = summary.camera.rotation;
                ui.label(format!("Camera: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!("Rotation: ({:.2}, {:.2}, {:.2})", r.x, r.y, r.z));
                ui.label(format!(
                    "Returning: {}",
                    if summary.returning { "yes" } else { "no" }
                ));
                ui.separator();
                ui.small("LMB drag: move camera | F1: HUD | Esc: quit");
            });
    }
}

/// Everything tied to the window and GPU device.
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
    fn create(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        scene: &Scene,
    ) -> Result<Self, SetupError> {
        let attrs = Window::default_attributes()
            .with_title("terrascene")
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
        .ok_or(SetupError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("terrascene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(SetupError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer =
            WgpuRenderer::new(&device, surface_format, config.width, config.height, scene);

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

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn render(&mut self, egui_ctx: &EguiContext, state: &AppState) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
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

        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &state.scene,
            &state.projection,
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }

    /// Release GPU resources. Safe to call on any fully constructed `Gpu`.
    fn teardown(self) {
        self.renderer.destroy();
        drop(self.egui_renderer);
        drop(self.surface);
        tracing::info!("GPU resources released");
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(config: &SceneConfig) -> Self {
        Self {
            state: AppState::new(config),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn teardown(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.teardown();
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::create(event_loop, &self.egui_ctx, &self.state.scene) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.projection.set_viewport(size.width, size.height);
                self.state.last_frame = Instant::now();
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("setup skipped: {e}");
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
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);

        let pointer_event = match &event {
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(PointerEvent::Move(self.state.cursor))
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => Some(PointerEvent::Down(self.state.cursor)),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Released,
                ..
            } => Some(PointerEvent::Up),
            _ => None,
        };
        if let Some(pointer_event) = pointer_event {
            self.state.route_pointer(pointer_event, response.consumed);
            return;
        }

        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.state
                    .projection
                    .set_viewport(gpu.config.width, gpu.config.height);
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
                self.state.handle_key(key, event_loop);
            }
            WindowEvent::RedrawRequested => {
                self.state.update();
                gpu.render(&self.egui_ctx, &self.state);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("loading scene config from {}", path.display());
            SceneConfig::load(path)?
        }
        None => SceneConfig::default(),
    };

    tracing::info!("terrascene-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(&config);
    event_loop.run_app(&mut app)?;

    tracing::info!("terrascene-desktop exited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fps_counter_reports_after_half_second() {
        let mut fps = FpsCounter::default();
        let start = Instant::now();
        for i in 0..=30 {
            fps.tick(start + Duration::from_millis(i * 20));
        }
        // The first window closes at 0.5s with 26 frames counted.
        assert!(fps.fps > 40.0 && fps.fps < 70.0, "fps={}", fps.fps);
    }

    #[test]
    fn pointer_drag_reaches_scene() {
        let mut state = AppState::new(&SceneConfig {
            particle_count: 4,
            terrain_segments: 2,
            ..SceneConfig::default()
        });
        let rest = *state.scene.camera().target();
        state.pointer(PointerEvent::Down(Vec2::new(10.0, 10.0)));
        state.pointer(PointerEvent::Move(Vec2::new(60.0, 10.0)));
        assert_ne!(*state.scene.camera().target(), rest);
        state.pointer(PointerEvent::Up);
        assert!(state.scene.camera().is_returning());
    }

    fn small_state() -> AppState {
        AppState::new(&SceneConfig {
            particle_count: 4,
            terrain_segments: 2,
            ..SceneConfig::default()
        })
    }

    #[test]
    fn release_over_hud_ends_drag() {
        let mut state = small_state();
        assert!(state.route_pointer(PointerEvent::Down(Vec2::new(400.0, 300.0)), false));
        // Drag continues across the HUD.
        assert!(state.route_pointer(PointerEvent::Move(Vec2::new(40.0, 40.0)), true));
        assert!(state.pointer.is_dragging());

        assert!(state.route_pointer(PointerEvent::Up, true));
        assert!(!state.pointer.is_dragging());
        assert!(state.scene.camera().is_returning());

        // Later hovers no longer drag the target.
        let settled = *state.scene.camera().target();
        state.route_pointer(PointerEvent::Move(Vec2::new(500.0, 500.0)), false);
        assert_eq!(*state.scene.camera().target(), settled);
    }

    #[test]
    fn press_and_hover_over_hud_stay_with_ui() {
        let mut state = small_state();
        let rest = *state.scene.camera().target();
        assert!(!state.route_pointer(PointerEvent::Down(Vec2::new(20.0, 20.0)), true));
        assert!(!state.pointer.is_dragging());
        assert!(!state.route_pointer(PointerEvent::Move(Vec2::new(30.0, 25.0)), true));
        assert_eq!(*state.scene.camera().target(), rest);
    }
}
