//! Interactive shell cloud viewer.
//!
//! Controls:
//! - +/-: Double/halve triangle count
//! - [/]: Shrink/grow outer radius
//! - 1/2: Decrease/increase minimum triangle size
//! - 3/4: Decrease/increase maximum triangle size
//! - ,/.: Fewer/more shells
//! - F: Toggle wireframe
//! - R: Regenerate with a new seed
//! - Space: Pause/resume rotation
//! - Left-drag / arrows: Orbit
//! - Scroll wheel: Zoom
//! - Home: Reset camera
//! - Escape: Quit
//!
//! Gamepad Controls:
//! - Left stick: Orbit
//! - LT2/RT2 (analog): Zoom in/out
//! - DPad Up/Down: Double/halve triangle count
//! - DPad Left/Right: Fewer/more shells
//! - LB/RB: Shrink/grow radius
//! - A: Toggle wireframe
//! - Y: Regenerate
//! - Start: Pause/resume rotation

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use gilrs::{Axis, Event as GilrsEvent, EventType, Gilrs};
use rand::{rngs::StdRng, SeedableRng};
use shellcloud_core::{CloudBuilder, GenerationParameters, MeshId};
use shellcloud_wgpu::controls::{control_for_button, control_for_key};
use shellcloud_wgpu::{Cli, Control, EditQueue, OrbitCamera, Renderer, ViewerConfig};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

const DEADZONE: f32 = 0.15;

fn apply_deadzone(value: f32) -> f32 {
    if value.abs() < DEADZONE {
        0.0
    } else {
        (value - value.signum() * DEADZONE) / (1.0 - DEADZONE)
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn window_title(params: &GenerationParameters) -> String {
    format!(
        "Shell Cloud - {} triangles, {} shells{}",
        params.total_triangle_count,
        params.shell_count,
        if params.wireframe { ", wireframe" } else { "" }
    )
}

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    builder: Option<CloudBuilder<MeshId, StdRng>>,
    gilrs: Option<Gilrs>,
    edits: EditQueue,
    last_frame: Instant,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            renderer: None,
            builder: None,
            gilrs: None,
            edits: EditQueue::new(),
            last_frame: Instant::now(),
        }
    }

    /// Parameters of the cloud on display.
    fn live_params(&self) -> GenerationParameters {
        self.builder
            .as_ref()
            .and_then(|b| b.params().copied())
            .unwrap_or(self.config.generation)
    }

    /// Returns false when the app should quit.
    fn handle_control(&mut self, control: Control) -> bool {
        let live = self.live_params();
        match control {
            Control::Edit(edit) => {
                tracing::debug!("Edit: {:?}", edit);
                self.edits.push(edit, &live);
            }
            Control::Reseed => {
                tracing::info!("Regenerating with a new seed");
                self.edits.reseed(&live);
            }
            Control::ToggleRotation => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.camera.toggle_auto_rotate();
                    tracing::info!(
                        "Rotation: {}",
                        if renderer.camera.auto_rotate { "on" } else { "paused" }
                    );
                }
            }
            Control::Quit => return false,
        }
        true
    }

    /// Rebuild once for all edits received since the last frame.
    fn apply_pending_edits(&mut self) {
        let Some((params, reseed)) = self.edits.take() else {
            return;
        };
        let (Some(renderer), Some(builder)) = (&mut self.renderer, &mut self.builder) else {
            return;
        };

        if reseed {
            builder.reseed(make_rng(None));
        }

        // Rejections are logged by the builder; the old cloud stays up
        if builder.rebuild(&mut renderer.scene(), params).is_ok() {
            let meshes = renderer.meshes();
            tracing::info!(
                "GPU: {} meshes attached, {:.2} MB",
                meshes.attached_count(),
                meshes.gpu_bytes() as f64 / 1_000_000.0
            );
            if let Some(window) = &self.window {
                window.set_title(&window_title(&params));
            }
        }
    }

    /// Returns false when the app should quit.
    fn update_gamepad(&mut self) -> bool {
        let Some(gilrs) = &mut self.gilrs else {
            return true;
        };

        let mut pressed = Vec::new();
        while let Some(GilrsEvent { id, event, .. }) = gilrs.next_event() {
            tracing::debug!("Gamepad {:?} event: {:?}", id, event);
            if let EventType::ButtonPressed(button, _) = event {
                pressed.push(button);
            }
        }

        if let Some(renderer) = &mut self.renderer {
            let (mut orbit_x, mut orbit_y, mut zoom) = (0.0, 0.0, 0.0);
            if let Some((_id, gamepad)) = gilrs.gamepads().find(|(_, g)| g.is_connected()) {
                orbit_x = apply_deadzone(gamepad.value(Axis::LeftStickX));
                orbit_y = apply_deadzone(gamepad.value(Axis::LeftStickY));
                let zoom_in = gamepad.value(Axis::LeftZ).max(0.0);
                let zoom_out = gamepad.value(Axis::RightZ).max(0.0);
                zoom = zoom_out - zoom_in;
            }
            renderer.camera.set_gamepad_orbit(orbit_x, orbit_y);
            renderer.camera.set_gamepad_zoom(zoom);
        }

        for button in pressed {
            let current = self.edits.current(&self.live_params());
            if let Some(control) = control_for_button(button, &current) {
                if !self.handle_control(control) {
                    return false;
                }
            }
        }
        true
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(window_title(&self.config.generation))
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match Gilrs::new() {
            Ok(gilrs) => {
                for (_id, gamepad) in gilrs.gamepads() {
                    tracing::info!("Gamepad found: {}", gamepad.name());
                }
                self.gilrs = Some(gilrs);
            }
            Err(e) => {
                tracing::warn!("Failed to initialize gamepad support: {}", e);
            }
        }

        let camera = OrbitCamera::from_config(&self.config.camera);
        let mut renderer = match pollster::block_on(Renderer::new(window, camera)) {
            Ok(renderer) => renderer,
            Err(e) => {
                tracing::error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        let params = self.config.generation;
        tracing::info!(
            "Generating {} triangles in {} shells...",
            params.total_triangle_count,
            params.shell_count
        );
        match CloudBuilder::build_initial(&mut renderer.scene(), params, make_rng(self.config.seed)) {
            Ok(builder) => self.builder = Some(builder),
            Err(e) => {
                tracing::error!("Initial build failed: {}", e);
                event_loop.exit();
                return;
            }
        }

        self.renderer = Some(renderer);
        self.last_frame = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.renderer.is_none() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if state == ElementState::Pressed && !repeat {
                    let current = self.edits.current(&self.live_params());
                    if let Some(control) = control_for_key(key, &current) {
                        if !self.handle_control(control) {
                            event_loop.exit();
                            return;
                        }
                    }
                }

                if let Some(renderer) = &mut self.renderer {
                    renderer.camera.handle_keyboard(key, state);
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.camera.handle_mouse_button(button, state);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.camera.handle_mouse_motion(position.x, position.y);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                if let Some(renderer) = &mut self.renderer {
                    renderer.camera.handle_scroll(scroll);
                }
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f32();
                self.last_frame = now;

                if !self.update_gamepad() {
                    event_loop.exit();
                    return;
                }

                // Finish any rebuild before this frame reads the scene
                self.apply_pending_edits();

                if let Some(renderer) = &mut self.renderer {
                    renderer.camera.update(dt);

                    match renderer.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            renderer.resize(renderer.size());
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            tracing::error!("Out of GPU memory");
                            event_loop.exit();
                        }
                        Err(e) => {
                            tracing::warn!("Render error: {:?}", e);
                        }
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let (Some(renderer), Some(builder)) = (&mut self.renderer, &mut self.builder) {
            let failures = builder.teardown(&mut renderer.scene());
            if failures > 0 {
                tracing::warn!("{} shell meshes failed to release on exit", failures);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.load()?;

    tracing::info!("Shell cloud viewer");
    tracing::info!(
        "Triangles: {}, radius: {}, sizes: [{}, {}], shells: {}",
        config.generation.total_triangle_count,
        config.generation.outer_radius,
        config.generation.size_min,
        config.generation.size_max,
        config.generation.shell_count
    );
    if let Some(seed) = config.seed {
        tracing::info!("Seed: {}", seed);
    }
    tracing::info!("Controls:");
    tracing::info!("  +/- - Double/halve triangle count");
    tracing::info!("  [/] - Shrink/grow radius");
    tracing::info!("  1/2, 3/4 - Adjust min/max triangle size");
    tracing::info!("  ,/. - Fewer/more shells");
    tracing::info!("  F - Toggle wireframe");
    tracing::info!("  R - Regenerate");
    tracing::info!("  Space - Pause rotation");
    tracing::info!("  Left-drag/arrows - Orbit, scroll - Zoom, Home - Reset");
    tracing::info!("  Escape - Quit");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
