use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use glam::Vec2;
use log::{error, info, warn};
use pollster::block_on;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

use courtside::app::{WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use courtside::{Renderer, ResourcePaths, SceneAssets, SceneContext, SCENE};

/// Failures that prevent the window or GPU from coming up.
#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to create event loop")]
    EventLoop(#[source] winit::error::EventLoopError),
    #[error("failed to create window")]
    Window(#[source] winit::error::OsError),
    #[error("failed to initialize GPU: {0}")]
    Graphics(String),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        let code = if err.downcast_ref::<StartupError>().is_some() {
            -1
        } else {
            1
        };
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let resources = ResourcePaths::from_env();
    info!("resource root {}", resources.root().display());

    if options.summary_only {
        let assets = SceneAssets::load(&resources);
        print_summary(&assets);
        return Ok(());
    }

    let event_loop = EventLoop::new().map_err(StartupError::EventLoop)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(resources);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    resources: ResourcePaths,
    ctx: SceneContext,
    renderer: Option<Renderer>,
    start: Instant,
    cursor: Vec2,
    focused: bool,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(resources: ResourcePaths) -> Self {
        Self {
            resources,
            ctx: SceneContext::new(),
            renderer: None,
            start: Instant::now(),
            cursor: Vec2::new(WINDOW_WIDTH as f32 / 2.0, WINDOW_HEIGHT as f32 / 2.0),
            focused: true,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(StartupError::Window)?,
        );
        capture_cursor(&window);

        let mut renderer = block_on(Renderer::new(Arc::clone(&window)))
            .map_err(|err| StartupError::Graphics(format!("{err:#}")))?;

        let assets = SceneAssets::load(&self.resources);
        let failures = assets.failures();
        if failures > 0 {
            warn!("{failures} asset(s) failed to load; placeholders in use");
        }
        renderer.upload_scene(&assets);

        self.start = Instant::now();
        self.renderer = Some(renderer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        let now = self.start.elapsed().as_secs_f32();
        let frame = self.ctx.tick(now, renderer.aspect());
        if self.ctx.close_requested() {
            event_loop.exit();
            return Ok(());
        }

        if let Err(err) = renderer.render(&frame) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    renderer.reconfigure();
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    warn!("surface timeout; retrying next frame");
                }
                wgpu::SurfaceError::Other => {
                    warn!("surface error; retrying next frame");
                }
            }
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() || self.error.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if window_id != renderer.window_id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.ctx.request_close();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => renderer.resize(size),
            WindowEvent::Focused(focused) => {
                self.focused = focused;
                if focused {
                    capture_cursor(renderer.window());
                } else {
                    self.ctx.input.release_all();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                self.ctx
                    .on_physical_key(code, state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y_offset = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / 20.0,
                };
                self.ctx.on_scroll(y_offset);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(event_loop) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if !self.focused || self.renderer.is_none() {
            return;
        }
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.cursor += Vec2::new(dx as f32, dy as f32);
            self.ctx.on_cursor_moved(self.cursor);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &self.renderer {
            renderer.window().request_redraw();
        }
    }
}

fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        warn!("cursor grab unavailable: {err}");
    }
    window.set_cursor_visible(false);
}

fn print_summary(assets: &SceneAssets) {
    println!("Scene with {} objects", SCENE.len());
    for object in &SCENE {
        println!(" - {} ({})", object.name, object.model.path());
    }

    println!("Models:");
    for entry in &assets.models {
        match &entry.model {
            Ok(model) => {
                println!(
                    " - {} meshes={} textures={}",
                    entry.path.display(),
                    model.meshes.len(),
                    model.textures_loaded.len()
                );
                for mesh in &model.meshes {
                    println!(
                        "   mesh {} vertices={} indices={}",
                        mesh.name,
                        mesh.vertex_count(),
                        mesh.indices.len()
                    );
                }
                for texture in &model.textures_loaded {
                    println!("   {} {}", texture.path.display(), texture.kind);
                }
            }
            Err(err) => println!(" - {} missing: {err}", entry.path.display()),
        }
    }

    println!("Textures:");
    for entry in [&assets.diffuse_map, &assets.specular_map] {
        match &entry.texture {
            Ok(texture) => println!(
                " - {} {}x{} levels={}",
                entry.path.display(),
                texture.width,
                texture.height,
                texture.mip_level_count()
            ),
            Err(err) => println!(" - {} missing: {err}", entry.path.display()),
        }
    }

    println!("Missing assets: {}", assets.failures());
}

struct CliOptions {
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut summary_only = false;
        for arg in env::args().skip(1) {
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: courtside [--summary-only]"
                    ));
                }
            }
        }
        Ok(Self { summary_only })
    }
}
