//! Platform layer: window, event loop and input mapping for the two-object viewer.
//!
//! Input events only enqueue commands through the controller; the transforms are
//! advanced on `RedrawRequested`, right before the frame is rendered.

use std::sync::Arc;

use anyhow::{Context, Result};
use asset::{MeshBuffer, TextureData};
use corelib::{InteractionController, MotionConfig, PointerPhase, ProjectionConfig, TouchTracker};
use renderer::{DrawItem, GpuState};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

mod scene;

pub use scene::Scene;

/// Scroll distance in pixels treated as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

/// Meshes and texture for one posable object.
pub struct ObjectAsset {
    pub label: String,
    pub meshes: Vec<MeshBuffer>,
    pub texture: TextureData,
}

pub struct ViewerOptions {
    pub head: ObjectAsset,
    pub body: ObjectAsset,
    pub motion: MotionConfig,
    pub projection: ProjectionConfig,
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
}

struct Running {
    window: Arc<Window>,
    gpu: GpuState,
    scene: Scene,
    controller: InteractionController,
    touches: TouchTracker,
    cursor: PhysicalPosition<f64>,
    dragging: bool,
}

struct ViewerApp {
    options: ViewerOptions,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let o = &self.options;
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("Duopose")
                    .with_inner_size(PhysicalSize::new(o.width, o.height)),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);
        let PhysicalSize { width, height } = window.inner_size();
        log::info!("Window created: {width}x{height}");

        let mut gpu = pollster::block_on(GpuState::new(window.clone(), o.backends))?;
        let head = gpu.upload_object(&o.head.label, &o.head.meshes, &o.head.texture);
        let body = gpu.upload_object(&o.body.label, &o.body.meshes, &o.body.texture);

        let (scene, controller) =
            Scene::new(&o.motion, o.projection, gpu.size(), [head, body])?;

        Ok(Running {
            window,
            gpu,
            scene,
            controller,
            touches: TouchTracker::new(width, height),
            cursor: PhysicalPosition::new(0.0, 0.0),
            dragging: false,
        })
    }
}

impl Running {
    fn normalized_cursor(&self) -> (f32, f32) {
        let (w, h) = self.gpu.size();
        corelib::normalize_pointer(self.cursor.x as f32, self.cursor.y as f32, w, h)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size.width, size.height);
        let (w, h) = self.gpu.size();
        self.scene.resize(w, h);
        self.touches.resize(w, h);
        log::info!("Resized: {w}x{h}");
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let items: Vec<DrawItem> = self
            .scene
            .step()
            .into_iter()
            .map(|(object, model)| DrawItem { object, model })
            .collect();
        match self.gpu.render(&items, self.scene.projection()) {
            Ok(()) => {}
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface {e:?}, reconfiguring");
                self.gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {e:?}"),
        }
    }

    fn on_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed {
            return;
        }
        if let Key::Named(NamedKey::Escape) = event.logical_key {
            event_loop.exit();
            return;
        }
        if let Some((dx, dy)) = arrow_steps(&event.logical_key) {
            self.controller.on_step(self.scene.body(), dx, dy);
        }
    }
}

/// Arrow keys turn the body in whole steps: left/right about Y, up/down about X.
fn arrow_steps(key: &Key) -> Option<(i32, i32)> {
    match key {
        Key::Named(NamedKey::ArrowLeft) => Some((0, -1)),
        Key::Named(NamedKey::ArrowRight) => Some((0, 1)),
        Key::Named(NamedKey::ArrowUp) => Some((-1, 0)),
        Key::Named(NamedKey::ArrowDown) => Some((1, 0)),
        _ => None,
    }
}

fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
    }
}

fn touch_phase(phase: TouchPhase) -> PointerPhase {
    match phase {
        TouchPhase::Started => PointerPhase::Started,
        TouchPhase::Moved => PointerPhase::Moved,
        TouchPhase::Ended | TouchPhase::Cancelled => PointerPhase::Ended,
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(r) = self.running.as_mut() else {
            return;
        };
        if r.window.id() != window_id {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => r.resize(size),
            WindowEvent::CursorMoved { position, .. } => {
                r.cursor = position;
                if r.dragging {
                    let (x, y) = r.normalized_cursor();
                    r.controller.on_pointer_move(x, y);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    r.dragging = true;
                    let (x, y) = r.normalized_cursor();
                    r.controller.on_pointer_down(x, y);
                }
                ElementState::Released => {
                    r.dragging = false;
                    r.controller.on_pointer_count(0);
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                r.controller.on_scroll(scroll_lines(delta));
            }
            WindowEvent::Touch(t) => {
                r.touches.handle(
                    &mut r.controller,
                    t.id,
                    touch_phase(t.phase),
                    t.location.x as f32,
                    t.location.y as f32,
                );
            }
            WindowEvent::KeyboardInput { event, .. } => r.on_key(&event, event_loop),
            WindowEvent::RedrawRequested => r.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(r) = &self.running {
            r.window.request_redraw();
        }
    }
}

/// Open the viewer window and block until it is closed.
pub fn run_viewer(options: ViewerOptions) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = ViewerApp {
        options,
        running: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
