use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin::display::GetGlDisplay;
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use splatview_render::{
    CubeGpuState, GraphicsContext, UniformValue, init_cube_renderer, render_cube,
};
use splatview_render_glow::{GlowContext, GridPass, OrbitCamera, SplatPass};
use splatview_shader::ShaderCustomization;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const CLEAR_COLOR: [f32; 4] = [0.08, 0.08, 0.1, 1.0];

#[derive(Parser)]
#[command(name = "splatview-desktop", about = "splatview desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Shader customization file (.yaml, .yml or .json) for the cube
    #[arg(short, long)]
    customization: Option<PathBuf>,

    /// Value written to the cube's `uBrightness` uniform every frame
    #[arg(short, long, default_value = "1.0")]
    brightness: f32,

    /// Number of points in the splat pass; 0 disables it
    #[arg(long, default_value = "2000")]
    splats: usize,
}

/// Customization used when none is given on the command line: a
/// brightness control plus a slow warm/cool pulse driven by `uTime`.
fn builtin_customization() -> ShaderCustomization {
    ShaderCustomization::new()
        .with_additional_uniforms("uniform float uTime;\nuniform float uBrightness;")
        .with_additional_functions(
            "vec3 warmCool(float t) {\n    return mix(vec3(1.05, 0.98, 0.9), vec3(0.92, 0.98, 1.08), 0.5 + 0.5 * sin(t));\n}",
        )
        .with_color_correction_function(
            "vec4 applyColorCorrection(vec4 color) {\n    return vec4(color.rgb * warmCool(uTime * 0.5) * uBrightness, color.a);\n}",
        )
}

/// Everything drawn each frame, in draw order. A pass that failed to build
/// is `None` and skipped for the session.
struct Scene {
    grid: Option<GridPass<GlowContext>>,
    cube: Option<CubeGpuState<GlowContext>>,
    splats: Option<SplatPass<GlowContext>>,
}

impl Scene {
    fn build(
        ctx: &GlowContext,
        camera: &OrbitCamera,
        customization: &ShaderCustomization,
        splat_count: usize,
    ) -> Self {
        let grid = GridPass::new(ctx, 20, 1.0)
            .inspect_err(|e| tracing::error!("grid pass disabled: {e}"))
            .ok();
        let cube = init_cube_renderer(ctx, camera, Some(customization))
            .inspect_err(|e| tracing::error!("cube disabled for this session: {e}"))
            .ok();
        let splats = if splat_count == 0 {
            None
        } else {
            SplatPass::new(ctx, splat_count, 3.0)
                .inspect_err(|e| tracing::error!("splat pass disabled: {e}"))
                .ok()
        };
        Self { grid, cube, splats }
    }

    fn destroy(self, ctx: &GlowContext) {
        if let Some(grid) = self.grid {
            grid.destroy(ctx);
        }
        if let Some(cube) = self.cube {
            cube.destroy(ctx);
        }
        if let Some(splats) = self.splats {
            splats.destroy(ctx);
        }
    }
}

/// GL objects tied to the window. Field order is drop order.
struct GlState {
    scene: Option<Scene>,
    ctx: Option<GlowContext>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl GlState {
    fn create(event_loop: &ActiveEventLoop) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("splatview")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs))
            .build(event_loop, template, pick_config)
            .map_err(|e| anyhow!("failed to create window: {e}"))?;
        let window = window.context("display builder returned no window")?;

        let raw_window_handle = window.window_handle().ok().map(|handle| handle.as_raw());
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(raw_window_handle);

        let gl_display = gl_config.display();
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .context("failed to create OpenGL 3.3 core context")?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .context("failed to describe window surface")?;
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .context("failed to create GL surface")?;
        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            tracing::warn!("vsync unavailable: {e}");
        }

        // The context was made current above and stays current on this thread.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };
        let ctx = unsafe { GlowContext::new(Arc::new(gl)) }?;

        Ok(Self {
            scene: None,
            ctx: Some(ctx),
            surface,
            context,
            window,
        })
    }

    fn resize(&self, size: PhysicalSize<u32>) {
        if let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        {
            self.surface.resize(&self.context, width, height);
        }
    }

    /// Release GPU objects while the context is still current.
    fn teardown(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            if let Some(scene) = self.scene.take() {
                scene.destroy(&ctx);
            }
            ctx.destroy();
        }
        tracing::debug!("GL resources released");
    }
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| {
            if config.num_samples() > best.num_samples() {
                config
            } else {
                best
            }
        })
        .expect("glutin only calls the picker with at least one config")
}

struct App {
    customization: ShaderCustomization,
    brightness: f32,
    splat_count: usize,
    camera: OrbitCamera,
    gl: Option<GlState>,
    started: Instant,
    last_frame: Instant,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(customization: ShaderCustomization, brightness: f32, splat_count: usize) -> Self {
        let now = Instant::now();
        Self {
            customization,
            brightness,
            splat_count,
            camera: OrbitCamera {
                auto_rotate: 0.2,
                ..OrbitCamera::default()
            },
            gl: None,
            started: now,
            last_frame: now,
            dragging: false,
            cursor: None,
            error: None,
        }
    }

    fn draw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        if !self.dragging {
            self.camera.advance(dt);
        }

        let Some(gl) = &mut self.gl else {
            return;
        };
        let (Some(ctx), Some(scene)) = (&gl.ctx, &mut gl.scene) else {
            return;
        };

        let size = gl.window.inner_size();
        ctx.viewport(0, 0, size.width as i32, size.height as i32);
        ctx.clear(CLEAR_COLOR);

        // Draw order: scene, cube, splats.
        if let Some(grid) = &scene.grid {
            grid.render(ctx, &self.camera);
        }
        if let Some(cube) = &mut scene.cube {
            let elapsed = self.started.elapsed().as_secs_f32();
            cube.set_uniform(ctx, "uTime", UniformValue::Float(elapsed));
            cube.set_uniform(ctx, "uBrightness", UniformValue::Float(self.brightness));
            render_cube(ctx, cube, &self.camera);
        }
        if let Some(splats) = &scene.splats {
            splats.render(ctx, &self.camera);
        }

        if let Err(e) = gl.surface.swap_buffers(&gl.context) {
            tracing::error!("swap failed: {e}");
        }
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut gl) = self.gl.take() {
            gl.teardown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gl.is_some() {
            return;
        }

        let mut gl = match GlState::create(event_loop) {
            Ok(gl) => gl,
            Err(e) => {
                tracing::error!("{e:#}");
                self.error = Some(e);
                event_loop.exit();
                return;
            }
        };

        let size = gl.window.inner_size();
        self.camera.set_viewport(size.width, size.height);
        if let Some(ctx) = &gl.ctx {
            gl.scene = Some(Scene::build(
                ctx,
                &self.camera,
                &self.customization,
                self.splat_count,
            ));
        }
        gl.window.request_redraw();
        self.gl = Some(gl);
        tracing::info!("window ready");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.exit(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(gl) = &self.gl {
                    gl.resize(size);
                }
                self.camera.set_viewport(size.width, size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Escape => self.exit(event_loop),
                KeyCode::KeyR => {
                    self.camera.auto_rotate = if self.camera.auto_rotate == 0.0 {
                        0.2
                    } else {
                        0.0
                    };
                }
                KeyCode::BracketRight => self.brightness = (self.brightness + 0.1).min(4.0),
                KeyCode::BracketLeft => self.brightness = (self.brightness - 0.1).max(0.0),
                _ => {}
            },
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last)) = (self.dragging, self.cursor) {
                    self.camera
                        .rotate((position.x - last.x) as f32, (position.y - last.y) as f32);
                }
                self.cursor = Some(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.camera.zoom(steps);
            }
            WindowEvent::RedrawRequested => {
                self.draw();
                if let Some(gl) = &self.gl {
                    gl.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gl) = &self.gl {
            gl.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("splatview-desktop starting");

    let customization = match &cli.customization {
        Some(path) => ShaderCustomization::load(path)
            .with_context(|| format!("failed to load customization {}", path.display()))?,
        None => builtin_customization(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(customization, cli.brightness, cli.splats);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splatview_render::{RecordingContext, StaticCamera};

    #[test]
    fn builtin_customization_builds_the_cube() {
        let ctx = RecordingContext::new();
        let custom = builtin_customization();
        let cube = init_cube_renderer(&ctx, &StaticCamera::default(), Some(&custom));
        assert!(cube.is_ok());
    }

    #[test]
    fn builtin_customization_declares_frame_uniforms() {
        let custom = builtin_customization();
        let uniforms = custom.additional_uniforms.as_deref().unwrap_or_default();
        assert!(uniforms.contains("uTime"));
        assert!(uniforms.contains("uBrightness"));
    }
}
