use winit::{
    dpi::PhysicalSize,
    event::*,
    event_loop::EventLoop,
    window::Window,
};
use clap::Parser;
use glam::Vec3;
use std::sync::Arc;

// Import from the library crate
use textfall::{logging, utils, model, view, controller};

use controller::physics::FLOOR_Y;
use controller::text_loader::TEXT_SPAWN;
use controller::{FrameClock, FrameTick, InputState, OrbitController, PhysicsWorld, TextLoader, TextState};
use model::{Camera, NodeId, Scene, SceneNode, Transform};
use view::render::{self, CameraUniform, LightingUniform};
use view::{GpuContext, RenderState};

const DEFAULT_FONT_URL: &str =
    "https://raw.githubusercontent.com/google/fonts/main/ofl/firamono/FiraMono-Regular.ttf";

/// Falling 3D text: a rigid box drops onto a plane and an extruded glyph
/// mesh tracks its pose every frame.
#[derive(Parser)]
#[command(name = "textfall", version, about)]
struct Args {
    /// Text tessellated into the falling mesh
    #[arg(long, default_value = "textfall")]
    text: String,

    /// TTF font fetched at startup
    #[arg(long, default_value = DEFAULT_FONT_URL)]
    font_url: String,
}

struct App {
    // Core GPU resources
    gpu: GpuContext,
    size: PhysicalSize<u32>,
    window: Arc<Window>,

    // Rendering state
    render_state: RenderState,
    depth_view: wgpu::TextureView,
    msaa_view: wgpu::TextureView,
    camera_buffer: wgpu::Buffer,
    lighting_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    node_layout: wgpu::BindGroupLayout,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Simulation state
    scene: Scene,
    physics: PhysicsWorld,
    orbit: OrbitController,
    input: InputState,
    clock: FrameClock,
    last_substeps: u32,

    // Text asset hand-off
    text_loader: Option<TextLoader>,
    text_state: TextState,
    text_node: Option<NodeId>,

    // Frame timing
    fps: f32,
    frame_count: u32,
    fps_timer: f32,
}

impl App {
    async fn new(window: Arc<Window>, args: Args) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let gpu = GpuContext::new(window.clone(), size.width.max(1), size.height.max(1)).await?;

        let (_, depth_view) = render::create_depth_texture(&gpu.device, size.width.max(1), size.height.max(1));
        let msaa_view = render::create_msaa_texture(&gpu.device, gpu.format, size.width.max(1), size.height.max(1));

        let camera_resources = render::create_camera_resources(&gpu.device);
        let node_layout = render::create_node_layout(&gpu.device);
        let pipeline = render::create_mesh_pipeline(
            &gpu.device,
            gpu.format,
            &camera_resources.bind_group_layout,
            &node_layout,
        );

        // Scene: camera at (0, 0, 5) looking at the origin, ground plane
        // matching the floor body's transform
        let camera = Camera::new(size.width.max(1), size.height.max(1));
        let mut scene = Scene::new(camera);
        let plane_mesh = utils::create_plane_mesh(8.0).upload(&gpu.device);
        scene.add_node(SceneNode::new(
            &gpu.device,
            &node_layout,
            plane_mesh,
            Transform::from_position(Vec3::new(0.0, FLOOR_Y, 0.0)),
        ));

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.format,
            egui_wgpu::RendererOptions::default(),
        );

        let render_state = RenderState {
            width: size.width.max(1),
            height: size.height.max(1),
            pipeline,
            egui_renderer,
        };

        // Kick off the one-shot font load; its outcome is polled every frame
        let text_loader = Some(TextLoader::spawn(args.font_url, args.text));

        Ok(Self {
            gpu,
            size,
            window,
            render_state,
            depth_view,
            msaa_view,
            camera_buffer: camera_resources.camera_buffer,
            lighting_buffer: camera_resources.lighting_buffer,
            camera_bind_group: camera_resources.camera_bind_group,
            node_layout,
            egui_state,
            egui_ctx,
            scene,
            physics: PhysicsWorld::new(),
            orbit: OrbitController::new(),
            input: InputState::new(),
            clock: FrameClock::new(),
            last_substeps: 0,
            text_loader,
            text_state: TextState::Loading,
            text_node: None,
            fps: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
        })
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // First let egui process the event
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;
        if egui_captured {
            return true;
        }

        match event {
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.input.orbiting = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.push_cursor(position.x, position.y);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 120.0,
                };
                self.input.push_scroll(lines);
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.gpu.config.width = new_size.width;
            self.gpu.config.height = new_size.height;
            self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);

            let (_, depth_view) =
                render::create_depth_texture(&self.gpu.device, new_size.width, new_size.height);
            self.depth_view = depth_view;
            self.msaa_view =
                render::create_msaa_texture(&self.gpu.device, self.gpu.format, new_size.width, new_size.height);

            self.render_state.width = new_size.width;
            self.render_state.height = new_size.height;
            self.scene.camera.set_aspect(new_size.width, new_size.height);
        }
    }

    fn update(&mut self, tick: FrameTick) {
        // Update FPS
        self.frame_count += 1;
        self.fps_timer += tick.delta;
        if self.fps_timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }

        // Text asset hand-off: appends to the scene at most once, then the
        // loader is dropped
        if let Some(loader) = &self.text_loader {
            if let Some(result) = loader.poll() {
                match result {
                    Ok(mesh) => {
                        let gpu_mesh = mesh.upload(&self.gpu.device);
                        let node = SceneNode::new(
                            &self.gpu.device,
                            &self.node_layout,
                            gpu_mesh,
                            Transform::from_position(Vec3::from_array(TEXT_SPAWN)),
                        );
                        self.text_node = Some(self.scene.add_node(node));
                        self.text_state = TextState::Ready;
                        tracing::info!("text mesh added to the scene");
                    }
                    Err(err) => {
                        tracing::warn!("text mesh unavailable: {err}");
                        self.text_state = TextState::Failed(err.to_string());
                    }
                }
                self.text_loader = None;
            }
        }

        // Physics step, then the one-way pose copy onto the text node. The
        // copy must see this frame's step, never the previous one.
        self.last_substeps = self.physics.step(tick.delta);
        if let Some(id) = self.text_node {
            self.scene
                .set_pose(id, self.physics.box_position(), self.physics.box_rotation());
        }

        // Consumed now, applied by the orbit update after the draw
        let (dx, dy) = self.input.consume_look();
        let scroll = self.input.consume_scroll();
        self.orbit.apply_input(dx, dy, scroll);

        // Camera + lighting uniforms for this frame's draw
        let camera_uniform = CameraUniform {
            view_proj: self.scene.camera.view_proj().to_cols_array_2d(),
        };
        self.gpu
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));
        let lighting_uniform = LightingUniform {
            ambient: self.scene.ambient,
            _pad: [0.0; 3],
        };
        self.gpu
            .queue
            .write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&lighting_uniform));
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let raw_input = self.egui_state.take_egui_input(&self.window);

        let fps = self.fps;
        let substeps = self.last_substeps;
        let box_pos = self.physics.box_position();
        let text_state = self.text_state.clone();

        let output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("debug")
                .default_pos([8.0, 8.0])
                .default_size([160.0, 100.0])
                .show(ctx, |ui| {
                    ui.label(egui::RichText::new(format!("FPS: {fps:.0}")).small());
                    ui.label(
                        egui::RichText::new(format!(
                            "box: {:.2}, {:.2}, {:.2}",
                            box_pos.x, box_pos.y, box_pos.z
                        ))
                        .small(),
                    );
                    ui.label(egui::RichText::new(format!("substeps: {substeps}")).small());
                    ui.label(egui::RichText::new(format!("text: {text_state}")).small());
                });
        });
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        let pixels_per_point = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(output.shapes, pixels_per_point);

        self.render_state.draw_frame(
            &self.gpu.device,
            &self.gpu.queue,
            &self.gpu.surface,
            &self.scene,
            &self.msaa_view,
            &self.depth_view,
            &self.camera_bind_group,
            &primitives,
            &output.textures_delta,
            pixels_per_point,
        )
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("textfall")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window.clone(), args))?;

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            // One loop iteration: clock, loader poll, physics
                            // step, pose copy, draw, then the damped controls
                            let tick = app.clock.tick();
                            app.update(tick);

                            match app.render() {
                                Ok(()) => {}
                                Err(wgpu::SurfaceError::Lost) => app.resize(app.size),
                                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                Err(e) => tracing::error!("render error: {e:?}"),
                            }

                            app.orbit.update(&mut app.scene.camera);
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                // Explicitly re-request the next frame
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
