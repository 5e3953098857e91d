use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use glb_viewer::assets::{AssetLoader, AssetSlot, AssetSource, LoadCompletion, SwapOutcome};
use glb_viewer::camera::FlyCamera;
use glb_viewer::cli::Cli;
use glb_viewer::core::{ControlAction, FlyControls, FrameClock, UiCapture};
use glb_viewer::event::ViewerEvent;
use glb_viewer::lighting::frame_uniform;
use glb_viewer::loaders::GltfDecoder;
use glb_viewer::renderer::Renderer;
use glb_viewer::settings::ViewerSettings;
use glb_viewer::ui::{self, AssetSummary, UiActions, UiStatus};

const FPS_WINDOW: Duration = Duration::from_secs(1);
const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    settings: ViewerSettings,
    camera: FlyCamera,
    controls: FlyControls,
    clock: FrameClock,
    slot: AssetSlot,
    loader: AssetLoader<EventLoopProxy<ViewerEvent>>,
    startup_model: Option<PathBuf>,
}

impl App {
    fn new(
        settings: ViewerSettings,
        loader: AssetLoader<EventLoopProxy<ViewerEvent>>,
        startup_model: Option<PathBuf>,
    ) -> Self {
        Self {
            window: None,
            renderer: None,
            settings,
            camera: FlyCamera::new(),
            controls: FlyControls::new(),
            clock: FrameClock::new(FPS_WINDOW),
            slot: AssetSlot::new(),
            loader,
            startup_model,
        }
    }

    fn request_load(&mut self, source: AssetSource) {
        let ticket = self.slot.begin(source);
        let retained = ticket.clone();
        if let Err(error) = self.loader.spawn(ticket) {
            self.slot.complete(LoadCompletion::new(&retained, Err(error)));
        }
    }

    fn open_file_dialog(&mut self) {
        if let Some(window) = &self.window {
            self.controls.release_pointer(&**window);
        }
        let picked = rfd::FileDialog::new()
            .set_title("Open glTF model")
            .add_filter("glTF", &["glb", "gltf"])
            .pick_file();
        if let Some(path) = picked {
            self.request_load(AssetSource::Path(path));
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.clock.tick();
        self.camera.update(self.settings.movement_speed, delta);

        let (Some(renderer), Some(window)) = (self.renderer.as_mut(), self.window.as_ref()) else {
            return;
        };

        renderer.set_pixel_ratio(self.settings.effective_pixel_ratio());
        let current = self.slot.current();
        renderer.sync_scene(current.map(|a| a.as_ref()), self.slot.generation());

        let frame = frame_uniform(
            self.camera.view_projection(renderer.aspect_ratio()),
            self.camera.position,
            &self.settings,
            renderer.scene_bounds(),
        );

        let status = UiStatus {
            fps: self.clock.fps(),
            progress: self.slot.progress_percent(),
            loading: self.slot.pending_name().map(str::to_string),
            asset: current.map(|asset| AssetSummary {
                name: asset.name.clone(),
                nodes: asset.root.node_count(),
                triangles: asset.triangle_count(),
            }),
            last_error: self.slot.last_error().map(str::to_string),
            pointer_locked: self.controls.is_locked(),
            camera_position: self.camera.position,
            render_size: renderer.target_size(),
        };

        let settings = &mut self.settings;
        let mut actions = UiActions::default();
        match renderer.render(window, &frame, |ctx| actions = ui::draw(ctx, settings, &status)) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {}", e),
        }

        if actions.clear_asset {
            self.slot.clear();
        }
        if actions.open_file {
            self.open_file_dialog();
        }
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("GLB Viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(
            window.clone(),
            self.settings.effective_pixel_ratio(),
        )) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        log::info!("Window created: {}x{}", window.inner_size().width, window.inner_size().height);
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.clock.restart();

        if let Some(path) = self.startup_model.take() {
            self.request_load(AssetSource::Path(path));
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::AssetLoaded(completion) => {
                let id = completion.id;
                let outcome = self.slot.complete(*completion);
                if outcome == SwapOutcome::Discarded {
                    log::debug!("Load {} arrived after being superseded", id);
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let ui = match (&mut self.renderer, &self.window) {
            (Some(renderer), Some(window)) => UiCapture {
                consumed: renderer.handle_event(window, &event),
                wants_pointer: renderer.wants_pointer(),
            },
            _ => UiCapture::default(),
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
                    renderer.resize(size, window.scale_factor());
                }
            }
            WindowEvent::Focused(false) => {
                if let Some(window) = &self.window {
                    self.controls.focus_lost(&**window, &mut self.camera);
                }
            }
            WindowEvent::DroppedFile(path) => self.request_load(AssetSource::Path(path)),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::KeyboardInput { .. } | WindowEvent::MouseInput { .. } => {
                if let Some(window) = &self.window {
                    let action = self.controls.handle_window_event(&event, ui, &**window, &mut self.camera);
                    if action == ControlAction::Exit {
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.controls.mouse_motion(&mut self.camera, dx as f32, dy as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = ViewerSettings::resolve(&cli)?;

    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("Failed to create event loop")?;
    let loader = AssetLoader::new(Arc::new(GltfDecoder), event_loop.create_proxy());
    let mut app = App::new(settings, loader, cli.model);

    log::info!("GLB Viewer - click to look, WASD/arrows to move, Space/Shift up/down, Escape to release or quit");
    event_loop.run_app(&mut app).context("Event loop failed")?;

    Ok(())
}
