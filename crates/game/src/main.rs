//! OpenGlide: an endless city flight toy.
//!
//! A fixed-timestep simulation (60 Hz) flies a plane over a procedurally
//! streamed city. Buildings appear around the player and vanish behind them,
//! pickups grant score and powerups, and the sky cycles through day and
//! night.

mod assets;
mod config;
mod environment;
mod events;
mod flight;
mod hud;
mod pickups;
mod scene;
mod state;
mod update;

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use anyhow::Result;
use engine_core::time::Time;
use glam::Vec3;
use input::InputState;
use procgen::Decoration;
use rand::rngs::StdRng;
use rand::SeedableRng;
use renderer::{Camera, DrawBatch, FrameDraws, Mesh, Renderer, Texture};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::assets::AssetEvent;
use crate::config::GameConfig;
use crate::flight::FlightInputs;
use crate::state::SimState;
use crate::update::TickInputs;

/// Primitive meshes shared by every instanced draw.
struct Meshes {
    cube: Mesh,
    plane: Mesh,
    sphere: Mesh,
    billboard: Mesh,
}

pub(crate) struct GameState {
    renderer: Renderer,
    camera: Camera,
    input: InputState,
    time: Time,
    sim: SimState,
    running: bool,

    decorations: Vec<Decoration>,
    cloud_positions: Vec<Vec3>,
    meshes: Meshes,

    asset_events: Receiver<AssetEvent>,
    plane_model: Option<Mesh>,
    sky_texture: Option<wgpu::BindGroup>,
    cloud_texture: Option<wgpu::BindGroup>,
}

impl GameState {
    async fn new(window: Arc<Window>, config: GameConfig) -> Result<Self> {
        let renderer = Renderer::new(window, config.vsync).await?;
        let size = renderer.size();
        let camera = Camera::new(size.width as f32 / size.height.max(1) as f32);

        let device = renderer.device();
        let meshes = Meshes {
            cube: Mesh::cube(device),
            plane: Mesh::plane(device),
            sphere: Mesh::sphere(device, 32, 16),
            billboard: Mesh::billboard_quad(device),
        };

        let sim = SimState::new(config.world_seed);
        let decorations = procgen::populate_environment(config.world_seed);
        // Separate stream so cloud placement never shifts pickup draws.
        let mut cloud_rng = StdRng::seed_from_u64(config.world_seed.wrapping_add(1));
        let cloud_positions = scene::scatter_clouds(&mut cloud_rng);

        let asset_events = assets::spawn_loader(PathBuf::from("assets"));

        log::info!("world seed {}", config.world_seed);

        Ok(Self {
            renderer,
            camera,
            input: InputState::new(),
            time: Time::new(),
            sim,
            running: true,
            decorations,
            cloud_positions,
            meshes,
            asset_events,
            plane_model: None,
            sky_texture: None,
            cloud_texture: None,
        })
    }

    /// Upload any assets the loader thread has finished.
    fn drain_asset_events(&mut self) {
        while let Ok(event) = self.asset_events.try_recv() {
            match event {
                AssetEvent::PlaneModel(data) => {
                    self.plane_model = Some(data.upload(self.renderer.device(), "plane_model"));
                    log::info!("plane model ready");
                }
                AssetEvent::SkyTexture(image) => {
                    let texture = Texture::from_rgba_image(
                        self.renderer.device(),
                        self.renderer.queue(),
                        &image,
                        "sky_texture",
                    );
                    self.sky_texture =
                        Some(self.renderer.create_texture_bind_group(&texture, "sky"));
                    log::info!("sky texture ready");
                }
                AssetEvent::CloudTexture(image) => {
                    let texture = Texture::from_rgba_image(
                        self.renderer.device(),
                        self.renderer.queue(),
                        &image,
                        "cloud_texture",
                    );
                    self.cloud_texture =
                        Some(self.renderer.create_texture_bind_group(&texture, "clouds"));
                    log::info!("cloud texture ready");
                }
            }
        }
    }

    fn update(&mut self) {
        self.drain_asset_events();

        self.time.update();
        let tick_inputs = TickInputs {
            flight: FlightInputs::sample(&self.input),
            reset: self.input.reset_held(),
        };
        while self.time.should_fixed_update() {
            update::fixed_tick(&mut self.sim, &tick_inputs);
        }

        // Edge-triggered toggles apply once per frame, after any natural
        // day/night crossing, so the key wins until the next crossing.
        if self.input.day_night_toggle_pressed() {
            self.sim.environment.toggle_day_night();
        }
        if self.input.camera_cycle_pressed() {
            self.sim.environment.cycle_camera();
        }

        self.sim
            .environment
            .apply_camera(&self.sim.player.transform, &mut self.camera);
        self.renderer.update_camera(&self.camera);
        let lighting = self.sim.environment.lighting();
        self.renderer.update_lighting(&lighting);

        let title = hud::window_title(
            self.sim.player.transform.position.y,
            self.sim.score,
            self.sim.crashed,
        );
        self.renderer.window().set_title(&title);

        if self.time.frame_count() % 60 == 0 {
            log::debug!(
                "alt {:.2} speed {:.3} score {} fps {:.0}",
                self.sim.player.transform.position.y,
                self.sim.player.speed,
                self.sim.score,
                self.time.fps()
            );
        }

        self.input.begin_frame();
    }

    fn render(&mut self) -> Result<()> {
        let scene = scene::assemble(
            &self.sim,
            &self.decorations,
            &self.cloud_positions,
            &self.camera,
        );

        let mut frame = FrameDraws::default();

        if !scene.sky.is_empty() {
            if let Some(sky_texture) = &self.sky_texture {
                frame.sky = Some(DrawBatch {
                    mesh: &self.meshes.sphere,
                    texture: Some(sky_texture),
                    instances: &scene.sky,
                });
            }
        }

        frame.opaque.push(DrawBatch {
            mesh: &self.meshes.plane,
            texture: None,
            instances: &scene.planes,
        });
        frame.opaque.push(DrawBatch {
            mesh: &self.meshes.cube,
            texture: None,
            instances: &scene.cubes,
        });
        frame.opaque.push(DrawBatch {
            mesh: &self.meshes.sphere,
            texture: None,
            instances: &scene.spheres,
        });
        match &self.plane_model {
            Some(model) => frame.opaque.push(DrawBatch {
                mesh: model,
                texture: None,
                instances: &scene.player_model,
            }),
            None => frame.opaque.push(DrawBatch {
                mesh: &self.meshes.cube,
                texture: None,
                instances: &scene.player_fallback,
            }),
        }

        frame.transparent.push(DrawBatch {
            mesh: &self.meshes.cube,
            texture: None,
            instances: &scene.water,
        });
        if let Some(cloud_texture) = &self.cloud_texture {
            frame.transparent.push(DrawBatch {
                mesh: &self.meshes.billboard,
                texture: Some(cloud_texture),
                instances: &scene.clouds,
            });
        }

        self.renderer.render(&frame)
    }
}

/// Application handler for winit.
struct App {
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = GameConfig::load();
            let mut window_attrs = Window::default_attributes()
                .with_title(hud::GAME_TITLE)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    config.window_width,
                    config.window_height,
                ));
            if config.fullscreen {
                window_attrs = window_attrs
                    .with_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
            }

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            match pollster::block_on(GameState::new(window.clone(), config)) {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize game: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════════════╗");
    println!("║                  OpenGlide                   ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  CONTROLS:                                   ║");
    println!("║    A/D        - Roll left/right              ║");
    println!("║    W/S        - Pitch down/up                ║");
    println!("║    Q/E        - Yaw left/right               ║");
    println!("║    Up/Down    - Throttle                     ║");
    println!("║    C          - Cycle camera                 ║");
    println!("║    N          - Toggle day/night             ║");
    println!("║    R          - Reset after a crash          ║");
    println!("║    Escape     - Quit                         ║");
    println!("╚══════════════════════════════════════════════╝");

    log::info!("Starting OpenGlide");

    let event_loop = EventLoop::new()?;
    // Poll continuously so RedrawRequested keeps firing between input events.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
