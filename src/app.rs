//! The winit presentation shell.
//!
//! Drives the frame loop: advance the kinematics engine once per redraw,
//! upload the position buffer, draw, and optionally capture the frame for
//! the PNG sequence. The engine itself never blocks on I/O; capture
//! happens after the position update completes.

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::capture::{FrameRecorder, DEFAULT_FRAME_COUNT};
use crate::clock::FrameClock;
use crate::config::GalaxyConfig;
use crate::error::ShellError;
use crate::galaxy::Galaxy;
use crate::render::{FrameError, GpuState};
use crate::trajectory::Trajectory;

/// Particle indices followed when trajectory plotting is enabled, clamped
/// to the ensemble size at startup.
const TRAIL_PARTICLES: [usize; 2] = [1_000, 10_000];
const TRAIL_COLORS: [[f32; 4]; 2] = [[0.7, 0.0, 0.0, 1.0], [0.2, 0.0, 0.7, 1.0]];

/// Shell-level options on top of the engine configuration.
pub struct RunOptions {
    pub config: GalaxyConfig,
    /// Export frames as a PNG sequence.
    pub render: bool,
    /// Number of frames to export before exiting.
    pub n_frames: u32,
    /// Overlay trajectories for a couple of tracked particles.
    pub plot_traj: bool,
    /// Output directory override; defaults to `render_<mode>`.
    pub out_dir: Option<PathBuf>,
}

impl RunOptions {
    pub fn new(config: GalaxyConfig) -> Self {
        Self {
            config,
            render: false,
            n_frames: DEFAULT_FRAME_COUNT,
            plot_traj: false,
            out_dir: None,
        }
    }
}

/// Build the engine and run the event loop until the window closes or the
/// frame sequence completes.
pub fn run(options: RunOptions) -> Result<(), ShellError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(options)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct App {
    galaxy: Galaxy,
    trajectories: Vec<Trajectory>,
    recorder: Option<FrameRecorder>,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl App {
    /// Fail-fast construction: configuration errors and output-directory
    /// problems surface here, before any window opens.
    fn new(options: RunOptions) -> Result<Self, ShellError> {
        let galaxy = Galaxy::new(&options.config)?;

        let trajectories = if options.plot_traj {
            TRAIL_PARTICLES
                .iter()
                .zip(TRAIL_COLORS)
                .map(|(&id, color)| {
                    let id = id.min(galaxy.len() - 1);
                    let mut traj = Trajectory::new(id, color);
                    traj.record(galaxy.position(id));
                    traj
                })
                .collect()
        } else {
            Vec::new()
        };

        let recorder = if options.render {
            let dir = options
                .out_dir
                .unwrap_or_else(|| FrameRecorder::default_dir(options.config.mode.name()));
            Some(FrameRecorder::new(dir, options.n_frames)?)
        } else {
            None
        };

        Ok(Self {
            galaxy,
            trajectories,
            recorder,
            clock: FrameClock::new(),
            window: None,
            gpu_state: None,
            mouse_pressed: false,
            last_mouse_pos: None,
        })
    }

    fn title(&self) -> String {
        format!(
            "whorl - {} - {:.0} fps",
            self.galaxy.mode().name(),
            self.clock.fps()
        )
    }

    /// One simulation + render frame.
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        self.clock.tick();

        self.galaxy.iterate();
        for traj in &mut self.trajectories {
            traj.record(self.galaxy.position(traj.particle_index()));
        }

        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };

        gpu_state.upload_positions(self.galaxy.positions());
        for (layer, traj) in self.trajectories.iter().enumerate() {
            gpu_state.upload_trail(layer, traj.points());
        }

        let capture = self.recorder.is_some();
        match gpu_state.render(capture) {
            Ok(pixels) => {
                if let (Some(recorder), Some(pixels)) = (&mut self.recorder, pixels) {
                    match recorder.save(&pixels) {
                        Ok(true) => {}
                        Ok(false) => event_loop.exit(),
                        Err(e) => {
                            eprintln!("Frame export error: {}", e);
                            event_loop.exit();
                        }
                    }
                }
            }
            Err(FrameError::Surface(wgpu::SurfaceError::Lost)) => {
                gpu_state.resize(winit::dpi::PhysicalSize {
                    width: gpu_state.config.width,
                    height: gpu_state.config.height,
                })
            }
            Err(FrameError::Surface(wgpu::SurfaceError::OutOfMemory)) => event_loop.exit(),
            Err(FrameError::Surface(e)) => eprintln!("Render error: {:?}", e),
            Err(FrameError::Capture(e)) => {
                eprintln!("Frame export error: {}", e);
                event_loop.exit();
            }
        }

        if self.clock.frame() % 30 == 0 {
            if let Some(window) = &self.window {
                window.set_title(&self.title());
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title(self.title())
                .with_inner_size(winit::dpi::LogicalSize::new(1024, 1024));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    eprintln!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            self.window = Some(window.clone());

            let export = self.recorder.is_some();
            let mut gpu_state = match pollster::block_on(GpuState::new(
                window,
                self.galaxy.len() as u32,
                export,
            )) {
                Ok(state) => state,
                Err(e) => {
                    eprintln!("GPU error: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            for traj in &self.trajectories {
                gpu_state.add_trail_layer(traj.color(), traj.capacity() as u32);
            }
            gpu_state.upload_positions(self.galaxy.positions());
            self.gpu_state = Some(gpu_state);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;

                        if let Some(gpu_state) = &mut self.gpu_state {
                            let height = gpu_state.config.height as f32;
                            gpu_state.camera.pan_pixels(dx, dy, height);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
