use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use whorl::app::{self, RunOptions};
use whorl::capture::DEFAULT_FRAME_COUNT;
use whorl::{GalaxyConfig, Mode, Winding};

/// Spiral galaxy orbit simulator.
#[derive(Parser, Debug)]
#[command(name = "whorl", version, about)]
struct Args {
    /// Kinematic model to run.
    #[arg(long, value_enum, default_value_t = Mode::Solid)]
    mode: Mode,

    /// Trailing or leading spiral arms.
    #[arg(long, value_enum, default_value_t = Winding::Trailing)]
    winding: Winding,

    /// Number of particles in the ensemble.
    #[arg(long, default_value_t = 100_000)]
    particles: usize,

    /// Shared orbit eccentricity, in [0, 1).
    #[arg(long, default_value_t = 0.6)]
    eccentricity: f32,

    /// Angular step per frame; defaults to the mode's reference rate.
    #[arg(long)]
    angular_velocity: Option<f32>,

    /// Pattern precession per frame (density_wave_pattern only).
    #[arg(long, default_value_t = 0.001)]
    pattern_speed: f32,

    /// RNG seed; a fresh one is drawn when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Export frames as a PNG sequence instead of only animating.
    #[arg(long)]
    render: bool,

    /// Number of frames to export with --render.
    #[arg(long = "n-frames", default_value_t = DEFAULT_FRAME_COUNT)]
    n_frames: u32,

    /// Overlay trajectories for two tracked particles.
    #[arg(long = "plot-traj")]
    plot_traj: bool,

    /// Output directory for --render; defaults to render_<mode>.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    });

    let mut config = GalaxyConfig::new(args.mode, args.winding)
        .with_particle_count(args.particles)
        .with_eccentricity(args.eccentricity)
        .with_pattern_speed(args.pattern_speed)
        .with_seed(seed);
    if let Some(omega) = args.angular_velocity {
        config = config.with_angular_velocity(omega);
    }

    let mut options = RunOptions::new(config);
    options.render = args.render;
    options.n_frames = args.n_frames;
    options.plot_traj = args.plot_traj;
    options.out_dir = args.out_dir;

    println!(
        "whorl: mode={} winding={} particles={} e={} seed={}",
        args.mode, args.winding, args.particles, args.eccentricity, seed
    );

    if let Err(e) = app::run(options) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
