//! Error types for whorl.
//!
//! Configuration problems are rejected up front, before any particle
//! ensemble or GPU resource exists. Numerical singularities inside the
//! kinematics (r = 0, r = r_max) are deliberately *not* errors; they
//! propagate as NaN/Inf per the update formulas.

use std::fmt;
use std::path::PathBuf;

/// Errors detected while validating a [`GalaxyConfig`](crate::GalaxyConfig).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Mode string did not name one of the five kinematic modes.
    UnknownMode(String),
    /// Winding string was neither `trailing` nor `leading`.
    UnknownWinding(String),
    /// Eccentricity outside `[0, 1)`.
    InvalidEccentricity(f32),
    /// A galaxy needs at least one particle.
    NoParticles,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownMode(s) => write!(
                f,
                "Unknown mode '{}'. Available modes are: solid, differential_1, differential_2, density_wave, density_wave_pattern",
                s
            ),
            ConfigError::UnknownWinding(s) => {
                write!(f, "Unknown winding '{}'. Available windings are: trailing, leading", s)
            }
            ConfigError::InvalidEccentricity(e) => {
                write!(f, "Eccentricity {} is outside [0, 1)", e)
            }
            ConfigError::NoParticles => write!(f, "Particle count must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum RenderError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            RenderError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            RenderError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::SurfaceCreation(e) => Some(e),
            RenderError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for RenderError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        RenderError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        RenderError::DeviceCreation(e)
    }
}

/// Errors that can occur while exporting rendered frames to disk.
#[derive(Debug)]
pub enum CaptureError {
    /// Failed to create or clear the output directory, or to write a frame.
    Io(std::io::Error),
    /// Failed to encode a frame as PNG.
    Encode(image::ImageError),
    /// Failed to map the readback buffer.
    BufferMapping(String),
    /// The surface format cannot be converted to RGB.
    UnsupportedFormat(wgpu::TextureFormat),
    /// The captured byte buffer did not match the expected dimensions.
    BadFrameData(PathBuf),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Io(e) => write!(f, "Frame export I/O error: {}", e),
            CaptureError::Encode(e) => write!(f, "Failed to encode frame: {}", e),
            CaptureError::BufferMapping(msg) => write!(f, "Failed to map readback buffer: {}", msg),
            CaptureError::UnsupportedFormat(fmt_) => {
                write!(f, "Surface format {:?} is not supported for capture", fmt_)
            }
            CaptureError::BadFrameData(path) => {
                write!(f, "Captured frame data has unexpected size for {}", path.display())
            }
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Io(e) => Some(e),
            CaptureError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(e: std::io::Error) -> Self {
        CaptureError::Io(e)
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(e: image::ImageError) -> Self {
        CaptureError::Encode(e)
    }
}

/// Errors that can occur when running the presentation shell.
#[derive(Debug)]
pub enum ShellError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// Invalid run configuration.
    Config(ConfigError),
    /// GPU initialization failed.
    Gpu(RenderError),
    /// Frame export failed.
    Capture(CaptureError),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ShellError::Window(e) => write!(f, "Failed to create window: {}", e),
            ShellError::Config(e) => write!(f, "{}", e),
            ShellError::Gpu(e) => write!(f, "GPU error: {}", e),
            ShellError::Capture(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::EventLoop(e) => Some(e),
            ShellError::Window(e) => Some(e),
            ShellError::Config(e) => Some(e),
            ShellError::Gpu(e) => Some(e),
            ShellError::Capture(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for ShellError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ShellError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ShellError {
    fn from(e: winit::error::OsError) -> Self {
        ShellError::Window(e)
    }
}

impl From<ConfigError> for ShellError {
    fn from(e: ConfigError) -> Self {
        ShellError::Config(e)
    }
}

impl From<RenderError> for ShellError {
    fn from(e: RenderError) -> Self {
        ShellError::Gpu(e)
    }
}

impl From<CaptureError> for ShellError {
    fn from(e: CaptureError) -> Self {
        ShellError::Capture(e)
    }
}
