//! Frame export for video assembly.
//!
//! Writes captured frames as a numbered PNG sequence
//! (`img_0000.png`, `img_0001.png`, ...) into a per-mode output directory.
//! The directory is cleared at startup so a run always produces a clean
//! sequence.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::CaptureError;
use crate::render::FramePixels;

/// Default number of frames to export: 30 seconds at 60 fps.
pub const DEFAULT_FRAME_COUNT: u32 = 1800;

/// Writes a bounded sequence of frames to an output directory.
pub struct FrameRecorder {
    dir: PathBuf,
    frame: u32,
    total: u32,
}

impl FrameRecorder {
    /// Create a recorder targeting `dir`, clearing any previous contents.
    pub fn new(dir: impl Into<PathBuf>, total: u32) -> Result<Self, CaptureError> {
        let dir = dir.into();
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            frame: 0,
            total,
        })
    }

    /// Default output directory for a mode: `render_<mode>`.
    pub fn default_dir(mode_name: &str) -> PathBuf {
        PathBuf::from(format!("render_{}", mode_name))
    }

    /// Encode and write one frame; alpha is dropped, matching the RGB
    /// output of the reference renderer.
    ///
    /// Returns `true` while more frames are wanted, `false` once the
    /// sequence is complete.
    pub fn save(&mut self, frame: &FramePixels) -> Result<bool, CaptureError> {
        let path = self.frame_path(self.frame);

        let mut rgb = Vec::with_capacity(frame.rgba.len() / 4 * 3);
        for px in frame.rgba.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }

        let img = RgbImage::from_raw(frame.width, frame.height, rgb)
            .ok_or_else(|| CaptureError::BadFrameData(path.clone()))?;

        println!("Rendering img {}/{}", self.frame + 1, self.total);
        img.save(&path)?;

        self.frame += 1;
        Ok(self.frame < self.total)
    }

    fn frame_path(&self, frame: u32) -> PathBuf {
        self.dir.join(format!("img_{:04}.png", frame))
    }

    /// Frames written so far.
    #[inline]
    pub fn frames_written(&self) -> u32 {
        self.frame
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
