//! Frame acquisition behind a small video-source trait, so the scan
//! pipeline runs the same against a live camera wrapper or a still file.

use std::path::Path;

use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The source has not produced a frame yet. Callers retry rather
    /// than treating this as fatal.
    #[error("video source is not ready")]
    NotReady,
    #[error("failed to read source image: {0}")]
    Image(#[from] image::ImageError),
}

/// Something that can hand over RGBA frames.
///
/// `dimensions` reports `(0, 0)` until the source has a frame to give,
/// which is how warm-up is signalled.
pub trait VideoSource {
    fn dimensions(&self) -> (u32, u32);
    fn read_frame(&mut self) -> Result<RgbaImage, CaptureError>;
}

/// Grab one frame, refusing sources that are still warming up.
pub fn capture_frame(source: &mut dyn VideoSource) -> Result<RgbaImage, CaptureError> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::NotReady);
    }
    let frame = source.read_frame()?;
    debug!("Captured {}x{} frame", frame.width(), frame.height());
    Ok(frame)
}

/// A source backed by a single still image: a loaded photo, a test
/// fixture, or the latest frame some other layer pulled off a camera.
#[derive(Debug, Default)]
pub struct StillSource {
    picture: Option<RgbaImage>,
}

impl StillSource {
    /// A source with no frame yet; reads fail with `NotReady` until
    /// `set_picture` is called.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_image(picture: RgbaImage) -> Self {
        Self {
            picture: Some(picture),
        }
    }

    /// Load a photo from disk.
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let picture = image::open(path)?.to_rgba8();
        Ok(Self::from_image(picture))
    }

    pub fn set_picture(&mut self, picture: RgbaImage) {
        self.picture = Some(picture);
    }
}

impl VideoSource for StillSource {
    fn dimensions(&self) -> (u32, u32) {
        self.picture
            .as_ref()
            .map_or((0, 0), |p| (p.width(), p.height()))
    }

    fn read_frame(&mut self) -> Result<RgbaImage, CaptureError> {
        self.picture.clone().ok_or(CaptureError::NotReady)
    }
}
