//! Decoded video frames and the sources that produce them.

mod ffmpeg;

use anyhow::Result;
use std::fmt;
use std::sync::Arc;

pub use ffmpeg::{probe_geometry, FfmpegFrameSource, VideoGeometry};

/// Bytes per pixel in the RGB24 layout ffmpeg is asked to emit.
pub const RGB_CHANNELS: usize = 3;

/// Sequential provider of frames, consumed front to back exactly once.
pub trait FrameSource {
    type Frame: Clone;

    /// Decode the next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>>;

    /// Free the underlying decoder. Must be safe to call more than once.
    fn release(&mut self) {}
}

/// One decoded RGB24 image. Clones share the pixel storage.
#[derive(Clone)]
pub struct VideoFrame {
    index: u64,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl VideoFrame {
    pub fn new(index: u64, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * RGB_CHANNELS);
        Self {
            index,
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// Zero-based position of the frame in decode order.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGB value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * RGB_CHANNELS;
        self.pixels
            .get(offset..offset + RGB_CHANNELS)
            .map(|rgb| [rgb[0], rgb[1], rgb[2]])
    }

    /// True when both values are clones of the same decoded frame.
    pub fn same_as(&self, other: &VideoFrame) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl PartialEq for VideoFrame {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.same_as(other)
    }
}

impl Eq for VideoFrame {}

impl fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrame")
            .field("index", &self.index)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
