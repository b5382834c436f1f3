//! Image representation for the zonal balancer.

use image::{ColorType, DynamicImage, RgbImage, RgbaImage};
use std::fmt;

use crate::error::{BalanceError, Result};

/// Interleaved channel layout of an 8-bit image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, straight alpha.
    Rgba,
}

impl ChannelLayout {
    /// Samples per pixel.
    pub const fn channels(&self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub const fn has_alpha(&self) -> bool {
        matches!(self, Self::Rgba)
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb => write!(f, "RGB"),
            Self::Rgba => write!(f, "RGBA"),
        }
    }
}

/// Decoded 8-bit image, row-major, origin top-left.
///
/// The buffer always holds exactly `width * height * channels` samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneImage {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Vec<u8>,
}

impl ZoneImage {
    /// Black (and fully transparent, for RGBA) image.
    pub fn new(width: u32, height: u32, layout: ChannelLayout) -> Self {
        let len = width as usize * height as usize * layout.channels();
        Self {
            width,
            height,
            layout,
            data: vec![0; len],
        }
    }

    /// Every pixel set to `pixel`. Only the first `layout.channels()` values are used.
    pub fn filled(width: u32, height: u32, layout: ChannelLayout, pixel: [u8; 4]) -> Self {
        let cn = layout.channels();
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * cn);
        for _ in 0..count {
            data.extend_from_slice(&pixel[..cn]);
        }
        Self {
            width,
            height,
            layout,
            data,
        }
    }

    /// Wrap an existing interleaved buffer.
    pub fn from_raw(width: u32, height: u32, layout: ChannelLayout, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(BalanceError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Normalize a decoded image to RGB or RGBA.
    ///
    /// RGBA color types (any depth) keep their alpha, narrowed to 8 bits.
    /// Everything else, including luma + alpha, becomes RGB with alpha dropped.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        match img.color() {
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => {
                let rgba = img.to_rgba8();
                let (width, height) = rgba.dimensions();
                Self {
                    width,
                    height,
                    layout: ChannelLayout::Rgba,
                    data: rgba.into_raw(),
                }
            }
            _ => {
                let rgb = img.to_rgb8();
                let (width, height) = rgb.dimensions();
                Self {
                    width,
                    height,
                    layout: ChannelLayout::Rgb,
                    data: rgb.into_raw(),
                }
            }
        }
    }

    /// Hand the pixels back to the `image` crate for encoding.
    pub fn into_dynamic(self) -> Result<DynamicImage> {
        let (width, height) = (self.width, self.height);
        let expected = self.pixel_count() * self.channels();
        let actual = self.data.len();
        let img = match self.layout {
            ChannelLayout::Rgb => RgbImage::from_raw(width, height, self.data).map(DynamicImage::ImageRgb8),
            ChannelLayout::Rgba => {
                RgbaImage::from_raw(width, height, self.data).map(DynamicImage::ImageRgba8)
            }
        };
        img.ok_or(BalanceError::BufferSize { expected, actual })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Interleaved samples.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Samples of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let cn = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * cn;
        Some(&self.data[start..start + cn])
    }

    /// Alpha samples in pixel order, or `None` for RGB.
    pub fn alpha(&self) -> Option<Vec<u8>> {
        if !self.layout.has_alpha() {
            return None;
        }
        Some(self.data.chunks_exact(4).map(|px| px[3]).collect())
    }
}
