//! Owned RGBA8 pixel buffers.
//!
//! Pixels are straight (non-premultiplied) alpha, stored row-major from the
//! top-left corner with no row padding. Allocation is fallible: running out
//! of memory yields `None` instead of aborting.

use alloc::vec::Vec;
use core::fmt;

use num_traits::Float;

use crate::geometry::Size;

/// A straight-alpha RGBA color, 8 bits per channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Transparent black `[0, 0, 0, 0]`.
    pub const TRANSPARENT: Self = Self::from_rgba8(0, 0, 0, 0);
    /// Black, fully opaque.
    pub const BLACK: Self = Self::from_rgba8(0, 0, 0, 255);
    /// White, fully opaque.
    pub const WHITE: Self = Self::from_rgba8(255, 255, 255, 255);

    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a `0xAARRGGBB` color, the layout used by `ARGB_8888` hosts.
    pub const fn from_argb32(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into `0xAARRGGBB`.
    pub const fn to_argb32(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

/// Sampling used when a bitmap is drawn at a different scale.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterQuality {
    /// Nearest source pixel. Matches a paint without bitmap filtering.
    #[default]
    Nearest,
    /// Bilinear interpolation, weighted by alpha.
    Bilinear,
}

/// Pixel buffer construction error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixmapError {
    /// Width or height is zero.
    ZeroDimension,
    /// Pixel data length does not match `width × height`.
    LengthMismatch { expected: usize, actual: usize },
    /// The buffer could not be allocated.
    AllocationFailed,
}

impl fmt::Display for PixmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension => f.write_str("pixmap has a zero dimension"),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} pixel values, got {actual}")
            }
            Self::AllocationFailed => f.write_str("pixmap allocation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PixmapError {}

/// An owned RGBA8 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pixmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Pixmap {
    /// Allocate a fully transparent buffer.
    ///
    /// Returns `None` for a zero dimension or when the allocation fails.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Allocate a buffer filled with one color.
    pub fn filled(width: u32, height: u32, color: Color) -> Option<Self> {
        let len = Size::new(width, height).area().filter(|&n| n > 0)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).ok()?;
        data.resize(len, color);
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap existing pixel data.
    pub fn from_vec(width: u32, height: u32, data: Vec<Color>) -> Result<Self, PixmapError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(PixmapError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build from tightly packed straight-alpha RGBA bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, PixmapError> {
        let expected = checked_len(width, height)?;
        if bytes.len() != expected.saturating_mul(4) {
            return Err(PixmapError::LengthMismatch {
                expected: expected.saturating_mul(4),
                actual: bytes.len(),
            });
        }
        let mut data = Vec::new();
        data.try_reserve_exact(expected)
            .map_err(|_| PixmapError::AllocationFailed)?;
        data.extend(
            bytes
                .chunks_exact(4)
                .map(|p| Color::from_rgba8(p[0], p[1], p[2], p[3])),
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Tightly packed straight-alpha RGBA bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|c| [c.r, c.g, c.b, c.a])
            .collect()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[Color] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.data
    }

    /// One row of pixels, or `None` past the bottom edge.
    pub fn row(&self, y: u32) -> Option<&[Color]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        self.data.get(start..start + self.width as usize)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x, y).map(|i| self.data[i])
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut Color> {
        self.index(x, y).map(|i| &mut self.data[i])
    }

    /// Write one pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(p) = self.pixel_mut(x, y) {
            *p = color;
        }
    }

    pub fn fill(&mut self, color: Color) {
        self.data.fill(color);
    }

    /// Reset every pixel to fully transparent.
    pub fn clear(&mut self) {
        self.fill(Color::TRANSPARENT);
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Draw `src` scaled uniformly by `scale` with its top-left at `offset`.
    ///
    /// Covered pixels are replaced (source-copy). Pixels whose center falls
    /// outside the scaled source are left as they are.
    pub fn draw_scaled(
        &mut self,
        src: &Pixmap,
        scale: f64,
        offset: (i32, i32),
        filter: FilterQuality,
    ) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        let columns: Vec<Option<f64>> = (0..self.width)
            .map(|x| source_coord(x, offset.0, scale, src.width))
            .collect();

        for y in 0..self.height {
            let Some(sy) = source_coord(y, offset.1, scale, src.height) else {
                continue;
            };
            let row_start = y as usize * self.width as usize;
            let row = &mut self.data[row_start..row_start + self.width as usize];
            for (dst, sx) in row.iter_mut().zip(&columns) {
                let Some(sx) = *sx else { continue };
                *dst = match filter {
                    FilterQuality::Nearest => src.nearest(sx, sy),
                    FilterQuality::Bilinear => src.bilinear(sx, sy),
                };
            }
        }
    }

    fn nearest(&self, sx: f64, sy: f64) -> Color {
        let x = (Float::floor(sx) as u32).min(self.width - 1);
        let y = (Float::floor(sy) as u32).min(self.height - 1);
        self.data[y as usize * self.width as usize + x as usize]
    }

    fn bilinear(&self, sx: f64, sy: f64) -> Color {
        let (x0, x1, fx) = bilinear_taps(sx, self.width);
        let (y0, y1, fy) = bilinear_taps(sy, self.height);
        let at = |x: u32, y: u32| self.data[y as usize * self.width as usize + x as usize];
        let taps = [
            (at(x0, y0), (1.0 - fx) * (1.0 - fy)),
            (at(x1, y0), fx * (1.0 - fy)),
            (at(x0, y1), (1.0 - fx) * fy),
            (at(x1, y1), fx * fy),
        ];

        // Interpolate premultiplied so transparent neighbours do not bleed color.
        let mut acc = [0.0f64; 4];
        for (c, w) in taps {
            let a = c.a as f64 * w;
            acc[0] += c.r as f64 * a;
            acc[1] += c.g as f64 * a;
            acc[2] += c.b as f64 * a;
            acc[3] += a;
        }
        if acc[3] <= 0.0 {
            return Color::TRANSPARENT;
        }
        let unpremul = |v: f64| Float::round(v / acc[3]).clamp(0.0, 255.0) as u8;
        Color::from_rgba8(
            unpremul(acc[0]),
            unpremul(acc[1]),
            unpremul(acc[2]),
            Float::round(acc[3]).clamp(0.0, 255.0) as u8,
        )
    }
}

fn checked_len(width: u32, height: u32) -> Result<usize, PixmapError> {
    let size = Size::new(width, height);
    if size.is_empty() {
        return Err(PixmapError::ZeroDimension);
    }
    size.area().ok_or(PixmapError::AllocationFailed)
}

/// Source-space coordinate sampled by destination pixel `d`, or `None`
/// when the pixel center lies outside the scaled source.
fn source_coord(d: u32, offset: i32, scale: f64, extent: u32) -> Option<f64> {
    let s = (d as f64 + 0.5 - offset as f64) / scale;
    (s >= 0.0 && s < extent as f64).then_some(s)
}

/// Neighbouring pixel indices and the weight of the second one.
fn bilinear_taps(s: f64, extent: u32) -> (u32, u32, f64) {
    let center = (s - 0.5).max(0.0);
    let i0 = (Float::floor(center) as u32).min(extent - 1);
    let i1 = (i0 + 1).min(extent - 1);
    let frac = if i1 == i0 { 0.0 } else { center - i0 as f64 };
    (i0, i1, frac)
}
