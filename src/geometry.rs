//! Pixel geometry and center-crop placement.
//!
//! Computes where a source image lands on a fixed-size canvas when it is
//! scaled to fill the canvas and the overflow is cropped. Pure geometry, no
//! pixel access.
//!
//! # Example
//!
//! ```
//! use chatimage::{CenterCrop, Rect, Size};
//!
//! let crop = CenterCrop::compute(Size::new(100, 50), Size::new(60, 60)).unwrap();
//!
//! // Height constrains: 100×50 scales to 120×60, centered horizontally.
//! assert_eq!(crop.offset, (-30, 0));
//! assert_eq!(crop.visible_source(), Rect::new(25, 0, 50, 50));
//! ```

use core::fmt;

use num_traits::Float;

/// Width × height dimensions in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels, or `None` if it does not fit in `usize`.
    pub fn area(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrink this rect to lie inside a `max_w × max_h` image.
    ///
    /// Never returns an empty rect, so a crop always keeps at least one
    /// source pixel.
    pub fn clamp_to(self, max_w: u32, max_h: u32) -> Self {
        let x = self.x.min(max_w.saturating_sub(1));
        let y = self.y.min(max_h.saturating_sub(1));
        let w = self.width.min(max_w.saturating_sub(x)).max(1);
        let h = self.height.min(max_h.saturating_sub(y)).max(1);
        Self {
            x,
            y,
            width: w,
            height: h,
        }
    }

    /// Whether this rect is the whole `width × height` image.
    pub fn is_full(&self, width: u32, height: u32) -> bool {
        (self.x, self.y) == (0, 0) && Size::new(self.width, self.height) == Size::new(width, height)
    }
}

/// Placement of a source image scaled to fill a target canvas.
///
/// The scale is uniform and chosen so the scaled source covers the whole
/// canvas: `scale = max(target_w / source_w, target_h / source_h)`. The
/// overflowing axis is centered, so its offset is zero or negative.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CenterCrop {
    /// Source image dimensions.
    pub source: Size,
    /// Canvas dimensions.
    pub target: Size,
    /// Uniform scale factor applied to the source.
    pub scale: f64,
    /// Top-left of the scaled source on the canvas, rounded to whole pixels.
    pub offset: (i32, i32),
}

impl CenterCrop {
    /// Compute the placement of `source` on a `target` canvas.
    pub fn compute(source: Size, target: Size) -> Result<Self, LayoutError> {
        if source.is_empty() {
            return Err(LayoutError::ZeroSourceDimension);
        }
        if target.is_empty() {
            return Err(LayoutError::ZeroTargetDimension);
        }

        let (sw, sh) = (source.width as f64, source.height as f64);
        let (tw, th) = (target.width as f64, target.height as f64);

        // Cross-multiplication so equal aspect ratios compare exactly.
        let source_wider =
            source.width as u64 * target.height as u64 > target.width as u64 * source.height as u64;
        let (scale, dx, dy) = if source_wider {
            let scale = th / sh;
            (scale, (tw - sw * scale) * 0.5, 0.0)
        } else {
            let scale = tw / sw;
            (scale, 0.0, (th - sh * scale) * 0.5)
        };

        Ok(Self {
            source,
            target,
            scale,
            offset: (round_offset(dx), round_offset(dy)),
        })
    }

    /// Dimensions of the source after scaling, before cropping.
    pub fn scaled(&self) -> (f64, f64) {
        (
            self.source.width as f64 * self.scale,
            self.source.height as f64 * self.scale,
        )
    }

    /// Whether the canvas shows the whole source (aspect ratios match).
    pub fn is_uncropped(&self) -> bool {
        self.visible_source()
            .is_full(self.source.width, self.source.height)
    }

    /// Region of the source that lands on the canvas.
    pub fn visible_source(&self) -> Rect {
        let (x0, x1) = visible_span(self.offset.0, self.target.width, self.scale);
        let (y0, y1) = visible_span(self.offset.1, self.target.height, self.scale);
        Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
            .clamp_to(self.source.width, self.source.height)
    }
}

/// Absorbs float error so exact pixel boundaries do not spill into a neighbour.
const SPAN_EPSILON: f64 = 1e-9;

/// Source-space span `[start, end)` covered by `0..extent` on the canvas.
fn visible_span(offset: i32, extent: u32, scale: f64) -> (u32, u32) {
    let start = Float::floor(-(offset as f64) / scale + SPAN_EPSILON).max(0.0);
    let end = Float::ceil((extent as f64 - offset as f64) / scale - SPAN_EPSILON).max(0.0);
    (start as u32, end as u32)
}

/// Round to the nearest whole pixel, halves toward positive infinity.
fn round_offset(v: f64) -> i32 {
    Float::floor(v + 0.5) as i32
}

/// Layout computation error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Source image has zero width or height.
    ZeroSourceDimension,
    /// Target width or height is zero.
    ZeroTargetDimension,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSourceDimension => f.write_str("source image has a zero dimension"),
            Self::ZeroTargetDimension => f.write_str("target canvas has a zero dimension"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayoutError {}
