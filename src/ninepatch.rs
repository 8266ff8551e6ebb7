//! Stretchable nine-patch masks.
//!
//! A nine-patch splits each axis of a bitmap into fixed segments, drawn at
//! their original size, and stretchable segments that absorb the rest of the
//! target extent. Corners stay crisp at any output size.
//!
//! ```text
//!     x_divs = [s0, e0]          y_divs = [s1, e1]
//!
//!          s0    e0
//!     ┌────┬──────┬────┐
//!     │ F  │  S   │ F  │
//!  s1 ├────┼──────┼────┤
//!     │ S  │  S   │ S  │      F = fixed, S = stretched
//!  e1 ├────┼──────┼────┤
//!     │ F  │  S   │ F  │
//!     └────┴──────┴────┘
//! ```
//!
//! Two encodings are accepted: the serialized chunk stored in compiled
//! `.9.png` files ([`NinePatchChunk`]) and the source-asset form with a
//! one-pixel marker border ([`NinePatch::from_bordered`]).

use alloc::vec::Vec;
use core::fmt;

use crate::geometry::Size;
use crate::pixmap::{Color, Pixmap};

/// Content padding declared by a nine-patch, in source pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Padding {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// Nine-patch decoding error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NinePatchError {
    /// Chunk is shorter than its header or declared payload.
    Truncated { expected: usize, actual: usize },
    /// Chunk carries the in-memory flag instead of the serialized layout.
    NotSerialized,
    /// A div list has an odd number of entries.
    OddDivCount,
    /// Div values are not in ascending order.
    DivsOutOfOrder,
    /// A div lies outside the bitmap.
    DivOutOfBounds { div: u32, extent: u32 },
    /// A div or padding value is negative.
    NegativeValue,
    /// Bordered bitmap is smaller than 3×3.
    TooSmall,
    /// Border pixel is neither transparent nor opaque black.
    InvalidMarker { x: u32, y: u32 },
    /// A div or color list is too long for its one-byte chunk count.
    TooManyEntries { count: usize },
    /// The content bitmap could not be allocated.
    AllocationFailed,
}

impl fmt::Display for NinePatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { expected, actual } => {
                write!(f, "nine-patch chunk truncated: need {expected} bytes, got {actual}")
            }
            Self::NotSerialized => f.write_str("nine-patch chunk is not in serialized form"),
            Self::OddDivCount => f.write_str("nine-patch div count is odd"),
            Self::DivsOutOfOrder => f.write_str("nine-patch divs are not ascending"),
            Self::DivOutOfBounds { div, extent } => {
                write!(f, "nine-patch div {div} exceeds bitmap extent {extent}")
            }
            Self::NegativeValue => f.write_str("nine-patch chunk holds a negative value"),
            Self::TooSmall => f.write_str("bordered nine-patch must be at least 3x3"),
            Self::InvalidMarker { x, y } => {
                write!(f, "invalid nine-patch marker pixel at ({x}, {y})")
            }
            Self::TooManyEntries { count } => {
                write!(f, "nine-patch chunk holds {count} entries in one list, limit is 255")
            }
            Self::AllocationFailed => f.write_str("nine-patch allocation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NinePatchError {}

/// Decoded nine-patch chunk: stretch regions, padding and region colors.
///
/// Serialized layout (big-endian):
///
/// ```text
///  0  u8   was_deserialized (must be 0)
///  1  u8   num_x_divs
///  2  u8   num_y_divs
///  3  u8   num_colors
///  4  u32  x_divs offset (reserved)
///  8  u32  y_divs offset (reserved)
/// 12  i32  padding left, right, top, bottom
/// 28  u32  colors offset (reserved)
/// 32  i32  x_divs[num_x_divs], y_divs[num_y_divs]
///     u32  colors[num_colors]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NinePatchChunk {
    pub x_divs: Vec<u32>,
    pub y_divs: Vec<u32>,
    pub padding: Padding,
    /// Per-region color hints. `1` means "not a solid color".
    pub colors: Vec<u32>,
}

const CHUNK_HEADER_LEN: usize = 32;

impl NinePatchChunk {
    /// Parse a serialized chunk.
    pub fn parse(bytes: &[u8]) -> Result<Self, NinePatchError> {
        if bytes.len() < CHUNK_HEADER_LEN {
            return Err(NinePatchError::Truncated {
                expected: CHUNK_HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != 0 {
            return Err(NinePatchError::NotSerialized);
        }
        let (nx, ny, nc) = (bytes[1] as usize, bytes[2] as usize, bytes[3] as usize);
        let expected = CHUNK_HEADER_LEN + 4 * (nx + ny + nc);
        if bytes.len() < expected {
            return Err(NinePatchError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        let word = |i: usize| {
            let o = i * 4;
            [bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]
        };
        let unsigned = |i: usize| -> Result<u32, NinePatchError> {
            u32::try_from(i32::from_be_bytes(word(i))).map_err(|_| NinePatchError::NegativeValue)
        };

        let padding = Padding {
            left: unsigned(3)?,
            right: unsigned(4)?,
            top: unsigned(5)?,
            bottom: unsigned(6)?,
        };
        let first = CHUNK_HEADER_LEN / 4;
        let x_divs = (first..first + nx)
            .map(unsigned)
            .collect::<Result<Vec<_>, _>>()?;
        let y_divs = (first + nx..first + nx + ny)
            .map(unsigned)
            .collect::<Result<Vec<_>, _>>()?;
        let colors = (first + nx + ny..first + nx + ny + nc)
            .map(|i| u32::from_be_bytes(word(i)))
            .collect();

        check_divs(&x_divs)?;
        check_divs(&y_divs)?;
        Ok(Self {
            x_divs,
            y_divs,
            padding,
            colors,
        })
    }

    /// Whether `bytes` holds a well-formed serialized chunk.
    pub fn is_chunk(bytes: &[u8]) -> bool {
        Self::parse(bytes).is_ok()
    }

    /// Serialize back into the chunk layout.
    ///
    /// Each list is limited to 255 entries by its one-byte count.
    pub fn to_bytes(&self) -> Result<Vec<u8>, NinePatchError> {
        let count = |len: usize| {
            u8::try_from(len).map_err(|_| NinePatchError::TooManyEntries { count: len })
        };
        let nx = count(self.x_divs.len())?;
        let ny = count(self.y_divs.len())?;
        let nc = count(self.colors.len())?;

        let mut out = Vec::with_capacity(
            CHUNK_HEADER_LEN + 4 * (self.x_divs.len() + self.y_divs.len() + self.colors.len()),
        );
        out.extend_from_slice(&[0, nx, ny, nc]);
        out.extend_from_slice(&[0; 8]);
        for v in [
            self.padding.left,
            self.padding.right,
            self.padding.top,
            self.padding.bottom,
        ] {
            out.extend_from_slice(&v.to_be_bytes());
        }
        out.extend_from_slice(&[0; 4]);
        for v in self.x_divs.iter().chain(&self.y_divs).chain(&self.colors) {
            out.extend_from_slice(&v.to_be_bytes());
        }
        Ok(out)
    }
}

/// A bitmap with stretchable regions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NinePatch {
    bitmap: Pixmap,
    x_divs: Vec<u32>,
    y_divs: Vec<u32>,
    padding: Padding,
}

impl NinePatch {
    /// Create a nine-patch from a bitmap and stretch regions.
    ///
    /// Each div list holds `[start, end)` pairs of stretchable pixels along
    /// its axis, ascending and within the bitmap. An empty list stretches the
    /// whole axis uniformly.
    pub fn new(
        bitmap: Pixmap,
        x_divs: Vec<u32>,
        y_divs: Vec<u32>,
    ) -> Result<Self, NinePatchError> {
        check_divs(&x_divs)?;
        check_divs(&y_divs)?;
        check_extent(&x_divs, bitmap.width())?;
        check_extent(&y_divs, bitmap.height())?;
        Ok(Self {
            bitmap,
            x_divs,
            y_divs,
            padding: Padding::default(),
        })
    }

    /// Create a nine-patch from a decoded bitmap and its chunk.
    pub fn from_chunk(bitmap: Pixmap, chunk: &NinePatchChunk) -> Result<Self, NinePatchError> {
        let np = Self::new(bitmap, chunk.x_divs.clone(), chunk.y_divs.clone())?;
        Ok(np.with_padding(chunk.padding))
    }

    /// Decode the source-asset form: content surrounded by a one-pixel border
    /// where opaque black marks stretch regions (top, left) and content
    /// padding (bottom, right).
    pub fn from_bordered(bordered: &Pixmap) -> Result<Self, NinePatchError> {
        let (w, h) = (bordered.width(), bordered.height());
        if w < 3 || h < 3 {
            return Err(NinePatchError::TooSmall);
        }
        let (cw, ch) = (w - 2, h - 2);

        let top = marker_runs((1..w - 1).map(|x| (x, 0)), bordered)?;
        let left = marker_runs((1..h - 1).map(|y| (0, y)), bordered)?;
        let bottom = marker_runs((1..w - 1).map(|x| (x, h - 1)), bordered)?;
        let right = marker_runs((1..h - 1).map(|y| (w - 1, y)), bordered)?;

        let mut content = Pixmap::new(cw, ch).ok_or(NinePatchError::AllocationFailed)?;
        for y in 0..ch {
            for x in 0..cw {
                if let Some(c) = bordered.pixel(x + 1, y + 1) {
                    content.set_pixel(x, y, c);
                }
            }
        }

        let padding = Padding {
            left: bottom.first().copied().unwrap_or(0),
            right: bottom.last().map_or(0, |&end| cw - end),
            top: right.first().copied().unwrap_or(0),
            bottom: right.last().map_or(0, |&end| ch - end),
        };
        Ok(Self::new(content, top, left)?.with_padding(padding))
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn bitmap(&self) -> &Pixmap {
        &self.bitmap
    }

    pub fn x_divs(&self) -> &[u32] {
        &self.x_divs
    }

    pub fn y_divs(&self) -> &[u32] {
        &self.y_divs
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Natural size: the bitmap without stretching.
    pub fn intrinsic_size(&self) -> Size {
        self.bitmap.size()
    }

    /// Smallest size at which every fixed segment keeps its source size.
    pub fn fixed_size(&self) -> Size {
        Size::new(
            fixed_total(&self.x_divs, self.bitmap.width()),
            fixed_total(&self.y_divs, self.bitmap.height()),
        )
    }

    /// Render at exactly `target`.
    ///
    /// Returns `None` for an empty target or when allocation fails.
    pub fn render(&self, target: Size) -> Option<Pixmap> {
        if target.is_empty() {
            return None;
        }
        let columns = axis_lookup(&self.x_divs, self.bitmap.width(), target.width);
        let rows = axis_lookup(&self.y_divs, self.bitmap.height(), target.height);

        let mut out = Pixmap::new(target.width, target.height)?;
        let src = self.bitmap.pixels();
        let src_w = self.bitmap.width() as usize;
        for (dst_row, &sy) in out.pixels_mut().chunks_exact_mut(target.width as usize).zip(&rows) {
            let src_row = &src[sy as usize * src_w..(sy as usize + 1) * src_w];
            for (dst, &sx) in dst_row.iter_mut().zip(&columns) {
                *dst = src_row[sx as usize];
            }
        }
        Some(out)
    }
}

fn check_divs(divs: &[u32]) -> Result<(), NinePatchError> {
    if divs.len() % 2 != 0 {
        return Err(NinePatchError::OddDivCount);
    }
    if divs.windows(2).any(|w| w[0] > w[1]) {
        return Err(NinePatchError::DivsOutOfOrder);
    }
    Ok(())
}

fn check_extent(divs: &[u32], extent: u32) -> Result<(), NinePatchError> {
    match divs.last() {
        Some(&div) if div > extent => Err(NinePatchError::DivOutOfBounds { div, extent }),
        _ => Ok(()),
    }
}

/// Collect marker runs along one border edge as `[start, end)` pairs
/// relative to the content area.
fn marker_runs(
    edge: impl Iterator<Item = (u32, u32)>,
    bordered: &Pixmap,
) -> Result<Vec<u32>, NinePatchError> {
    let mut divs = Vec::new();
    let mut inside = false;
    let mut i = 0;
    for (x, y) in edge {
        let c = bordered.pixel(x, y).unwrap_or(Color::TRANSPARENT);
        let marked = if c == Color::BLACK {
            true
        } else if c.is_transparent() {
            false
        } else {
            return Err(NinePatchError::InvalidMarker { x, y });
        };
        if marked != inside {
            divs.push(i);
            inside = marked;
        }
        i += 1;
    }
    if inside {
        divs.push(i);
    }
    Ok(divs)
}

/// One run of source pixels along an axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Segment {
    start: u32,
    end: u32,
    stretch: bool,
}

impl Segment {
    fn len(&self) -> u32 {
        self.end - self.start
    }
}

fn segments(divs: &[u32], extent: u32) -> Vec<Segment> {
    if divs.is_empty() {
        return alloc::vec![Segment {
            start: 0,
            end: extent,
            stretch: true,
        }];
    }
    let mut out = Vec::with_capacity(divs.len() + 1);
    let mut pos = 0;
    for pair in divs.chunks_exact(2) {
        let (start, end) = (pair[0].min(extent), pair[1].min(extent));
        if start > pos {
            out.push(Segment {
                start: pos,
                end: start,
                stretch: false,
            });
        }
        if end > start {
            out.push(Segment {
                start,
                end,
                stretch: true,
            });
        }
        pos = pos.max(end);
    }
    if pos < extent {
        out.push(Segment {
            start: pos,
            end: extent,
            stretch: false,
        });
    }
    out
}

fn fixed_total(divs: &[u32], extent: u32) -> u32 {
    segments(divs, extent)
        .iter()
        .filter(|s| !s.stretch)
        .map(Segment::len)
        .sum()
}

/// Map every destination index along one axis to a source index.
///
/// Fixed segments keep their size and stretch segments share the remaining
/// space in proportion to their source length. If the target is smaller
/// than the fixed total, or nothing stretches, all space goes to the fixed
/// segments proportionally instead.
fn axis_lookup(divs: &[u32], extent: u32, target: u32) -> Vec<u32> {
    let segs = segments(divs, extent);
    let fixed: u32 = segs.iter().filter(|s| !s.stretch).map(Segment::len).sum();
    let stretch: u32 = segs.iter().filter(|s| s.stretch).map(Segment::len).sum();

    let lengths: Vec<u32> = if stretch == 0 || target < fixed {
        distribute(&segs, |s| !s.stretch, target)
    } else {
        let flexible = distribute(&segs, |s| s.stretch, target - fixed);
        segs.iter()
            .zip(flexible)
            .map(|(s, n)| if s.stretch { n } else { s.len() })
            .collect()
    };

    let mut lookup = Vec::with_capacity(target as usize);
    for (seg, dst_len) in segs.iter().zip(lengths) {
        let src_len = seg.len() as u64;
        let dst_len = dst_len as u64;
        // Sample the source pixel under each destination pixel center.
        lookup.extend(
            (0..dst_len).map(|d| seg.start + ((2 * d + 1) * src_len / (2 * dst_len)) as u32),
        );
    }
    lookup
}

/// Split `space` among the segments selected by `take`, proportional to
/// their source length. Cumulative rounding keeps the total exact.
fn distribute(segs: &[Segment], take: impl Fn(&Segment) -> bool, space: u32) -> Vec<u32> {
    let total: u64 = segs.iter().filter(|&s| take(s)).map(|s| s.len() as u64).sum();
    let mut out = Vec::with_capacity(segs.len());
    let mut cum_src = 0u64;
    let mut placed = 0u64;
    for s in segs {
        if !take(s) || total == 0 {
            out.push(0);
            continue;
        }
        cum_src += s.len() as u64;
        let end = (cum_src * space as u64 + total / 2) / total;
        out.push((end - placed) as u32);
        placed = end;
    }
    out
}
