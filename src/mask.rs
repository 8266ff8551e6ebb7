//! Alpha masks and destination-in compositing.

use alloc::borrow::Cow;

use log::warn;

use crate::geometry::Size;
use crate::ninepatch::{NinePatch, NinePatchChunk};
use crate::pixmap::{Color, Pixmap, PixmapError};

/// Shape applied to a rendered image through its alpha channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mask {
    /// Plain bitmap, combined at the top-left corner without scaling.
    Bitmap(Pixmap),
    /// Stretchable mask, rendered to the exact canvas size first.
    NinePatch(NinePatch),
}

impl Mask {
    /// Build a mask from a decoded bitmap and the nine-patch chunk that
    /// came with it, if any.
    ///
    /// A malformed chunk is ignored and the bitmap is used as a plain mask.
    pub fn from_decoded(bitmap: Pixmap, chunk: Option<&[u8]>) -> Self {
        let Some(bytes) = chunk else {
            return Self::Bitmap(bitmap);
        };
        match NinePatchChunk::parse(bytes) {
            Ok(chunk) => match NinePatch::from_chunk(bitmap.clone(), &chunk) {
                Ok(np) => Self::NinePatch(np),
                Err(e) => {
                    warn!("nine-patch chunk does not fit mask bitmap, using plain mask: {e}");
                    Self::Bitmap(bitmap)
                }
            },
            Err(e) => {
                warn!("ignoring malformed nine-patch chunk: {e}");
                Self::Bitmap(bitmap)
            }
        }
    }

    pub fn is_stretchable(&self) -> bool {
        matches!(self, Self::NinePatch(_))
    }

    /// The mask pixels to combine with a canvas of `size`.
    ///
    /// Plain bitmaps are borrowed as-is; nine-patches are rendered to
    /// exactly `size`.
    pub fn layer(&self, size: Size) -> Result<Cow<'_, Pixmap>, PixmapError> {
        match self {
            Self::Bitmap(bmp) => Ok(Cow::Borrowed(bmp)),
            Self::NinePatch(np) => {
                if size.is_empty() {
                    return Err(PixmapError::ZeroDimension);
                }
                np.render(size)
                    .map(Cow::Owned)
                    .ok_or(PixmapError::AllocationFailed)
            }
        }
    }

    /// Mask `dst` in place with destination-in blending.
    pub fn apply(&self, dst: &mut Pixmap) -> Result<(), PixmapError> {
        let layer = self.layer(dst.size())?;
        dst_in(dst, &layer);
        Ok(())
    }
}

/// Destination-in: keep `dst` color, multiply its alpha by the mask alpha.
///
/// The mask is aligned at (0, 0). Pixels of `dst` outside the mask are left
/// untouched.
pub fn dst_in(dst: &mut Pixmap, mask: &Pixmap) {
    let w = dst.width().min(mask.width()) as usize;
    let h = dst.height().min(mask.height());
    let dst_w = dst.width() as usize;
    let mask_w = mask.width() as usize;
    let (dst_px, mask_px) = (dst.pixels_mut(), mask.pixels());
    for y in 0..h as usize {
        let d = &mut dst_px[y * dst_w..y * dst_w + w];
        let m = &mask_px[y * mask_w..y * mask_w + w];
        for (p, mp) in d.iter_mut().zip(m) {
            let a = mul_div255(p.a, mp.a);
            *p = if a == 0 {
                Color::TRANSPARENT
            } else {
                Color { a, ..*p }
            };
        }
    }
}

/// `a * b / 255`, rounded.
#[inline]
fn mul_div255(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 128;
    ((t + (t >> 8)) >> 8) as u8
}
