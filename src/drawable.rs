//! Image-like inputs and their conversion to pixel buffers.

use alloc::sync::Arc;
use core::fmt;

use log::debug;

use crate::geometry::Size;
use crate::ninepatch::NinePatch;
use crate::pixmap::{Color, Pixmap};

/// Something that can paint itself into a pixel buffer.
pub trait Rasterize: Send + Sync {
    /// Natural size, or `None` if the content has no intrinsic dimensions.
    fn intrinsic_size(&self) -> Option<Size>;

    /// Paint into `canvas`, covering its full bounds.
    fn draw(&self, canvas: &mut Pixmap);
}

/// An image-like input accepted as the current image.
#[derive(Clone)]
pub enum Drawable {
    /// A ready pixel buffer.
    Bitmap(Arc<Pixmap>),
    /// A solid color fill.
    Color(Color),
    /// A stretchable bitmap, drawn at its intrinsic size.
    NinePatch(Arc<NinePatch>),
    /// Host-provided content.
    Custom(Arc<dyn Rasterize>),
}

impl fmt::Debug for Drawable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitmap(bmp) => f.debug_tuple("Bitmap").field(bmp).finish(),
            Self::Color(c) => f.debug_tuple("Color").field(c).finish(),
            Self::NinePatch(np) => f.debug_tuple("NinePatch").field(&np.intrinsic_size()).finish(),
            Self::Custom(r) => f.debug_tuple("Custom").field(&r.intrinsic_size()).finish(),
        }
    }
}

impl From<Pixmap> for Drawable {
    fn from(bmp: Pixmap) -> Self {
        Self::Bitmap(Arc::new(bmp))
    }
}

impl From<Arc<Pixmap>> for Drawable {
    fn from(bmp: Arc<Pixmap>) -> Self {
        Self::Bitmap(bmp)
    }
}

impl From<Color> for Drawable {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl Rasterize for NinePatch {
    fn intrinsic_size(&self) -> Option<Size> {
        Some(NinePatch::intrinsic_size(self))
    }

    fn draw(&self, canvas: &mut Pixmap) {
        if let Some(rendered) = self.render(canvas.size()) {
            *canvas = rendered;
        }
    }
}

/// Side length of the buffer produced for a solid color.
const COLOR_BITMAP_SIDE: u32 = 2;

/// Convert an image-like input into a pixel buffer.
///
/// Bitmaps are returned as-is without copying. Solid colors become a 2×2
/// buffer. Anything else is rasterized at its intrinsic size. Missing input,
/// content without a usable size, and allocation failure all yield `None`.
pub fn extract_bitmap(drawable: Option<&Drawable>) -> Option<Arc<Pixmap>> {
    let drawable = drawable?;
    let rasterizer: &dyn Rasterize = match drawable {
        Drawable::Bitmap(bmp) => return Some(Arc::clone(bmp)),
        Drawable::Color(color) => {
            let bmp = Pixmap::filled(COLOR_BITMAP_SIDE, COLOR_BITMAP_SIDE, *color);
            if bmp.is_none() {
                debug!("color bitmap allocation failed");
            }
            return bmp.map(Arc::new);
        }
        Drawable::NinePatch(np) => &**np,
        Drawable::Custom(r) => &**r,
    };
    rasterize(rasterizer).map(Arc::new)
}

fn rasterize(content: &dyn Rasterize) -> Option<Pixmap> {
    let Some(size) = content.intrinsic_size().filter(|s| !s.is_empty()) else {
        debug!("drawable has no intrinsic size, nothing to rasterize");
        return None;
    };
    let Some(mut canvas) = Pixmap::new(size.width, size.height) else {
        debug!(
            "rasterizing {}x{} drawable failed: out of memory",
            size.width, size.height
        );
        return None;
    };
    content.draw(&mut canvas);
    Some(canvas)
}
