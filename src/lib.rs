//! Chat bubble image compositing: center-crop a picture into a fixed-size
//! canvas and cut it to a bubble shape with an alpha mask.
//!
//! CPU-only pixel work on RGBA8 buffers, `no_std` + `alloc` compatible.
//!
//! # Modules
//!
//! - [`geometry`] — Sizes, rects and center-crop placement
//! - [`pixmap`] — RGBA8 pixel buffers and scaled drawing
//! - [`ninepatch`] — Stretchable masks, chunk parsing, border decoding
//! - [`mask`] — Mask variants and destination-in blending
//! - [`drawable`] — Image-like inputs collapsed to pixel buffers
//! - [`compositor`] — Rendering with output buffer reuse
//! - [`view`] — Host-facing view: mask config, current image, size changes
//!
//! # Example
//!
//! ```
//! use chatimage::{Color, Compositor, Mask, NinePatch, Pixmap};
//!
//! // 3×3 bubble with cut corners; the middle row and column stretch.
//! let mut shape = Pixmap::filled(3, 3, Color::WHITE).unwrap();
//! shape.set_pixel(0, 0, Color::TRANSPARENT);
//! let mask = Mask::NinePatch(NinePatch::new(shape, vec![1, 2], vec![1, 2]).unwrap());
//!
//! let photo = Pixmap::filled(640, 480, Color::from_rgba8(30, 90, 200, 255)).unwrap();
//! let mut compositor = Compositor::new();
//! let bubble = compositor.render(Some(&photo), Some(&mask), 48, 48).unwrap();
//!
//! assert!(bubble.pixel(0, 0).unwrap().is_transparent());
//! assert!(bubble.pixel(24, 24).unwrap().is_opaque());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod compositor;
pub mod drawable;
pub mod geometry;
pub mod mask;
pub mod ninepatch;
pub mod pixmap;
pub mod view;

pub use compositor::Compositor;
pub use drawable::{Drawable, Rasterize, extract_bitmap};
pub use geometry::{CenterCrop, LayoutError, Rect, Size};
pub use mask::{Mask, dst_in};
pub use ninepatch::{NinePatch, NinePatchChunk, NinePatchError, Padding};
pub use pixmap::{Color, FilterQuality, Pixmap, PixmapError};
pub use view::{ChatImageView, ResourceId, Resources, ViewConfig};
