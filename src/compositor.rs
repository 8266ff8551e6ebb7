//! Center-crop rendering with mask compositing and output reuse.
//!
//! # Example
//!
//! ```
//! use chatimage::{Color, Compositor, Mask, Pixmap};
//!
//! let photo = Pixmap::filled(100, 50, Color::WHITE).unwrap();
//! let mask = Mask::Bitmap(Pixmap::filled(60, 60, Color::BLACK).unwrap());
//!
//! let mut compositor = Compositor::new();
//! let out = compositor.render(Some(&photo), Some(&mask), 60, 60).unwrap();
//! assert_eq!((out.width(), out.height()), (60, 60));
//!
//! // Unknown layout: nothing is redrawn, the previous output stays.
//! assert!(compositor.render(Some(&photo), Some(&mask), 0, 60).is_some());
//! ```

use log::{debug, trace, warn};

use crate::geometry::{CenterCrop, Size};
use crate::mask::{Mask, dst_in};
use crate::pixmap::{FilterQuality, Pixmap};

/// Renders source images center-cropped into a canvas and masks them.
///
/// Owns the output buffer and reuses it while the canvas size is unchanged.
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    output: Option<Pixmap>,
    filter: FilterQuality,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling used when scaling the source.
    pub fn filter(mut self, filter: FilterQuality) -> Self {
        self.filter = filter;
        self
    }

    /// Render `source` into a `width × height` canvas and apply `mask`.
    ///
    /// The source is scaled uniformly to cover the canvas and centered, so
    /// the overflowing axis is cropped. Nine-patch masks are stretched to the
    /// canvas; bitmap masks are applied at the top-left corner unscaled.
    ///
    /// With a zero dimension or no source the call does nothing and the
    /// previous output, if any, is returned unchanged.
    pub fn render(
        &mut self,
        source: Option<&Pixmap>,
        mask: Option<&Mask>,
        width: u32,
        height: u32,
    ) -> Option<&Pixmap> {
        self.draw(source, mask, width, height);
        self.output.as_ref()
    }

    /// Like [`render`](Self::render), but reports whether a new frame was
    /// drawn. `false` means the previous output was left as it was.
    pub fn draw(
        &mut self,
        source: Option<&Pixmap>,
        mask: Option<&Mask>,
        width: u32,
        height: u32,
    ) -> bool {
        let target = Size::new(width, height);
        let Some(source) = source else {
            debug!("render skipped: no source image");
            return false;
        };
        let placement = match CenterCrop::compute(source.size(), target) {
            Ok(p) => p,
            Err(e) => {
                debug!("render deferred for {width}x{height}: {e}");
                return false;
            }
        };
        trace!(
            "center-crop {}x{} -> {width}x{height}: scale {:.4}, offset {:?}",
            source.width(),
            source.height(),
            placement.scale,
            placement.offset
        );

        // Resolve the mask before touching the output so a failure leaves it intact.
        let layer = match mask.map(|m| m.layer(target)).transpose() {
            Ok(layer) => layer,
            Err(e) => {
                warn!("render skipped: mask unavailable at {width}x{height}: {e}");
                return false;
            }
        };

        let mut canvas = match self.output.take() {
            Some(mut reused) if reused.size() == target => {
                reused.clear();
                reused
            }
            previous => match Pixmap::new(width, height) {
                Some(fresh) => {
                    debug!("allocated {width}x{height} output buffer");
                    fresh
                }
                None => {
                    warn!("render skipped: cannot allocate {width}x{height} output buffer");
                    self.output = previous;
                    return false;
                }
            },
        };

        canvas.draw_scaled(source, placement.scale, placement.offset, self.filter);
        if let Some(layer) = &layer {
            dst_in(&mut canvas, layer);
        }
        self.output = Some(canvas);
        true
    }

    /// The most recent output.
    pub fn output(&self) -> Option<&Pixmap> {
        self.output.as_ref()
    }

    /// Drop the output buffer.
    pub fn reset(&mut self) {
        self.output = None;
    }
}
