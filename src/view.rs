//! Host-facing image view: a mask configured once, a settable current
//! image, size notifications, and the composited result for display.

use alloc::sync::Arc;
use core::num::NonZeroU32;

use log::{debug, warn};

use crate::compositor::Compositor;
use crate::drawable::{Drawable, extract_bitmap};
use crate::geometry::Size;
use crate::mask::Mask;
use crate::pixmap::{FilterQuality, Pixmap};

/// Identifier of a host resource. Zero is not a valid id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(NonZeroU32);

impl ResourceId {
    /// `None` for `0`, which means "no resource".
    pub const fn new(id: u32) -> Option<Self> {
        match NonZeroU32::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

/// Resource lookup provided by the host.
///
/// Decoding is the host's job; these return ready-to-use values.
pub trait Resources {
    /// The mask stored under `id`.
    fn mask(&self, id: ResourceId) -> Option<Mask>;

    /// The image stored under `id`.
    fn drawable(&self, id: ResourceId) -> Option<Drawable>;
}

impl<R: Resources + ?Sized> Resources for &R {
    fn mask(&self, id: ResourceId) -> Option<Mask> {
        (**self).mask(id)
    }

    fn drawable(&self, id: ResourceId) -> Option<Drawable> {
        (**self).drawable(id)
    }
}

/// View configuration, typically read once from a layout definition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewConfig {
    pub mask: Option<ResourceId>,
    pub filter: FilterQuality,
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask resource. `None` disables masking.
    pub fn mask(mut self, mask: Option<ResourceId>) -> Self {
        self.mask = mask;
        self
    }

    pub fn filter(mut self, filter: FilterQuality) -> Self {
        self.filter = filter;
        self
    }
}

/// An image view that shows its current image center-cropped and masked.
///
/// Every trigger (new image, size change) re-renders synchronously.
#[derive(Debug)]
pub struct ChatImageView<R> {
    resources: R,
    mask: Option<Mask>,
    source: Option<Arc<Pixmap>>,
    size: Size,
    compositor: Compositor,
    showing: bool,
}

impl<R: Resources> ChatImageView<R> {
    /// Create a view and load its mask.
    pub fn new(config: ViewConfig, resources: R) -> Self {
        let mask = config.mask.and_then(|id| {
            let mask = resources.mask(id);
            if mask.is_none() {
                warn!("mask resource {} not found, masking disabled", id.get());
            }
            mask
        });
        Self {
            resources,
            mask,
            source: None,
            size: Size::default(),
            compositor: Compositor::new().filter(config.filter),
            showing: false,
        }
    }

    /// Show `bitmap`, or nothing.
    pub fn set_image_bitmap(&mut self, bitmap: Option<Arc<Pixmap>>) {
        self.source = bitmap;
        self.refresh();
    }

    /// Show the image stored under `id`.
    pub fn set_image_resource(&mut self, id: ResourceId) {
        let drawable = self.resources.drawable(id);
        if drawable.is_none() {
            debug!("image resource {} not found", id.get());
        }
        self.source = extract_bitmap(drawable.as_ref());
        self.refresh();
    }

    /// Show `drawable`, or nothing.
    ///
    /// Passing the bitmap already shown is a no-op.
    pub fn set_image_drawable(&mut self, drawable: Option<Drawable>) {
        let bitmap = extract_bitmap(drawable.as_ref());
        if let (Some(current), Some(new)) = (&self.source, &bitmap)
            && Arc::ptr_eq(current, new)
        {
            return;
        }
        self.source = bitmap;
        self.refresh();
    }

    /// The view's bounds changed.
    pub fn on_size_changed(&mut self, width: u32, height: u32) {
        self.size = Size::new(width, height);
        self.refresh();
    }

    /// The composited image to display.
    pub fn image(&self) -> Option<&Pixmap> {
        if self.showing {
            self.compositor.output()
        } else {
            None
        }
    }

    pub fn source(&self) -> Option<&Arc<Pixmap>> {
        self.source.as_ref()
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    fn refresh(&mut self) {
        let Some(source) = self.source.as_deref() else {
            self.showing = false;
            return;
        };
        // A skipped render keeps whatever was on screen, including nothing.
        if self.compositor.draw(
            Some(source),
            self.mask.as_ref(),
            self.size.width,
            self.size.height,
        ) {
            self.showing = true;
        }
    }
}
