//! End-to-end compositing checks on coordinate-encoded images.
//!
//! Every source pixel stores its own (x, y) position in its red and green
//! channels, so each output pixel can be traced back to the source pixel it
//! was sampled from. Wrong scale, wrong offset or a stray gap all show up as
//! coordinates that break the center-crop rules.

use std::sync::Arc;

use chatimage::*;

// ---- Helpers ----

/// Opaque source where pixel (x, y) is `rgba(x, y, 0, 255)`. Sides < 256.
fn coords(w: u32, h: u32) -> Pixmap {
    assert!(w <= 256 && h <= 256);
    let data = (0..h)
        .flat_map(|y| (0..w).map(move |x| Color::from_rgba8(x as u8, y as u8, 0, 255)))
        .collect();
    Pixmap::from_vec(w, h, data).unwrap()
}

fn origin(c: Color) -> (u32, u32) {
    (c.r as u32, c.g as u32)
}

fn render(sw: u32, sh: u32, tw: u32, th: u32) -> Pixmap {
    Compositor::new()
        .render(Some(&coords(sw, sh)), None, tw, th)
        .unwrap()
        .clone()
}

const SOURCES: &[(u32, u32)] = &[
    (1, 1),
    (2, 3),
    (100, 50),
    (50, 100),
    (17, 17),
    (255, 9),
    (9, 255),
];
const TARGETS: &[(u32, u32)] = &[(1, 1), (60, 60), (13, 40), (40, 13), (128, 96), (3, 3)];

/// Run `check` over every source/target combination.
fn each_case(mut check: impl FnMut(&str, CenterCrop, &Pixmap)) {
    for &(sw, sh) in SOURCES {
        for &(tw, th) in TARGETS {
            let crop = CenterCrop::compute(Size::new(sw, sh), Size::new(tw, th)).unwrap();
            let out = render(sw, sh, tw, th);
            check(&format!("{sw}x{sh} -> {tw}x{th}"), crop, &out);
        }
    }
}

// ---- Center-crop ----

#[test]
fn no_gaps_anywhere() {
    each_case(|tag, _, out| {
        assert!(out.pixels().iter().all(Color::is_opaque), "{tag}: transparent gap");
    });
}

#[test]
fn samples_stay_inside_visible_region() {
    each_case(|tag, crop, out| {
        let v = crop.visible_source();
        for c in out.pixels() {
            let (x, y) = origin(*c);
            assert!(
                x >= v.x && x < v.x + v.width && y >= v.y && y < v.y + v.height,
                "{tag}: sampled ({x}, {y}) outside {v:?}"
            );
        }
    });
}

#[test]
fn sampling_is_monotonic() {
    each_case(|tag, _, out| {
        for y in 0..out.height() {
            let row = out.row(y).unwrap();
            assert!(
                row.windows(2).all(|w| w[0].r <= w[1].r),
                "{tag}: row {y} not ascending"
            );
        }
        for x in 0..out.width() {
            let col: Vec<u8> = (0..out.height()).map(|y| out.pixel(x, y).unwrap().g).collect();
            assert!(
                col.windows(2).all(|w| w[0] <= w[1]),
                "{tag}: column {x} not ascending"
            );
        }
    });
}

#[test]
fn crop_is_centered() {
    each_case(|tag, crop, out| {
        let (sw, sh) = (crop.source.width, crop.source.height);
        let (first_x, _) = origin(out.pixel(0, 0).unwrap());
        let (last_x, _) = origin(out.pixel(out.width() - 1, 0).unwrap());
        let (_, first_y) = origin(out.pixel(0, 0).unwrap());
        let (_, last_y) = origin(out.pixel(0, out.height() - 1).unwrap());

        // Margins cropped off each side differ by at most a rounding step.
        let slack = crop.scale.recip().ceil() as i64 + 1;
        let left = first_x as i64;
        let right = (sw - 1 - last_x) as i64;
        let top = first_y as i64;
        let bottom = (sh - 1 - last_y) as i64;
        assert!((left - right).abs() <= slack, "{tag}: x margins {left} vs {right}");
        assert!((top - bottom).abs() <= slack, "{tag}: y margins {top} vs {bottom}");
    });
}

#[test]
fn wide_source_example() {
    // 100×50 into 60×60: scale 1.2, scaled 120×60, dx = -30.
    let crop = CenterCrop::compute(Size::new(100, 50), Size::new(60, 60)).unwrap();
    assert_eq!(crop.offset, (-30, 0));

    let out = render(100, 50, 60, 60);
    let xs: Vec<u32> = out.row(0).unwrap().iter().map(|c| origin(*c).0).collect();
    assert_eq!(xs.first(), Some(&25));
    assert_eq!(xs.last(), Some(&74));
    // Every source column in the center slice appears at least once.
    for x in 25..75 {
        assert!(xs.contains(&x), "column {x} missing");
    }
}

// ---- Masks ----

/// 5×5 bubble mask: transparent corner pixels, opaque elsewhere, 1-pixel
/// fixed border and a stretchable center.
fn bubble_mask() -> NinePatch {
    let mut bmp = Pixmap::filled(5, 5, Color::WHITE).unwrap();
    for (x, y) in [(0, 0), (4, 0), (0, 4), (4, 4)] {
        bmp.set_pixel(x, y, Color::TRANSPARENT);
    }
    NinePatch::new(bmp, vec![1, 4], vec![1, 4]).unwrap()
}

#[test]
fn ninepatch_mask_from_chunk() {
    let np = bubble_mask();
    let chunk = NinePatchChunk {
        x_divs: np.x_divs().to_vec(),
        y_divs: np.y_divs().to_vec(),
        ..Default::default()
    }
    .to_bytes()
    .unwrap();
    let mask = Mask::from_decoded(np.bitmap().clone(), Some(&chunk[..]));
    assert!(mask.is_stretchable());

    let mut c = Compositor::new();
    let out = c.render(Some(&coords(200, 100)), Some(&mask), 48, 32).unwrap();
    for (x, y) in [(0, 0), (47, 0), (0, 31), (47, 31)] {
        assert_eq!(out.pixel(x, y), Some(Color::TRANSPARENT), "corner ({x}, {y})");
    }
    let transparent = out.pixels().iter().filter(|c| c.is_transparent()).count();
    assert_eq!(transparent, 4, "only the fixed corners are cut");
}

#[test]
fn masked_pixels_keep_source_color() {
    let half = Pixmap::filled(16, 16, Color::from_rgba8(0, 0, 0, 128)).unwrap();
    let plain = render(40, 30, 16, 16);
    let mut c = Compositor::new();
    let out = c
        .render(Some(&coords(40, 30)), Some(&Mask::Bitmap(half)), 16, 16)
        .unwrap();
    for (m, p) in out.pixels().iter().zip(plain.pixels()) {
        assert_eq!((m.r, m.g, m.b), (p.r, p.g, p.b));
        assert_eq!(m.a, 128);
    }
}

#[test]
fn bitmap_mask_is_not_scaled() {
    // 4×4 transparent mask on a 10×10 canvas only cuts the top-left corner.
    let mask = Mask::Bitmap(Pixmap::new(4, 4).unwrap());
    let mut c = Compositor::new();
    let out = c.render(Some(&coords(10, 10)), Some(&mask), 10, 10).unwrap();
    assert!(out.pixel(3, 3).unwrap().is_transparent());
    assert!(out.pixel(4, 3).unwrap().is_opaque());
    assert!(out.pixel(3, 4).unwrap().is_opaque());
}

// ---- View ----

struct Assets {
    mask: NinePatch,
}

impl Resources for Assets {
    fn mask(&self, id: ResourceId) -> Option<Mask> {
        (id.get() == 1).then(|| Mask::NinePatch(self.mask.clone()))
    }

    fn drawable(&self, id: ResourceId) -> Option<Drawable> {
        (id.get() == 2).then(|| Drawable::from(coords(64, 32)))
    }
}

#[test]
fn view_lifecycle() {
    let assets = Assets { mask: bubble_mask() };
    let mut view = ChatImageView::new(ViewConfig::new().mask(ResourceId::new(1)), assets);
    assert!(view.mask().is_some_and(Mask::is_stretchable));

    // Image before layout: nothing to show yet.
    view.set_image_resource(ResourceId::new(2).unwrap());
    assert!(view.image().is_none());

    view.on_size_changed(20, 20);
    let first = view.image().unwrap().clone();
    assert_eq!(first.size(), Size::new(20, 20));
    assert!(first.pixel(0, 0).unwrap().is_transparent());
    assert!(first.pixel(10, 10).unwrap().is_opaque());
    let ptr = view.image().unwrap().pixels().as_ptr();

    // New image, same bounds: buffer reused.
    view.set_image_bitmap(Some(Arc::new(coords(30, 90))));
    assert_eq!(view.image().unwrap().pixels().as_ptr(), ptr);
    assert_ne!(view.image().unwrap(), &first);

    // Layout collapses: last image stays.
    let shown = view.image().unwrap().clone();
    view.on_size_changed(20, 0);
    assert_eq!(view.image(), Some(&shown));

    // New bounds: new buffer at the new size.
    view.on_size_changed(12, 30);
    assert_eq!(view.image().unwrap().size(), Size::new(12, 30));
}

#[test]
fn view_without_mask_still_crops() {
    let assets = Assets { mask: bubble_mask() };
    let mut view = ChatImageView::new(ViewConfig::new(), assets);
    view.on_size_changed(10, 10);
    view.set_image_drawable(Some(Drawable::from(coords(40, 20))));
    let out = view.image().unwrap();
    assert!(out.pixels().iter().all(Color::is_opaque));
    // 40×20 → scale 0.5, 20×10 scaled, dx = -5: pixel center 0.5 maps to x = 11.
    assert_eq!(origin(out.pixel(0, 0).unwrap()), (11, 1));
}
