//! Bitmap placement: tinted icons and resized images.

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::resources::IconBitmap;

/// How a provider image is fitted into the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMethod {
    /// Scale each axis independently to fill the box.
    #[default]
    Stretch,
    /// Scale uniformly to fit inside the box, centered.
    Fit,
    /// Scale uniformly to cover the box, center-cropped.
    Crop,
    /// Keep the original size, anchored top-left and clipped.
    None,
}

impl ResizeMethod {
    /// Parse a resize method name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stretch" | "fill" => Some(Self::Stretch),
            "fit" | "contain" => Some(Self::Fit),
            "crop" | "cover" => Some(Self::Crop),
            "none" | "original" => Some(Self::None),
            _ => None,
        }
    }
}

/// Resize `image` into a `width` x `height` buffer using nearest-neighbor sampling.
///
/// Areas of the box the image does not cover stay transparent.
///
/// # Errors
///
/// Returns an error if the target size is zero.
pub fn resize_image(image: &Framebuffer, width: u32, height: u32, method: ResizeMethod) -> Result<Framebuffer> {
    let mut out = Framebuffer::new(width, height)?;
    let (sw, sh) = (image.width() as f32, image.height() as f32);
    let (tw, th) = (width as f32, height as f32);

    // (scale_x, scale_y, offset_x, offset_y): destination = source * scale + offset
    let (kx, ky, ox, oy) = match method {
        ResizeMethod::Stretch => (tw / sw, th / sh, 0.0, 0.0),
        ResizeMethod::Fit => {
            let k = (tw / sw).min(th / sh);
            (k, k, ((tw - sw * k) / 2.0).floor(), ((th - sh * k) / 2.0).floor())
        }
        ResizeMethod::Crop => {
            let k = (tw / sw).max(th / sh);
            (k, k, ((tw - sw * k) / 2.0).floor(), ((th - sh * k) / 2.0).floor())
        }
        ResizeMethod::None => (1.0, 1.0, 0.0, 0.0),
    };

    for y in 0..height {
        let sy = ((y as f32 + 0.5 - oy) / ky).floor();
        if sy < 0.0 || sy >= sh {
            continue;
        }
        for x in 0..width {
            let sx = ((x as f32 + 0.5 - ox) / kx).floor();
            if sx < 0.0 || sx >= sw {
                continue;
            }
            if let Some(color) = image.get_pixel(sx as u32, sy as u32) {
                out.set_pixel(x, y, color);
            }
        }
    }
    Ok(out)
}

/// Copy `image` onto `fb` with its top-left at (x, y).
///
/// Pixels with alpha below 128 are skipped; the rest are written opaque.
pub fn blit(fb: &mut Framebuffer, image: &Framebuffer, x: i32, y: i32) {
    let (x, y) = (i64::from(x), i64::from(y));
    for sy in overlap(y, image.height(), fb.height()) {
        for sx in overlap(x, image.width(), fb.width()) {
            let Some(color) = image.get_pixel(sx, sy) else { continue };
            if color.a >= 128 {
                fb.put((x + i64::from(sx)) as i32, (y + i64::from(sy)) as i32, color.with_alpha(255));
            }
        }
    }
}

/// Draw `icon` scaled to a `size` x `size` box at (x, y), inked with `color`.
///
/// Nearest-neighbor scaling; mask coverage of 128 or more is inked.
pub fn draw_icon(fb: &mut Framebuffer, icon: &IconBitmap, x: i32, y: i32, size: u32, color: Rgba) {
    if icon.width == 0 || icon.height == 0 || size == 0 {
        return;
    }
    let (x, y) = (i64::from(x), i64::from(y));
    let scaled = |d: u32, n: u32| (u64::from(d) * u64::from(n) / u64::from(size)) as u32;
    for dy in overlap(y, size, fb.height()) {
        let sy = scaled(dy, icon.height);
        for dx in overlap(x, size, fb.width()) {
            if icon.coverage(scaled(dx, icon.width), sy) >= 128 {
                fb.put((x + i64::from(dx)) as i32, (y + i64::from(dy)) as i32, color);
            }
        }
    }
}

/// Offsets into a run of `len` pixels at `origin` that fall inside `0..limit`.
fn overlap(origin: i64, len: u32, limit: u32) -> std::ops::Range<u32> {
    let len = i64::from(len);
    (-origin).clamp(0, len) as u32..(i64::from(limit) - origin).clamp(0, len) as u32
}
