use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Affine, CanvasSize, Point};
use crate::render::composite::{PremulRgba8, over};

/// A rendered canvas in row-major premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl Frame {
    /// Allocate a transparent frame.
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.width as usize * canvas.height as usize * 4],
        }
    }

    /// Read one premultiplied pixel.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    fn blend_pixel(&mut self, x: u32, y: u32, src: PremulRgba8, coverage: f32) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let dst = [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]];
        let out = over(dst, src, coverage);
        self.data[i..i + 4].copy_from_slice(&out);
    }
}

/// Draw `image` into `frame` under `transform`.
///
/// `transform` maps image-local pixel coordinates (origin at the image's
/// top-left, one unit per source pixel) into frame coordinates. Each covered
/// destination pixel is inverse-mapped and bilinearly sampled from the
/// premultiplied source, then source-over blended.
pub(crate) fn draw_image(frame: &mut Frame, image: &PreparedImage, transform: Affine) {
    if transform.determinant().abs() < 1e-12 {
        return;
    }
    let inverse = transform.inverse();

    let src_w = f64::from(image.width);
    let src_h = f64::from(image.height);

    // Destination bounding box from the transformed source corners.
    let corners = [
        transform * Point::new(0.0, 0.0),
        transform * Point::new(src_w, 0.0),
        transform * Point::new(0.0, src_h),
        transform * Point::new(src_w, src_h),
    ];
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for c in corners {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }

    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().min(f64::from(frame.width)) as u32).min(frame.width);
    let y1 = (max_y.ceil().min(f64::from(frame.height)) as u32).min(frame.height);

    for y in y0..y1 {
        for x in x0..x1 {
            let dest_center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let src_pt = inverse * dest_center;
            if src_pt.x < 0.0 || src_pt.y < 0.0 || src_pt.x >= src_w || src_pt.y >= src_h {
                continue;
            }
            let src = sample_bilinear(image, src_pt.x, src_pt.y);
            frame.blend_pixel(x, y, src, 1.0);
        }
    }
}

/// Bilinear sample at image coordinates (pixel units, texel centers at +0.5),
/// clamping at the edges.
fn sample_bilinear(image: &PreparedImage, x: f64, y: f64) -> PremulRgba8 {
    let max_x = (image.width - 1) as i64;
    let max_y = (image.height - 1) as i64;

    let fx = x - 0.5;
    let fy = y - 0.5;
    let ix = fx.floor();
    let iy = fy.floor();
    let tx = (fx - ix) as f32;
    let ty = (fy - iy) as f32;

    let clamp_x = |v: i64| v.clamp(0, max_x) as u32;
    let clamp_y = |v: i64| v.clamp(0, max_y) as u32;

    let x0 = clamp_x(ix as i64);
    let x1 = clamp_x(ix as i64 + 1);
    let y0 = clamp_y(iy as i64);
    let y1 = clamp_y(iy as i64 + 1);

    let texel = |px: u32, py: u32| -> [f32; 4] {
        let i = (py as usize * image.width as usize + px as usize) * 4;
        let d = &image.rgba8_premul[i..i + 4];
        [f32::from(d[0]), f32::from(d[1]), f32::from(d[2]), f32::from(d[3])]
    };

    let p00 = texel(x0, y0);
    let p10 = texel(x1, y0);
    let p01 = texel(x0, y1);
    let p11 = texel(x1, y1);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = p00[i] + (p10[i] - p00[i]) * tx;
        let bottom = p01[i] + (p11[i] - p01[i]) * tx;
        let v = top + (bottom - top) * ty;
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn solid_image(width: u32, height: u32, px: PremulRgba8) -> PreparedImage {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&px);
        }
        PreparedImage {
            width,
            height,
            rgba8_premul: Arc::new(data),
        }
    }

    fn canvas(width: u32, height: u32) -> Frame {
        Frame::new(CanvasSize { width, height })
    }

    #[test]
    fn identity_draw_copies_pixels() {
        let mut frame = canvas(4, 4);
        let img = solid_image(4, 4, [255, 0, 0, 255]);
        draw_image(&mut frame, &img, Affine::IDENTITY);
        assert_eq!(frame.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(frame.pixel(3, 3), [255, 0, 0, 255]);
    }

    #[test]
    fn translate_offsets_the_draw() {
        let mut frame = canvas(4, 4);
        let img = solid_image(2, 2, [0, 255, 0, 255]);
        draw_image(&mut frame, &img, Affine::translate((2.0, 2.0)));
        assert_eq!(frame.pixel(1, 1), [0, 0, 0, 0]);
        assert_eq!(frame.pixel(2, 2), [0, 255, 0, 255]);
        assert_eq!(frame.pixel(3, 3), [0, 255, 0, 255]);
    }

    #[test]
    fn later_draws_occlude_earlier_ones() {
        let mut frame = canvas(2, 2);
        let red = solid_image(2, 2, [255, 0, 0, 255]);
        let blue = solid_image(2, 2, [0, 0, 255, 255]);
        draw_image(&mut frame, &red, Affine::IDENTITY);
        draw_image(&mut frame, &blue, Affine::IDENTITY);
        assert_eq!(frame.pixel(0, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn scale_fills_the_scaled_extent() {
        let mut frame = canvas(4, 4);
        let img = solid_image(2, 2, [255, 255, 255, 255]);
        draw_image(&mut frame, &img, Affine::scale(2.0));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(frame.pixel(x, y), [255, 255, 255, 255]);
            }
        }
    }

    #[test]
    fn out_of_frame_draw_is_clipped_not_panicking() {
        let mut frame = canvas(4, 4);
        let img = solid_image(2, 2, [255, 255, 255, 255]);
        draw_image(&mut frame, &img, Affine::translate((-1.0, -1.0)));
        assert_eq!(frame.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(frame.pixel(1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn singular_transform_is_a_noop() {
        let mut frame = canvas(2, 2);
        let img = solid_image(2, 2, [255, 255, 255, 255]);
        draw_image(&mut frame, &img, Affine::scale(0.0));
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn rotation_keeps_the_center_covered() {
        let mut frame = canvas(8, 8);
        let img = solid_image(4, 4, [255, 0, 0, 255]);
        // Rotate 45° about the image center placed at the frame center.
        let t = Affine::translate((4.0, 4.0))
            * Affine::rotate(std::f64::consts::FRAC_PI_4)
            * Affine::translate((-2.0, -2.0));
        draw_image(&mut frame, &img, t);
        assert_eq!(frame.pixel(4, 4), [255, 0, 0, 255]);
        // Far corner stays untouched.
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
    }
}
