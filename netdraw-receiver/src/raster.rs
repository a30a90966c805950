//! In-memory RGB framebuffer sink.
//!
//! All coordinates come straight off the network, so every primitive clips to
//! the surface before iterating. Work per command is bounded by the surface
//! size, not by the numbers in the datagram.

use netdraw_protocol::{DrawingSink, Image, Rect, Rgb, SinkError, TextStyle};
use std::ops::Range;

pub struct RasterSink {
    width: u32,
    height: u32,
    background: Rgb,
    /// RGB8, row-major
    pixels: Vec<u8>,
}

impl RasterSink {
    pub fn new(width: u32, height: u32) -> Self {
        let mut sink = RasterSink {
            width,
            height,
            background: Rgb::WHITE,
            pixels: vec![0; width as usize * height as usize * 3],
        };
        sink.repaint();
        sink
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    /// Current surface as a PNG file
    pub fn snapshot_png(&self) -> Result<Vec<u8>, SinkError> {
        Image::encode_png(self.width, self.height, &self.pixels)
    }

    pub fn save_snapshot(&self, path: &str) -> Result<(), SinkError> {
        let png = self.snapshot_png()?;
        std::fs::write(path, png)?;
        Ok(())
    }

    fn repaint(&mut self) {
        let bg = self.background;
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&[bg.r, bg.g, bg.b]);
        }
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }

    /// Blend `rgba` over the pixel at an in-bounds position
    fn blend(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * self.width as usize + x) * 3;
        let a = rgba[3] as u32;
        for c in 0..3 {
            let dst = self.pixels[i + c] as u32;
            self.pixels[i + c] = ((rgba[c] as u32 * a + dst * (255 - a) + 127) / 255) as u8;
        }
    }

    fn hspan(&mut self, y: i64, x0: i64, x1: i64, color: Rgb) {
        if y < 0 || y >= self.height as i64 {
            return;
        }
        for x in clip(x0, x1 + 1, self.width) {
            self.put(x as i64, y, color);
        }
    }

    /// Inclusive horizontal extent of an ellipse on row `py`, if any
    fn ellipse_span(bounds: &Rect, py: i64, shrink: f64) -> Option<(i64, i64)> {
        let a = bounds.w as f64 / 2.0 - shrink;
        let b = bounds.h as f64 / 2.0 - shrink;
        if a <= 0.0 || b <= 0.0 {
            return None;
        }
        let cx = bounds.x as f64 + bounds.w as f64 / 2.0;
        let cy = bounds.y as f64 + bounds.h as f64 / 2.0;
        let dy = (py as f64 + 0.5 - cy) / b;
        if dy.abs() > 1.0 {
            return None;
        }
        let half = a * (1.0 - dy * dy).sqrt();
        let left = (cx - half - 0.5).ceil() as i64;
        let right = (cx + half - 0.5).floor() as i64;
        (left <= right).then_some((left, right))
    }
}

/// Clamp the half-open range `lo..hi` to `0..max`
fn clip(lo: i64, hi: i64, max: u32) -> Range<usize> {
    let lo = lo.clamp(0, max as i64) as usize;
    let hi = hi.clamp(0, max as i64) as usize;
    lo..hi.max(lo)
}

/// Liang-Barsky clip of a segment to the box [xmin, xmax] x [ymin, ymax]
fn clip_segment(p0: (f64, f64), p1: (f64, f64), max: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    let checks = [
        (-dx, p0.0 + 1.0),
        (dx, max.0 - p0.0),
        (-dy, p0.1 + 1.0),
        (dy, max.1 - p0.1),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((
        (p0.0 + t0 * dx, p0.1 + t0 * dy),
        (p0.0 + t1 * dx, p0.1 + t1 * dy),
    ))
}

impl DrawingSink for RasterSink {
    /// Changing the background repaints the whole surface with it.
    fn set_background(&mut self, color: Rgb) -> Result<(), SinkError> {
        self.background = color;
        self.repaint();
        Ok(())
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) -> Result<(), SinkError> {
        self.put(x as i64, y as i64, color);
        Ok(())
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) -> Result<(), SinkError> {
        let max = (self.width as f64, self.height as f64);
        let Some((a, b)) = clip_segment((x0 as f64, y0 as f64), (x1 as f64, y1 as f64), max) else {
            return Ok(());
        };

        // Bresenham over the clipped segment
        let (mut x, mut y) = (a.0.round() as i64, a.1.round() as i64);
        let (xe, ye) = (b.0.round() as i64, b.1.round() as i64);
        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x, y, color);
            if x == xe && y == ye {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Ok(())
    }

    /// Outline covering x..=x+w and y..=y+h, as a one-pixel pen does.
    fn draw_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), SinkError> {
        if rect.w < 0 || rect.h < 0 {
            return Ok(());
        }
        let (x0, y0) = (rect.x as i64, rect.y as i64);
        let (x1, y1) = (x0 + rect.w as i64, y0 + rect.h as i64);
        self.hspan(y0, x0, x1, color);
        self.hspan(y1, x0, x1, color);
        for y in clip(y0, y1 + 1, self.height) {
            self.put(x0, y as i64, color);
            self.put(x1, y as i64, color);
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), SinkError> {
        if rect.w <= 0 || rect.h <= 0 {
            return Ok(());
        }
        let (x0, y0) = (rect.x as i64, rect.y as i64);
        let x1 = x0 + rect.w as i64 - 1;
        for y in clip(y0, y0 + rect.h as i64, self.height) {
            self.hspan(y as i64, x0, x1, color);
        }
        Ok(())
    }

    fn draw_ellipse(&mut self, bounds: Rect, color: Rgb) -> Result<(), SinkError> {
        let (y0, h) = (bounds.y as i64, bounds.h as i64);
        for py in clip(y0, y0 + h, self.height) {
            let py = py as i64;
            let Some((l, r)) = Self::ellipse_span(&bounds, py, 0.0) else {
                continue;
            };
            match Self::ellipse_span(&bounds, py, 1.0) {
                // Ring: outer span minus the inner ellipse's span
                Some((il, ir)) => {
                    self.hspan(py, l, il - 1, color);
                    self.hspan(py, ir + 1, r, color);
                }
                None => self.hspan(py, l, r, color),
            }
        }
        Ok(())
    }

    fn fill_ellipse(&mut self, bounds: Rect, color: Rgb) -> Result<(), SinkError> {
        let (y0, h) = (bounds.y as i64, bounds.h as i64);
        for py in clip(y0, y0 + h, self.height) {
            let py = py as i64;
            if let Some((l, r)) = Self::ellipse_span(&bounds, py, 0.0) {
                self.hspan(py, l, r, color);
            }
        }
        Ok(())
    }

    fn draw_text(&mut self, _x: i32, _y: i32, _style: &TextStyle, _text: &str) -> Result<(), SinkError> {
        Err(SinkError::Unsupported("draw_text"))
    }

    /// Nearest-neighbour scale of `image` into `dest`, alpha blended.
    fn blit_image(&mut self, dest: Rect, image: &Image) -> Result<(), SinkError> {
        if dest.w <= 0 || dest.h <= 0 || image.width == 0 || image.height == 0 {
            return Ok(());
        }
        let (x0, y0) = (dest.x as i64, dest.y as i64);
        let (w, h) = (dest.w as i64, dest.h as i64);
        for y in clip(y0, y0 + h, self.height) {
            let sy = ((y as i64 - y0) * image.height as i64 / h) as u32;
            for x in clip(x0, x0 + w, self.width) {
                let sx = ((x as i64 - x0) * image.width as i64 / w) as u32;
                self.blend(x, y, image.pixel(sx, sy));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);

    fn count(sink: &RasterSink, color: Rgb) -> usize {
        let mut n = 0;
        for y in 0..sink.height {
            for x in 0..sink.width {
                if sink.pixel(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_background_repaints() {
        let mut sink = RasterSink::new(4, 3);
        assert_eq!(count(&sink, Rgb::WHITE), 12);
        sink.set_pixel(1, 1, RED).unwrap();
        sink.set_background(Rgb::BLACK).unwrap();
        assert_eq!(sink.background(), Rgb::BLACK);
        assert_eq!(count(&sink, Rgb::BLACK), 12);
    }

    #[test]
    fn test_pixel_out_of_bounds_ignored() {
        let mut sink = RasterSink::new(4, 4);
        sink.set_pixel(-1, 0, RED).unwrap();
        sink.set_pixel(4, 0, RED).unwrap();
        sink.set_pixel(i32::MAX, i32::MIN, RED).unwrap();
        assert_eq!(count(&sink, RED), 0);
        sink.set_pixel(3, 3, RED).unwrap();
        assert_eq!(sink.pixel(3, 3), Some(RED));
    }

    #[test]
    fn test_line() {
        let mut sink = RasterSink::new(10, 10);
        sink.draw_line(0, 0, 9, 9, RED).unwrap();
        assert_eq!(count(&sink, RED), 10);
        for i in 0..10 {
            assert_eq!(sink.pixel(i, i), Some(RED));
        }
    }

    #[test]
    fn test_huge_line_is_clipped() {
        let mut sink = RasterSink::new(10, 10);
        sink.draw_line(i32::MIN, 5, i32::MAX, 5, RED).unwrap();
        assert_eq!(count(&sink, RED), 10);
        sink.draw_line(-100, -100, -50, -1, Rgb::BLACK).unwrap();
        assert_eq!(count(&sink, Rgb::BLACK), 0);
    }

    #[test]
    fn test_rect_outline_and_fill() {
        let mut sink = RasterSink::new(10, 10);
        sink.draw_rect(Rect::new(1, 1, 3, 2), RED).unwrap();
        // 4x3 box outline: 4 + 4 + 2 * 1
        assert_eq!(count(&sink, RED), 10);
        assert_eq!(sink.pixel(2, 2), Some(Rgb::WHITE));

        sink.fill_rect(Rect::new(5, 5, 3, 2), Rgb::BLACK).unwrap();
        assert_eq!(count(&sink, Rgb::BLACK), 6);
        sink.fill_rect(Rect::new(-5, -5, 2_000_000_000, 2_000_000_000), Rgb::BLACK)
            .unwrap();
        assert_eq!(count(&sink, Rgb::BLACK), 100);
    }

    #[test]
    fn test_ellipse_fill_inside_bounds() {
        let mut sink = RasterSink::new(20, 20);
        sink.fill_ellipse(Rect::around(10, 10, 5, 3), RED).unwrap();
        assert_eq!(sink.pixel(10, 10), Some(RED));
        assert_eq!(sink.pixel(5, 7), Some(Rgb::WHITE));
        for y in 0..20 {
            for x in 0..20 {
                if sink.pixel(x, y) == Some(RED) {
                    assert!((5..15).contains(&x) && (7..13).contains(&y), "({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_ellipse_outline_is_hollow() {
        let mut sink = RasterSink::new(30, 30);
        sink.draw_ellipse(Rect::around(15, 15, 10, 10), RED).unwrap();
        assert_eq!(sink.pixel(15, 15), Some(Rgb::WHITE));
        assert_eq!(sink.pixel(5, 15), Some(RED));
        assert!(count(&sink, RED) > 20);
    }

    #[test]
    fn test_text_unsupported() {
        let mut sink = RasterSink::new(4, 4);
        let style = TextStyle {
            color: RED,
            font: "Arial".to_string(),
            font_size: 10,
        };
        assert!(matches!(
            sink.draw_text(0, 0, &style, "x"),
            Err(SinkError::Unsupported(_))
        ));
    }

    #[test]
    fn test_blit_scales_and_blends() {
        let image = Image {
            width: 2,
            height: 1,
            pixels: vec![255, 0, 0, 255, 0, 0, 255, 0],
        };
        let mut sink = RasterSink::new(8, 8);
        sink.blit_image(Rect::new(0, 0, 4, 2), &image).unwrap();
        // Left half red, right half fully transparent
        assert_eq!(sink.pixel(0, 0), Some(RED));
        assert_eq!(sink.pixel(1, 1), Some(RED));
        assert_eq!(sink.pixel(2, 0), Some(Rgb::WHITE));
        assert_eq!(count(&sink, RED), 4);
    }

    #[test]
    fn test_snapshot_decodes() {
        let mut sink = RasterSink::new(3, 2);
        sink.set_pixel(2, 1, RED).unwrap();
        let decoded = Image::decode(&sink.snapshot_png().unwrap()).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.pixel(2, 1), [255, 0, 0, 255]);
        assert_eq!(decoded.pixel(0, 0), [255, 255, 255, 255]);
    }
}
