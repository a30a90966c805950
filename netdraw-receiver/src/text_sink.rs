//! Text-only drawing sink.
//!
//! Writes one line per primitive instead of rendering anything. Useful on
//! headless machines and for watching what a sender actually produces.

use netdraw_protocol::{DrawingSink, Image, Rect, Rgb, SinkError, TextStyle};
use std::io::Write;

pub struct TextSink<W: Write> {
    out: W,
    background: Rgb,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        TextSink {
            out,
            background: Rgb::WHITE,
        }
    }

    fn emit(&mut self, line: std::fmt::Arguments) -> Result<(), SinkError> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn fmt_rect(r: Rect) -> String {
    format!("({}, {}) {}x{}", r.x, r.y, r.w, r.h)
}

impl<W: Write> DrawingSink for TextSink<W> {
    fn set_background(&mut self, color: Rgb) -> Result<(), SinkError> {
        let previous = self.background;
        self.background = color;
        self.emit(format_args!("background {} (was {})", color, previous))
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) -> Result<(), SinkError> {
        self.emit(format_args!("pixel ({}, {}) {}", x, y, color))
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) -> Result<(), SinkError> {
        self.emit(format_args!("line ({}, {}) - ({}, {}) {}", x0, y0, x1, y1, color))
    }

    fn draw_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), SinkError> {
        self.emit(format_args!("rect {} {}", fmt_rect(rect), color))
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), SinkError> {
        self.emit(format_args!("fill rect {} {}", fmt_rect(rect), color))
    }

    fn draw_ellipse(&mut self, bounds: Rect, color: Rgb) -> Result<(), SinkError> {
        self.emit(format_args!("ellipse {} {}", fmt_rect(bounds), color))
    }

    fn fill_ellipse(&mut self, bounds: Rect, color: Rgb) -> Result<(), SinkError> {
        self.emit(format_args!("fill ellipse {} {}", fmt_rect(bounds), color))
    }

    fn draw_text(&mut self, x: i32, y: i32, style: &TextStyle, text: &str) -> Result<(), SinkError> {
        self.emit(format_args!(
            "text ({}, {}) {} {} {}pt {:?}",
            x, y, style.color, style.font, style.font_size, text
        ))
    }

    fn blit_image(&mut self, dest: Rect, image: &Image) -> Result<(), SinkError> {
        self.emit(format_args!(
            "image {}x{} -> {}",
            image.width,
            image.height,
            fmt_rect(dest)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines() {
        let mut sink = TextSink::new(Vec::new());
        sink.set_background(Rgb::BLACK).unwrap();
        sink.fill_ellipse(Rect::new(1, 2, 3, 4), Rgb::new(255, 0, 0))
            .unwrap();
        let style = TextStyle {
            color: Rgb::WHITE,
            font: "Arial".to_string(),
            font_size: 12,
        };
        sink.draw_text(5, 6, &style, "hi").unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "background #000000 (was #ffffff)",
                "fill ellipse (1, 2) 3x4 #ff0000",
                "text (5, 6) #ffffff Arial 12pt \"hi\"",
            ]
        );
    }
}
