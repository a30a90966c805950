//! The rendering target that commands are dispatched to.

use crate::color::Rgb;
use crate::image::Image;

/// Errors raised by a drawing sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The sink cannot render this primitive
    #[error("{0} is not supported by this sink")]
    Unsupported(&'static str),
    #[error("image error: {0}")]
    Image(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Bounding box of an ellipse given by center and radii.
    /// Arithmetic wraps; radii come straight off the wire.
    pub const fn around(x: i32, y: i32, rx: i32, ry: i32) -> Self {
        Rect {
            x: x.wrapping_sub(rx),
            y: y.wrapping_sub(ry),
            w: rx.wrapping_mul(2),
            h: ry.wrapping_mul(2),
        }
    }
}

/// Font and color for `draw_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub color: Rgb,
    pub font: String,
    pub font_size: i32,
}

/// Primitive drawing operations. Every dispatched command maps onto one call.
pub trait DrawingSink {
    fn set_background(&mut self, color: Rgb) -> Result<(), SinkError>;
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) -> Result<(), SinkError>;
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) -> Result<(), SinkError>;
    fn draw_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), SinkError>;
    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), SinkError>;
    /// `bounds` is the ellipse's bounding box
    fn draw_ellipse(&mut self, bounds: Rect, color: Rgb) -> Result<(), SinkError>;
    fn fill_ellipse(&mut self, bounds: Rect, color: Rgb) -> Result<(), SinkError>;
    fn draw_text(&mut self, x: i32, y: i32, style: &TextStyle, text: &str) -> Result<(), SinkError>;
    /// Scale `image` into `dest`
    fn blit_image(&mut self, dest: Rect, image: &Image) -> Result<(), SinkError>;
}

/// One recorded primitive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    SetBackground(Rgb),
    SetPixel(i32, i32, Rgb),
    DrawLine(i32, i32, i32, i32, Rgb),
    DrawRect(Rect, Rgb),
    FillRect(Rect, Rgb),
    DrawEllipse(Rect, Rgb),
    FillEllipse(Rect, Rgb),
    DrawText(i32, i32, TextStyle, String),
    BlitImage(Rect, u32, u32),
}

impl SinkCall {
    /// Name of the primitive, as used by [`RecordingSink::fail_on`].
    pub fn op(&self) -> &'static str {
        match self {
            SinkCall::SetBackground(..) => "set_background",
            SinkCall::SetPixel(..) => "set_pixel",
            SinkCall::DrawLine(..) => "draw_line",
            SinkCall::DrawRect(..) => "draw_rect",
            SinkCall::FillRect(..) => "fill_rect",
            SinkCall::DrawEllipse(..) => "draw_ellipse",
            SinkCall::FillEllipse(..) => "fill_ellipse",
            SinkCall::DrawText(..) => "draw_text",
            SinkCall::BlitImage(..) => "blit_image",
        }
    }
}

/// Sink that records calls instead of rendering.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    fail_on: Option<&'static str>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of the named primitive fail with `Unsupported`.
    /// The failed call is still recorded.
    pub fn fail_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    fn record(&mut self, call: SinkCall) -> Result<(), SinkError> {
        let op = call.op();
        self.calls.push(call);
        match self.fail_on {
            Some(f) if f == op => Err(SinkError::Unsupported(op)),
            _ => Ok(()),
        }
    }
}

impl DrawingSink for RecordingSink {
    fn set_background(&mut self, color: Rgb) -> Result<(), SinkError> {
        self.record(SinkCall::SetBackground(color))
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) -> Result<(), SinkError> {
        self.record(SinkCall::SetPixel(x, y, color))
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) -> Result<(), SinkError> {
        self.record(SinkCall::DrawLine(x0, y0, x1, y1, color))
    }

    fn draw_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), SinkError> {
        self.record(SinkCall::DrawRect(rect, color))
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), SinkError> {
        self.record(SinkCall::FillRect(rect, color))
    }

    fn draw_ellipse(&mut self, bounds: Rect, color: Rgb) -> Result<(), SinkError> {
        self.record(SinkCall::DrawEllipse(bounds, color))
    }

    fn fill_ellipse(&mut self, bounds: Rect, color: Rgb) -> Result<(), SinkError> {
        self.record(SinkCall::FillEllipse(bounds, color))
    }

    fn draw_text(&mut self, x: i32, y: i32, style: &TextStyle, text: &str) -> Result<(), SinkError> {
        self.record(SinkCall::DrawText(x, y, style.clone(), text.to_string()))
    }

    fn blit_image(&mut self, dest: Rect, image: &Image) -> Result<(), SinkError> {
        self.record(SinkCall::BlitImage(dest, image.width, image.height))
    }
}
