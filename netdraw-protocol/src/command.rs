//! Typed drawing commands.

use base64::Engine;

use crate::color::Rgb;
use crate::grammar::Keyword;

/// A fully validated command, built only by the parser or by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Change the surface background color
    ClearDisplay { color: Rgb },

    DrawPixel { x: i32, y: i32, color: Rgb },

    DrawLine {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Rgb,
    },

    /// Outline; top-left corner plus size
    DrawRectangle {
        x0: i32,
        y0: i32,
        w: i32,
        h: i32,
        color: Rgb,
    },

    FillRectangle {
        x0: i32,
        y0: i32,
        w: i32,
        h: i32,
        color: Rgb,
    },

    /// Outline; center plus radii
    DrawEllipse {
        x: i32,
        y: i32,
        rx: i32,
        ry: i32,
        color: Rgb,
    },

    FillEllipse {
        x: i32,
        y: i32,
        rx: i32,
        ry: i32,
        color: Rgb,
    },

    DrawText {
        x: i32,
        y: i32,
        color: Rgb,
        font: String,
        font_size: i32,
        text: String,
    },

    /// Image payload as decoded from base64, not yet interpreted
    DrawImage {
        x0: i32,
        y0: i32,
        w: i32,
        h: i32,
        data: Vec<u8>,
    },

    /// Show the wall-clock timer label at the given position
    StartTimer {
        x: i32,
        y: i32,
        font_size: i32,
        color: Rgb,
    },
}

impl Command {
    pub fn keyword(&self) -> Keyword {
        match self {
            Command::ClearDisplay { .. } => Keyword::ClearDisplay,
            Command::DrawPixel { .. } => Keyword::DrawPixel,
            Command::DrawLine { .. } => Keyword::DrawLine,
            Command::DrawRectangle { .. } => Keyword::DrawRectangle,
            Command::FillRectangle { .. } => Keyword::FillRectangle,
            Command::DrawEllipse { .. } => Keyword::DrawEllipse,
            Command::FillEllipse { .. } => Keyword::FillEllipse,
            Command::DrawText { .. } => Keyword::DrawText,
            Command::DrawImage { .. } => Keyword::DrawImage,
            Command::StartTimer { .. } => Keyword::Timer,
        }
    }

    /// Encode to the wire format as UTF-8 bytes
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

/// Formats the canonical wire line, `<keyword>: <params>`.
impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.keyword())?;
        match self {
            Command::ClearDisplay { color } => write!(f, "{}", color),
            Command::DrawPixel { x, y, color } => write!(f, "{},{},{}", x, y, color),
            Command::DrawLine {
                x0,
                y0,
                x1,
                y1,
                color,
            } => write!(f, "{} {} {} {} {}", x0, y0, x1, y1, color),
            Command::DrawRectangle {
                x0,
                y0,
                w,
                h,
                color,
            }
            | Command::FillRectangle {
                x0,
                y0,
                w,
                h,
                color,
            } => write!(f, "{} {} {} {} {}", x0, y0, w, h, color),
            Command::DrawEllipse { x, y, rx, ry, color }
            | Command::FillEllipse { x, y, rx, ry, color } => {
                write!(f, "{} {} {} {} {}", x, y, rx, ry, color)
            }
            Command::DrawText {
                x,
                y,
                color,
                font,
                font_size,
                text,
            } => write!(f, "{} {} {} {} {} {}", x, y, color, font, font_size, text),
            Command::DrawImage { x0, y0, w, h, data } => write!(
                f,
                "{} {} {} {} {}",
                x0,
                y0,
                w,
                h,
                base64::engine::general_purpose::STANDARD.encode(data)
            ),
            Command::StartTimer {
                x,
                y,
                font_size,
                color,
            } => write!(f, "{} {} {} {}", x, y, font_size, color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let cmd = Command::DrawPixel {
            x: 10,
            y: -20,
            color: Rgb::new(255, 0, 0),
        };
        assert_eq!(cmd.to_string(), "draw pixel: 10,-20,#ff0000");

        let cmd = Command::StartTimer {
            x: 5,
            y: 6,
            font_size: 14,
            color: Rgb::BLACK,
        };
        assert_eq!(cmd.encode(), b"timer: 5 6 14 #000000".to_vec());
    }

    #[test]
    fn test_image_payload_is_base64() {
        let cmd = Command::DrawImage {
            x0: 0,
            y0: 0,
            w: 1,
            h: 1,
            data: b"hi".to_vec(),
        };
        assert_eq!(cmd.to_string(), "draw image: 0 0 1 1 aGk=");
    }
}
