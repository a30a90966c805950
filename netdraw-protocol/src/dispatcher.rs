//! Maps typed commands onto drawing sink primitives.

use crate::command::Command;
use crate::image::Image;
use crate::sink::{DrawingSink, Rect, SinkError, TextStyle};
use crate::timer::Timer;

/// Owns the sink and the timer label. Commands are applied one at a time.
pub struct Dispatcher<S: DrawingSink> {
    sink: S,
    timer: Timer,
}

impl<S: DrawingSink> Dispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self::with_timer(sink, Timer::default())
    }

    pub fn with_timer(sink: S, timer: Timer) -> Self {
        Dispatcher { sink, timer }
    }

    /// Apply one command.
    ///
    /// Sink failures are returned for the caller to report. An image payload
    /// that cannot be decoded, or an empty destination rectangle, is skipped
    /// without error.
    pub fn dispatch(&mut self, cmd: Command) -> Result<(), SinkError> {
        log::debug!("[DISPATCH] {}", cmd.keyword());
        match cmd {
            Command::ClearDisplay { color } => self.sink.set_background(color),
            Command::DrawPixel { x, y, color } => self.sink.set_pixel(x, y, color),
            Command::DrawLine {
                x0,
                y0,
                x1,
                y1,
                color,
            } => self.sink.draw_line(x0, y0, x1, y1, color),
            Command::DrawRectangle {
                x0,
                y0,
                w,
                h,
                color,
            } => self.sink.draw_rect(Rect::new(x0, y0, w, h), color),
            Command::FillRectangle {
                x0,
                y0,
                w,
                h,
                color,
            } => self.sink.fill_rect(Rect::new(x0, y0, w, h), color),
            Command::DrawEllipse { x, y, rx, ry, color } => {
                self.sink.draw_ellipse(Rect::around(x, y, rx, ry), color)
            }
            Command::FillEllipse { x, y, rx, ry, color } => {
                self.sink.fill_ellipse(Rect::around(x, y, rx, ry), color)
            }
            Command::DrawText {
                x,
                y,
                color,
                font,
                font_size,
                text,
            } => {
                let style = TextStyle {
                    color,
                    font,
                    font_size,
                };
                self.sink.draw_text(x, y, &style, &text)
            }
            Command::DrawImage { x0, y0, w, h, data } => {
                if w <= 0 || h <= 0 {
                    log::debug!("[DISPATCH] empty image rectangle {}x{}, skipped", w, h);
                    return Ok(());
                }
                match Image::decode(&data) {
                    Ok(image) => self.sink.blit_image(Rect::new(x0, y0, w, h), &image),
                    Err(e) => {
                        log::warn!("[DISPATCH] image payload ({} bytes) not drawn: {}", data.len(), e);
                        Ok(())
                    }
                }
            }
            Command::StartTimer {
                x,
                y,
                font_size,
                color,
            } => {
                self.timer.arm(x, y, font_size, color);
                Ok(())
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::parser::parse;
    use crate::sink::{RecordingSink, SinkCall};
    use std::time::Duration;

    const RED: Rgb = Rgb::new(255, 0, 0);

    fn png_2x1() -> Vec<u8> {
        Image::encode_png(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap()
    }

    fn dispatch_line(line: &str) -> Vec<SinkCall> {
        let mut d = Dispatcher::new(RecordingSink::new());
        d.dispatch(parse(line.as_bytes()).unwrap()).unwrap();
        d.into_sink().calls
    }

    #[test]
    fn test_one_call_per_command() {
        let style = TextStyle {
            color: RED,
            font: "Arial".to_string(),
            font_size: 12,
        };
        let cases = vec![
            ("clear display: red", SinkCall::SetBackground(RED)),
            ("draw pixel: 10,20,red", SinkCall::SetPixel(10, 20, RED)),
            ("draw line: 1 2 3 4 red", SinkCall::DrawLine(1, 2, 3, 4, RED)),
            (
                "draw rectangle: 1 2 30 40 red",
                SinkCall::DrawRect(Rect::new(1, 2, 30, 40), RED),
            ),
            (
                "fill rectangle: 1 2 30 40 red",
                SinkCall::FillRect(Rect::new(1, 2, 30, 40), RED),
            ),
            (
                "draw text: 3 4 red Arial 12 hi there",
                SinkCall::DrawText(3, 4, style, "hi there".to_string()),
            ),
        ];
        for (line, expected) in cases {
            assert_eq!(dispatch_line(line), vec![expected], "line {:?}", line);
        }
    }

    #[test]
    fn test_ellipse_center_to_bounding_box() {
        assert_eq!(
            dispatch_line("draw ellipse: 100 50 20 10 red"),
            vec![SinkCall::DrawEllipse(Rect::new(80, 40, 40, 20), RED)]
        );
        assert_eq!(
            dispatch_line("fill ellipse: 5 5 10 3 red"),
            vec![SinkCall::FillEllipse(Rect::new(-5, 2, 20, 6), RED)]
        );
    }

    #[test]
    fn test_draw_image_blits_into_rect() {
        let mut d = Dispatcher::new(RecordingSink::new());
        d.dispatch(Command::DrawImage {
            x0: 7,
            y0: 8,
            w: 20,
            h: 10,
            data: png_2x1(),
        })
        .unwrap();
        assert_eq!(
            d.sink().calls,
            vec![SinkCall::BlitImage(Rect::new(7, 8, 20, 10), 2, 1)]
        );
    }

    #[test]
    fn test_draw_image_skips_empty_rect_and_bad_payload() {
        let mut d = Dispatcher::new(RecordingSink::new());
        for (w, h) in [(0, 10), (10, 0), (-1, 5)] {
            d.dispatch(Command::DrawImage {
                x0: 0,
                y0: 0,
                w,
                h,
                data: png_2x1(),
            })
            .unwrap();
        }
        d.dispatch(Command::DrawImage {
            x0: 0,
            y0: 0,
            w: 5,
            h: 5,
            data: b"not an image".to_vec(),
        })
        .unwrap();
        assert!(d.sink().calls.is_empty());
    }

    #[test]
    fn test_sink_failure_is_returned() {
        let mut d = Dispatcher::new(RecordingSink::new().fail_on("fill_rect"));
        let err = d
            .dispatch(parse(b"fill rectangle: 0 0 1 1 red").unwrap())
            .unwrap_err();
        assert!(matches!(err, SinkError::Unsupported("fill_rect")));
        // The dispatcher is still usable afterwards
        d.dispatch(parse(b"draw pixel: 0,0,red").unwrap()).unwrap();
        assert_eq!(d.sink().calls.len(), 2);
    }

    #[test]
    fn test_timer_arms_without_sink_calls() {
        let timer = Timer::new(Duration::from_millis(20));
        let mut d = Dispatcher::with_timer(RecordingSink::new(), timer);
        d.dispatch(parse(b"timer: 10 20 16 red").unwrap()).unwrap();
        d.dispatch(parse(b"timer: 30 40 18 blue").unwrap()).unwrap();

        assert!(d.sink().calls.is_empty());
        assert_eq!(d.timer().ticker_spawns(), 1);
        let state = d.timer().state();
        assert!(state.visible);
        assert_eq!((state.x, state.y, state.font_size), (30, 40, 18));
        assert_eq!(state.color, Rgb::new(0, 0, 255));
    }
}
