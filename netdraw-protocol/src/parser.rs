//! Datagram parsing and validation.
//!
//! Parsing is pure: it turns the bytes of one datagram into a [`Command`] or a
//! [`ParseError`] and never touches a drawing sink.

use base64::Engine;

use crate::color;
use crate::command::Command;
use crate::grammar::{Field, FieldType, Keyword, Schema, Separator};

/// Command name reported when no keyword could be matched
pub const UNKNOWN: &str = "unknown";

/// Why a datagram was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Reason {
    #[error("unknown command")]
    UnknownCommand,
    #[error("expected {expected} parameters, got {found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("parameter '{field}' is not a valid {expected}: {value:?}")]
    TypeMismatch {
        field: &'static str,
        expected: FieldType,
        value: String,
    },
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// A rejected datagram: the command it claimed to be, and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{command}': {reason}")]
pub struct ParseError {
    pub command: String,
    pub reason: Reason,
}

impl ParseError {
    fn new(command: impl Into<String>, reason: Reason) -> Self {
        ParseError {
            command: command.into(),
            reason,
        }
    }

    fn unknown(reason: Reason) -> Self {
        Self::new(UNKNOWN, reason)
    }
}

/// `<keyword>: <parameters>`, split on the first colon and trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage<'a> {
    pub keyword: &'a str,
    pub params: &'a str,
}

impl<'a> RawMessage<'a> {
    pub fn split(text: &'a str) -> Option<RawMessage<'a>> {
        let (keyword, params) = text.split_once(':')?;
        Some(RawMessage {
            keyword: keyword.trim(),
            params: params.trim(),
        })
    }
}

/// Parse one datagram.
pub fn parse(raw: &[u8]) -> Result<Command, ParseError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| ParseError::unknown(Reason::MalformedPayload(e.to_string())))?;
    parse_str(text)
}

/// Parse an already decoded datagram.
pub fn parse_str(text: &str) -> Result<Command, ParseError> {
    let msg = RawMessage::split(text).ok_or_else(|| ParseError::unknown(Reason::UnknownCommand))?;
    let keyword =
        Keyword::from_wire(msg.keyword).ok_or_else(|| ParseError::unknown(Reason::UnknownCommand))?;

    let schema = keyword.schema();
    let tokens = tokenize(msg.params, schema);
    let fail = |reason| ParseError::new(keyword.as_str(), reason);

    if tokens.len() != schema.arity() {
        return Err(fail(Reason::ArityMismatch {
            expected: schema.arity(),
            found: tokens.len(),
        }));
    }

    let mut values = Vec::with_capacity(tokens.len());
    for (field, token) in schema.fields.iter().zip(tokens) {
        values.push(convert(field, token).map_err(fail)?);
    }

    build(keyword, values).map_err(fail)
}

/// Split parameter text per the schema. A tail field keeps the remainder.
fn tokenize<'a>(params: &'a str, schema: &Schema) -> Vec<&'a str> {
    if params.is_empty() {
        return Vec::new();
    }

    let is_sep = |c: char| match schema.separator {
        Separator::Space => c.is_whitespace(),
        Separator::Comma => c == ',',
    };

    if !schema.tail {
        return match schema.separator {
            Separator::Space => params.split_whitespace().collect(),
            Separator::Comma => params.split(',').map(str::trim).collect(),
        };
    }

    let mut tokens = Vec::with_capacity(schema.arity());
    let mut rest = params;
    for _ in 1..schema.arity() {
        rest = rest.trim_start_matches(is_sep).trim_start();
        if rest.is_empty() {
            return tokens;
        }
        let end = rest.find(is_sep).unwrap_or(rest.len());
        tokens.push(rest[..end].trim());
        rest = &rest[end..];
    }
    let tail = rest.trim_start_matches(is_sep).trim();
    if !tail.is_empty() {
        tokens.push(tail);
    }
    tokens
}

/// A single converted parameter.
enum Value {
    Int(i32),
    Color(color::Rgb),
    Str(String),
    Bytes(Vec<u8>),
}

fn convert(field: &Field, token: &str) -> Result<Value, Reason> {
    match field.ty {
        FieldType::Int | FieldType::FontSize => {
            token
                .parse::<i32>()
                .map(Value::Int)
                .map_err(|_| Reason::TypeMismatch {
                    field: field.name,
                    expected: field.ty,
                    value: token.to_string(),
                })
        }
        FieldType::Color => Ok(Value::Color(color::resolve(token))),
        FieldType::FontName | FieldType::Text => Ok(Value::Str(token.to_string())),
        FieldType::Base64Image => base64::engine::general_purpose::STANDARD
            .decode(token)
            .map(Value::Bytes)
            .map_err(|e| Reason::MalformedPayload(format!("{}: {}", field.name, e))),
    }
}

/// Typed cursor over converted values, in schema order.
struct Values {
    keyword: Keyword,
    it: std::vec::IntoIter<Value>,
}

impl Values {
    fn int(&mut self) -> Result<i32, Reason> {
        match self.it.next() {
            Some(Value::Int(v)) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    fn color(&mut self) -> Result<color::Rgb, Reason> {
        match self.it.next() {
            Some(Value::Color(c)) => Ok(c),
            _ => Err(self.mismatch()),
        }
    }

    fn string(&mut self) -> Result<String, Reason> {
        match self.it.next() {
            Some(Value::Str(s)) => Ok(s),
            _ => Err(self.mismatch()),
        }
    }

    fn bytes(&mut self) -> Result<Vec<u8>, Reason> {
        match self.it.next() {
            Some(Value::Bytes(b)) => Ok(b),
            _ => Err(self.mismatch()),
        }
    }

    /// Only reachable if the grammar table and `build` disagree.
    fn mismatch(&self) -> Reason {
        Reason::MalformedPayload(format!(
            "schema for '{}' does not match its command",
            self.keyword
        ))
    }
}

fn build(keyword: Keyword, values: Vec<Value>) -> Result<Command, Reason> {
    let mut v = Values {
        keyword,
        it: values.into_iter(),
    };

    let cmd = match keyword {
        Keyword::ClearDisplay => Command::ClearDisplay { color: v.color()? },
        Keyword::DrawPixel => Command::DrawPixel {
            x: v.int()?,
            y: v.int()?,
            color: v.color()?,
        },
        Keyword::DrawLine => Command::DrawLine {
            x0: v.int()?,
            y0: v.int()?,
            x1: v.int()?,
            y1: v.int()?,
            color: v.color()?,
        },
        Keyword::DrawRectangle => Command::DrawRectangle {
            x0: v.int()?,
            y0: v.int()?,
            w: v.int()?,
            h: v.int()?,
            color: v.color()?,
        },
        Keyword::FillRectangle => Command::FillRectangle {
            x0: v.int()?,
            y0: v.int()?,
            w: v.int()?,
            h: v.int()?,
            color: v.color()?,
        },
        Keyword::DrawEllipse => Command::DrawEllipse {
            x: v.int()?,
            y: v.int()?,
            rx: v.int()?,
            ry: v.int()?,
            color: v.color()?,
        },
        Keyword::FillEllipse => Command::FillEllipse {
            x: v.int()?,
            y: v.int()?,
            rx: v.int()?,
            ry: v.int()?,
            color: v.color()?,
        },
        Keyword::DrawText => Command::DrawText {
            x: v.int()?,
            y: v.int()?,
            color: v.color()?,
            font: v.string()?,
            font_size: v.int()?,
            text: v.string()?,
        },
        Keyword::DrawImage => Command::DrawImage {
            x0: v.int()?,
            y0: v.int()?,
            w: v.int()?,
            h: v.int()?,
            data: v.bytes()?,
        },
        Keyword::Timer => Command::StartTimer {
            x: v.int()?,
            y: v.int()?,
            font_size: v.int()?,
            color: v.color()?,
        },
    };
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    const RED: Rgb = Rgb::new(255, 0, 0);

    fn reason(raw: &str) -> Reason {
        parse(raw.as_bytes()).unwrap_err().reason
    }

    #[test]
    fn test_draw_pixel() {
        let cmd = parse(b"draw pixel: 10,20,red").unwrap();
        assert_eq!(
            cmd,
            Command::DrawPixel {
                x: 10,
                y: 20,
                color: RED
            }
        );
    }

    #[test]
    fn test_draw_pixel_trims_around_commas() {
        let cmd = parse(b"  draw pixel :  10 , 20 ,  #f00  ").unwrap();
        assert_eq!(
            cmd,
            Command::DrawPixel {
                x: 10,
                y: 20,
                color: RED
            }
        );
    }

    #[test]
    fn test_wrong_arity() {
        let err = parse(b"draw rectangle: 1 2 3").unwrap_err();
        assert_eq!(err.command, "draw rectangle");
        assert_eq!(
            err.reason,
            Reason::ArityMismatch {
                expected: 5,
                found: 3
            }
        );
        assert_eq!(
            reason("draw pixel: 1 2 red"),
            Reason::ArityMismatch {
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn test_empty_params_is_arity_mismatch() {
        assert_eq!(
            reason("clear display:"),
            Reason::ArityMismatch {
                expected: 1,
                found: 0
            }
        );
        assert_eq!(
            reason("timer:   "),
            Reason::ArityMismatch {
                expected: 4,
                found: 0
            }
        );
    }

    #[test]
    fn test_type_mismatch_names_first_field() {
        let err = parse(b"draw line: a 2 3 4 red").unwrap_err();
        assert_eq!(err.command, "draw line");
        match err.reason {
            Reason::TypeMismatch { field, value, .. } => {
                assert_eq!(field, "x0");
                assert_eq!(value, "a");
            }
            other => panic!("unexpected reason {:?}", other),
        }

        match reason("draw text: 1 2 red Arial big hello") {
            Reason::TypeMismatch { field, expected, .. } => {
                assert_eq!(field, "font_size");
                assert_eq!(expected, FieldType::FontSize);
            }
            other => panic!("unexpected reason {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command() {
        let err = parse(b"teleport: 1 2 3").unwrap_err();
        assert_eq!(err.command, UNKNOWN);
        assert_eq!(err.reason, Reason::UnknownCommand);
        assert_eq!(reason("draw line 1 2 3 4 red"), Reason::UnknownCommand);
        assert_eq!(reason("Draw Line: 1 2 3 4 red"), Reason::UnknownCommand);
        assert_eq!(reason(""), Reason::UnknownCommand);
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = parse(&[0x64, 0x72, 0xff, 0xfe, 0x3a]).unwrap_err();
        assert_eq!(err.command, UNKNOWN);
        assert!(matches!(err.reason, Reason::MalformedPayload(_)));
    }

    #[test]
    fn test_bad_color_is_not_an_error() {
        let cmd = parse(b"clear display: #12345").unwrap();
        assert_eq!(cmd, Command::ClearDisplay { color: Rgb::WHITE });
    }

    #[test]
    fn test_draw_text_tail_keeps_separators() {
        let cmd = parse(b"draw text: 5 6 blue Arial 12 hello  wide world: 12:00").unwrap();
        assert_eq!(
            cmd,
            Command::DrawText {
                x: 5,
                y: 6,
                color: Rgb::new(0, 0, 255),
                font: "Arial".to_string(),
                font_size: 12,
                text: "hello  wide world: 12:00".to_string(),
            }
        );
    }

    #[test]
    fn test_draw_text_missing_text() {
        assert_eq!(
            reason("draw text: 5 6 blue Arial 12"),
            Reason::ArityMismatch {
                expected: 6,
                found: 5
            }
        );
    }

    #[test]
    fn test_extra_whitespace_between_tokens() {
        let cmd = parse(b"fill ellipse:  50\t60   7 8  green ").unwrap();
        assert_eq!(
            cmd,
            Command::FillEllipse {
                x: 50,
                y: 60,
                rx: 7,
                ry: 8,
                color: Rgb::new(0, 128, 0)
            }
        );
    }

    #[test]
    fn test_draw_image() {
        let cmd = parse(b"draw image: 1 2 30 40 aGVsbG8=").unwrap();
        assert_eq!(
            cmd,
            Command::DrawImage {
                x0: 1,
                y0: 2,
                w: 30,
                h: 40,
                data: b"hello".to_vec()
            }
        );
    }

    #[test]
    fn test_bad_base64_is_malformed() {
        let err = parse(b"draw image: 1 2 30 40 not*base64").unwrap_err();
        assert_eq!(err.command, "draw image");
        assert!(matches!(err.reason, Reason::MalformedPayload(_)));
    }

    #[test]
    fn test_integer_checked_before_payload() {
        assert!(matches!(
            reason("draw image: x 2 30 40 not*base64"),
            Reason::TypeMismatch { field: "x0", .. }
        ));
    }

    #[test]
    fn test_timer() {
        let cmd = parse(b"timer: 10 20 16 #00ff00").unwrap();
        assert_eq!(
            cmd,
            Command::StartTimer {
                x: 10,
                y: 20,
                font_size: 16,
                color: Rgb::new(0, 255, 0)
            }
        );
    }

    #[test]
    fn test_encoded_commands_parse_back() {
        let commands = vec![
            Command::ClearDisplay { color: Rgb::BLACK },
            Command::DrawRectangle {
                x0: -1,
                y0: 2,
                w: 30,
                h: 40,
                color: RED,
            },
            Command::DrawText {
                x: 1,
                y: 2,
                color: RED,
                font: "Courier".to_string(),
                font_size: 9,
                text: "a b, c".to_string(),
            },
            Command::DrawImage {
                x0: 0,
                y0: 0,
                w: 2,
                h: 2,
                data: vec![0, 1, 2, 250],
            },
        ];
        for cmd in commands {
            assert_eq!(parse(&cmd.encode()).unwrap(), cmd);
        }
    }

    #[test]
    fn test_raw_message_split() {
        let msg = RawMessage::split(" draw text : 1 2 red a 3 x:y ").unwrap();
        assert_eq!(msg.keyword, "draw text");
        assert_eq!(msg.params, "1 2 red a 3 x:y");
        assert!(RawMessage::split("no separator").is_none());
    }
}
