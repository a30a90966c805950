//! Command keywords and their parameter schemas.
//!
//! This table is the only place that knows how each command's parameter text
//! is laid out. The parser, the sender menu and the wire encoder all read it.

/// Primitive type of a single parameter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Color,
    FontName,
    FontSize,
    Text,
    Base64Image,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Int => "integer",
            FieldType::Color => "color",
            FieldType::FontName => "font name",
            FieldType::FontSize => "font size",
            FieldType::Text => "text",
            FieldType::Base64Image => "base64 image",
        };
        f.write_str(name)
    }
}

/// Token separator used in a command's parameter text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Any run of whitespace
    Space,
    Comma,
}

/// A named, typed parameter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

const fn field(name: &'static str, ty: FieldType) -> Field {
    Field { name, ty }
}

/// Parameter layout of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub separator: Separator,
    pub fields: &'static [Field],
    /// Last field takes the rest of the parameter text, separators included
    pub tail: bool,
}

impl Schema {
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Human-readable parameter list, e.g. `x0 y0 w h color`.
    pub fn usage(&self) -> String {
        let sep = match self.separator {
            Separator::Space => " ",
            Separator::Comma => ",",
        };
        let names: Vec<&str> = self.fields.iter().map(|f| f.name).collect();
        let mut usage = names.join(sep);
        if self.tail {
            usage.push_str("...");
        }
        usage
    }
}

use FieldType::*;

const COLOR_ONLY: Schema = Schema {
    separator: Separator::Space,
    fields: &[field("color", Color)],
    tail: false,
};

const PIXEL: Schema = Schema {
    separator: Separator::Comma,
    fields: &[field("x", Int), field("y", Int), field("color", Color)],
    tail: false,
};

const LINE: Schema = Schema {
    separator: Separator::Space,
    fields: &[
        field("x0", Int),
        field("y0", Int),
        field("x1", Int),
        field("y1", Int),
        field("color", Color),
    ],
    tail: false,
};

const RECTANGLE: Schema = Schema {
    separator: Separator::Space,
    fields: &[
        field("x0", Int),
        field("y0", Int),
        field("w", Int),
        field("h", Int),
        field("color", Color),
    ],
    tail: false,
};

const ELLIPSE: Schema = Schema {
    separator: Separator::Space,
    fields: &[
        field("x", Int),
        field("y", Int),
        field("rx", Int),
        field("ry", Int),
        field("color", Color),
    ],
    tail: false,
};

const TEXT: Schema = Schema {
    separator: Separator::Space,
    fields: &[
        field("x", Int),
        field("y", Int),
        field("color", Color),
        field("font", FontName),
        field("font_size", FontSize),
        field("text", Text),
    ],
    tail: true,
};

const IMAGE: Schema = Schema {
    separator: Separator::Space,
    fields: &[
        field("x0", Int),
        field("y0", Int),
        field("w", Int),
        field("h", Int),
        field("data", Base64Image),
    ],
    tail: false,
};

const TIMER: Schema = Schema {
    separator: Separator::Space,
    fields: &[
        field("x", Int),
        field("y", Int),
        field("font_size", FontSize),
        field("color", Color),
    ],
    tail: false,
};

/// The fixed set of command keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    ClearDisplay,
    DrawPixel,
    DrawLine,
    DrawRectangle,
    FillRectangle,
    DrawEllipse,
    FillEllipse,
    DrawText,
    DrawImage,
    Timer,
}

impl Keyword {
    /// All keywords, in sender menu order (selector 1 first).
    pub const ALL: [Keyword; 10] = [
        Keyword::ClearDisplay,
        Keyword::DrawPixel,
        Keyword::DrawLine,
        Keyword::DrawRectangle,
        Keyword::FillRectangle,
        Keyword::DrawEllipse,
        Keyword::FillEllipse,
        Keyword::DrawText,
        Keyword::DrawImage,
        Keyword::Timer,
    ];

    /// Wire spelling of the keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::ClearDisplay => "clear display",
            Keyword::DrawPixel => "draw pixel",
            Keyword::DrawLine => "draw line",
            Keyword::DrawRectangle => "draw rectangle",
            Keyword::FillRectangle => "fill rectangle",
            Keyword::DrawEllipse => "draw ellipse",
            Keyword::FillEllipse => "fill ellipse",
            Keyword::DrawText => "draw text",
            Keyword::DrawImage => "draw image",
            Keyword::Timer => "timer",
        }
    }

    /// Exact, case-sensitive lookup of a wire keyword.
    pub fn from_wire(s: &str) -> Option<Keyword> {
        Keyword::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            Keyword::ClearDisplay => &COLOR_ONLY,
            Keyword::DrawPixel => &PIXEL,
            Keyword::DrawLine => &LINE,
            Keyword::DrawRectangle | Keyword::FillRectangle => &RECTANGLE,
            Keyword::DrawEllipse | Keyword::FillEllipse => &ELLIPSE,
            Keyword::DrawText => &TEXT,
            Keyword::DrawImage => &IMAGE,
            Keyword::Timer => &TIMER,
        }
    }

    /// Sender-side numeric shorthand (1-10). Not part of the wire format.
    pub fn selector(self) -> u8 {
        Keyword::ALL
            .iter()
            .position(|k| *k == self)
            .map(|i| i as u8 + 1)
            .unwrap_or(0)
    }

    pub fn from_selector(s: &str) -> Option<Keyword> {
        let n: usize = s.trim().parse().ok()?;
        n.checked_sub(1).and_then(|i| Keyword::ALL.get(i)).copied()
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numbered command menu shown by the sender.
pub fn menu() -> String {
    let mut out = String::from("Commands:\n");
    for k in Keyword::ALL {
        out.push_str(&format!(
            "  {:>2}. {:<15} {}\n",
            k.selector(),
            k.as_str(),
            k.schema().usage()
        ));
    }
    out
}
