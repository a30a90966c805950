//! # netdraw protocol
//!
//! Remote drawing commands carried as UTF-8 text, one command per UDP
//! datagram. No handshake, no acknowledgement, no ordering: a receiver parses
//! whatever arrives, draws what is valid and reports the rest.
//!
//! ## Wire Format
//!
//! ```text
//! <keyword>: <parameters>
//! ```
//!
//! Split on the first colon; both halves are trimmed.
//!
//! ## Commands
//!
//! | # | Keyword | Parameters |
//! |---|---------|------------|
//! | 1 | `clear display` | `color` |
//! | 2 | `draw pixel` | `x,y,color` (comma separated) |
//! | 3 | `draw line` | `x0 y0 x1 y1 color` |
//! | 4 | `draw rectangle` | `x0 y0 w h color` |
//! | 5 | `fill rectangle` | `x0 y0 w h color` |
//! | 6 | `draw ellipse` | `x y rx ry color` (center, radii) |
//! | 7 | `fill ellipse` | `x y rx ry color` |
//! | 8 | `draw text` | `x y color font fontSize text...` |
//! | 9 | `draw image` | `x0 y0 w h base64-png` |
//! | 10 | `timer` | `x y fontSize color` |
//!
//! The numbers are the sender's menu shorthand and never go on the wire.
//! Colors are `#RRGGBB`, `#RGB` or a web color name (`red` or `Red`); anything else
//! is drawn white.

pub mod channel;
pub mod color;
mod command;
pub mod dispatcher;
pub mod grammar;
mod image;
pub mod logger;
pub mod parser;
pub mod receiver;
pub mod sink;
pub mod timer;

pub use channel::{ChannelError, DatagramChannel, MemoryChannel, UdpChannel, DEFAULT_PORT};
pub use color::Rgb;
pub use command::Command;
pub use dispatcher::Dispatcher;
pub use grammar::Keyword;
pub use image::Image;
pub use parser::{parse, ParseError, Reason};
pub use receiver::{Outcome, Receiver, Stats, Status};
pub use sink::{DrawingSink, Rect, SinkError, TextStyle};
pub use timer::{Timer, TimerState};
