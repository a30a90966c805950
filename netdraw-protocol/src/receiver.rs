//! The receive loop: one datagram at a time, parse, dispatch, report.
//!
//! Nothing a peer sends can stop the loop. Rejected datagrams and sink
//! failures are logged, recorded in [`Status`] and counted in [`Stats`].
//! Only a transport failure ends [`Receiver::run`].

use crate::channel::{ChannelError, DatagramChannel, MAX_DATAGRAM_SIZE};
use crate::dispatcher::Dispatcher;
use crate::grammar::Keyword;
use crate::parser::{self, ParseError, RawMessage};
use crate::sink::{DrawingSink, SinkError};

/// What happened to one datagram
#[derive(Debug)]
pub enum Outcome {
    Dispatched(Keyword),
    Rejected(ParseError),
    SinkFailed { command: Keyword, error: SinkError },
}

impl Outcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Outcome::Dispatched(_))
    }
}

/// Operator-facing status lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// Keyword of the last datagram, as sent
    pub command: String,
    /// Parameter text of the last datagram, as sent
    pub parameters: String,
    pub last_error: Option<String>,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Command: {}\nParameters: {}", self.command, self.parameters)?;
        if let Some(err) = &self.last_error {
            write!(f, "\nError: {}", err)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub received: u64,
    pub dispatched: u64,
    pub rejected: u64,
    pub sink_failures: u64,
}

type OutcomeHook<S> = Box<dyn FnMut(&Outcome, &mut S)>;

pub struct Receiver<C: DatagramChannel, S: DrawingSink> {
    channel: C,
    dispatcher: Dispatcher<S>,
    status: Status,
    stats: Stats,
    on_outcome: Option<OutcomeHook<S>>,
}

impl<C: DatagramChannel, S: DrawingSink> Receiver<C, S> {
    pub fn new(channel: C, dispatcher: Dispatcher<S>) -> Self {
        Receiver {
            channel,
            dispatcher,
            status: Status::default(),
            stats: Stats::default(),
            on_outcome: None,
        }
    }

    /// Called after every handled datagram, with access to the sink
    pub fn on_outcome<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Outcome, &mut S) + 'static,
    {
        self.on_outcome = Some(Box::new(hook));
        self
    }

    /// Receive and handle datagrams until the channel fails.
    pub fn run(&mut self) -> Result<(), ChannelError> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            let len = match self.channel.recv(&mut buf) {
                Ok(len) => len,
                Err(e) if e.is_transient() => {
                    log::debug!("[NET] receive interrupted: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.handle(&buf[..len]);
        }
    }

    /// Parse and dispatch one datagram, reporting any failure.
    pub fn handle(&mut self, datagram: &[u8]) -> Outcome {
        self.stats.received += 1;
        log::trace!("[RECV] datagram #{} ({} bytes)", self.stats.received, datagram.len());

        // Status shows what was sent, even if it fails to parse
        if let Some(msg) = std::str::from_utf8(datagram).ok().and_then(RawMessage::split) {
            self.status.command = msg.keyword.to_string();
            self.status.parameters = msg.params.to_string();
        } else {
            self.status.command = parser::UNKNOWN.to_string();
            self.status.parameters.clear();
        }

        let outcome = match parser::parse(datagram) {
            Ok(cmd) => {
                let keyword = cmd.keyword();
                match self.dispatcher.dispatch(cmd) {
                    Ok(()) => Outcome::Dispatched(keyword),
                    Err(error) => Outcome::SinkFailed {
                        command: keyword,
                        error,
                    },
                }
            }
            Err(e) => Outcome::Rejected(e),
        };

        match &outcome {
            Outcome::Dispatched(keyword) => {
                self.stats.dispatched += 1;
                self.status.last_error = None;
                log::info!("[RECV] {}: {}", keyword, self.status.parameters);
            }
            Outcome::Rejected(e) => {
                self.stats.rejected += 1;
                self.status.last_error = Some(e.to_string());
                log::warn!("[RECV] datagram discarded: {}", e);
            }
            Outcome::SinkFailed { command, error } => {
                self.stats.sink_failures += 1;
                self.status.last_error = Some(format!("'{}': {}", command, error));
                log::warn!("[RECV] '{}' could not be drawn: {}", command, error);
            }
        }
        log::debug!("[STATUS]\n{}", self.status);

        if let Some(hook) = self.on_outcome.as_mut() {
            hook(&outcome, self.dispatcher.sink_mut());
        }
        outcome
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    pub fn into_parts(self) -> (C, Dispatcher<S>) {
        (self.channel, self.dispatcher)
    }
}
