mod parse_args;
mod raster;
mod text_sink;

use anyhow::Context;
use netdraw_protocol::logger::Logger;
use netdraw_protocol::timer::TICK_INTERVAL;
use netdraw_protocol::{Dispatcher, DrawingSink, Receiver, Timer, TimerState, UdpChannel};
use parse_args::{parse_args, AppArgs, SinkKind};
use raster::RasterSink;
use text_sink::TextSink;

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error parsing arguments: {}", e);
            std::process::exit(1);
        }
    };

    // Set up logger
    let logger = match &args.log_file {
        Some(path) => match Logger::file(path, args.verbosity) {
            Ok(l) => {
                eprintln!("Logging to: {}", path);
                l
            }
            Err(e) => {
                eprintln!("Failed to open log file '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => Logger::stderr(args.verbosity),
    };
    if let Err(e) = logger.install() {
        eprintln!("Failed to install logger: {}", e);
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Print the timer label whenever it ticks
fn print_timer(state: &TimerState) {
    if state.visible {
        println!(
            "[TIMER] {} at ({}, {}) {}pt {}",
            state.text, state.x, state.y, state.font_size, state.color
        );
    }
}

fn run(args: &AppArgs) -> anyhow::Result<()> {
    let channel = UdpChannel::bind(args.bind.as_str())
        .with_context(|| format!("cannot listen on {}", args.bind))?;
    let local = channel.local_addr()?;
    eprintln!("Listening on {}", local);

    let timer = Timer::new(TICK_INTERVAL).with_observer(print_timer);

    match args.sink {
        SinkKind::Text => {
            let sink = TextSink::new(std::io::stdout());
            serve(Receiver::new(channel, Dispatcher::with_timer(sink, timer)))
        }
        SinkKind::Raster => {
            let sink = RasterSink::new(args.width, args.height);
            log::info!("[RASTER] {}x{} surface", args.width, args.height);
            let receiver = Receiver::new(channel, Dispatcher::with_timer(sink, timer));
            match args.snapshot.clone() {
                Some(path) => serve(receiver.on_outcome(move |outcome, sink: &mut RasterSink| {
                    if !outcome.is_dispatched() {
                        return;
                    }
                    match sink.save_snapshot(&path) {
                        Ok(()) => log::trace!("[RASTER] snapshot written to {}", path),
                        Err(e) => log::warn!("[RASTER] cannot write snapshot {}: {}", path, e),
                    }
                })),
                None => serve(receiver),
            }
        }
    }
}

fn serve<S: DrawingSink>(mut receiver: Receiver<UdpChannel, S>) -> anyhow::Result<()> {
    let result = receiver.run();
    let stats = receiver.stats();
    log::info!(
        "[RECV] {} received, {} drawn, {} rejected, {} sink failures",
        stats.received,
        stats.dispatched,
        stats.rejected,
        stats.sink_failures
    );
    log::debug!("[RECV] last status:\n{}", receiver.status());
    result.context("receive loop stopped")
}
