mod parse_args;

use anyhow::Context;
use netdraw_protocol::grammar::{self, Keyword};
use netdraw_protocol::logger::Logger;
use netdraw_protocol::parser;
use netdraw_protocol::{DatagramChannel, UdpChannel};
use parse_args::{parse_args, AppArgs};

use std::io::{self, BufRead, Write};

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
            Ok(l) => l,
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

    if args.list {
        print!("{}", grammar::menu());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Wire line for a menu selector and its free-text parameters
fn build_line(selector: &str, params: &str) -> Option<String> {
    let keyword = Keyword::from_selector(selector)?;
    Some(format!("{}: {}", keyword, params.trim()))
}

/// Split an interactive line into selector and parameters
fn split_input(line: &str) -> (&str, &str) {
    let line = line.trim();
    line.split_once(char::is_whitespace).unwrap_or((line, ""))
}

fn run(args: &AppArgs) -> anyhow::Result<()> {
    let mut channel = UdpChannel::connect(args.to.as_str())
        .with_context(|| format!("cannot resolve receiver address {}", args.to))?;
    log::debug!("[NET] sending to {}", args.to);

    if let Some((selector, params)) = args.command.split_first() {
        return send(&mut channel, selector, &params.join(" "));
    }

    print!("{}", grammar::menu());
    println!("Enter '<number> <parameters>', empty line to quit.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            break;
        }
        let (selector, params) = split_input(&line);
        // A failed send does not end the session
        if let Err(e) = send(&mut channel, selector, params) {
            eprintln!("Error: {:#}", e);
        }
    }
    Ok(())
}

fn send(channel: &mut UdpChannel, selector: &str, params: &str) -> anyhow::Result<()> {
    let Some(line) = build_line(selector, params) else {
        println!("Invalid command number");
        return Ok(());
    };

    match parser::parse_str(&line) {
        Ok(cmd) => log::trace!("[PREVIEW] receiver will draw: {}", cmd),
        Err(e) => log::trace!("[PREVIEW] receiver will reject: {}", e),
    }

    channel
        .send(line.as_bytes())
        .with_context(|| format!("sending '{}'", line))?;
    log::info!("[SEND] {}", line);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_line() {
        assert_eq!(
            build_line("2", "10,20,red"),
            Some("draw pixel: 10,20,red".to_string())
        );
        assert_eq!(
            build_line("8", " 5 5 blue Arial 12 hello world "),
            Some("draw text: 5 5 blue Arial 12 hello world".to_string())
        );
        assert_eq!(build_line("10", "0 0 14 black"), Some("timer: 0 0 14 black".to_string()));
    }

    #[test]
    fn test_invalid_selector() {
        assert_eq!(build_line("0", "red"), None);
        assert_eq!(build_line("11", "red"), None);
        assert_eq!(build_line("x", "red"), None);
    }

    #[test]
    fn test_split_input() {
        assert_eq!(split_input("1 red"), ("1", "red"));
        assert_eq!(split_input("  3   1 2 3 4 red"), ("3", "  1 2 3 4 red"));
        assert_eq!(split_input("1"), ("1", ""));
    }

    #[test]
    fn test_built_lines_parse() {
        let line = build_line("5", "0 0 10 10 #00ff00").unwrap();
        assert!(parser::parse_str(&line).is_ok());
        let line = build_line("4", "0 0 10").unwrap();
        assert!(parser::parse_str(&line).is_err());
    }
}
