//! Simple `log` backend that can write to stderr or a file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

/// Verbosity level for debug output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Warnings and errors only
    #[default]
    Quiet = 0,
    /// Lifecycle events and each handled command
    Verbose = 1,
    /// Every datagram and timer tick
    Trace = 2,
}

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Warn,
            Verbosity::Verbose => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// Output destination for logger
enum Output {
    Stderr,
    File(BufWriter<File>),
}

pub struct Logger {
    output: Mutex<Output>,
    verbosity: Verbosity,
}

impl Logger {
    /// Create a new logger writing to stderr
    pub fn stderr(verbosity: Verbosity) -> Self {
        Logger {
            output: Mutex::new(Output::Stderr),
            verbosity,
        }
    }

    /// Create a new logger writing to a file
    pub fn file(path: &str, verbosity: Verbosity) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Logger {
            output: Mutex::new(Output::File(BufWriter::new(file))),
            verbosity,
        })
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Install as the global logger
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let filter = self.verbosity.level_filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.verbosity.level_filter()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut output) = self.output.lock() {
            match &mut *output {
                Output::Stderr => {
                    eprintln!("{:<5} {}", record.level(), record.args());
                }
                Output::File(f) => {
                    let _ = writeln!(
                        f,
                        "{} {:<5} {}",
                        chrono::Local::now().format("%H:%M:%S%.3f"),
                        record.level(),
                        record.args()
                    );
                    let _ = f.flush();
                }
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut output) = self.output.lock() {
            if let Output::File(f) = &mut *output {
                let _ = f.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_verbosity_filters() {
        let quiet = Logger::stderr(Verbosity::Quiet);
        let meta = |level| Metadata::builder().level(level).build();
        assert!(quiet.enabled(&meta(Level::Warn)));
        assert!(!quiet.enabled(&meta(Level::Info)));

        let trace = Logger::stderr(Verbosity::Trace);
        assert!(trace.enabled(&meta(Level::Trace)));
        assert!(Verbosity::Trace > Verbosity::Verbose);
    }

    #[test]
    fn test_file_output() {
        let path = std::env::temp_dir().join(format!("netdraw-log-{}.txt", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        let logger = Logger::file(&path_str, Verbosity::Verbose).unwrap();
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("hello {}", 42))
                .build(),
        );
        logger.flush();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("INFO  hello 42"), "{:?}", written);
        let _ = std::fs::remove_file(&path);
    }
}
