use netdraw_protocol::logger::Verbosity;
use netdraw_protocol::DEFAULT_PORT;

const HELP: &str = "\
netdraw receiver - draws commands received over UDP

USAGE:
  netdraw-receiver [OPTIONS]

OPTIONS:
  -h, --help              Prints help information
  --bind <host:port>      Listen address (default: 0.0.0.0:12345)
  --port <n>              Listen on 0.0.0.0:<n> (ignored with --bind)
  --sink <text|raster>    Drawing sink (default: text)
  --width <n>             Raster width (default: 640)
  --height <n>            Raster height (default: 480)
  --snapshot <file.png>   Raster sink: write a PNG after each drawn command
  -v, --verbose           Show each handled command
  -vv, --trace            Show every datagram and timer tick
  --log <file>            Write log output to file instead of stderr
";

/// Which drawing sink renders the commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// One line per primitive on stdout
    Text,
    /// In-memory framebuffer
    Raster,
}

impl std::str::FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(SinkKind::Text),
            "raster" => Ok(SinkKind::Raster),
            other => Err(format!("unknown sink '{}' (expected text or raster)", other)),
        }
    }
}

#[derive(Debug)]
pub struct AppArgs {
    pub bind: String,
    pub sink: SinkKind,
    pub width: u32,
    pub height: u32,
    pub snapshot: Option<String>,
    pub verbosity: Verbosity,
    pub log_file: Option<String>,
}

/// Listen address from `--bind`/`--port`. `--bind` wins when both are given.
fn bind_address(bind: Option<String>, port: Option<u16>) -> String {
    match (bind, port) {
        (Some(bind), Some(port)) => {
            eprintln!("Warning: --port {} ignored, listening on --bind {}.", port, bind);
            bind
        }
        (Some(bind), None) => bind,
        (None, port) => format!("0.0.0.0:{}", port.unwrap_or(DEFAULT_PORT)),
    }
}

pub fn parse_args() -> Result<AppArgs, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        std::process::exit(0);
    }

    let verbosity = if pargs.contains("--trace") || pargs.contains("-vv") {
        Verbosity::Trace
    } else if pargs.contains(["-v", "--verbose"]) {
        Verbosity::Verbose
    } else {
        Verbosity::Quiet
    };

    let port: Option<u16> = pargs.opt_value_from_str("--port")?;
    let bind: Option<String> = pargs.opt_value_from_str("--bind")?;

    let args = AppArgs {
        bind: bind_address(bind, port),
        sink: pargs
            .opt_value_from_str("--sink")?
            .unwrap_or(SinkKind::Text),
        width: pargs.opt_value_from_str("--width")?.unwrap_or(640),
        height: pargs.opt_value_from_str("--height")?.unwrap_or(480),
        snapshot: pargs.opt_value_from_str("--snapshot")?,
        verbosity,
        log_file: pargs.opt_value_from_str("--log")?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        eprintln!("Warning: unused arguments left: {:?}.", remaining);
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_kind() {
        assert_eq!("text".parse::<SinkKind>(), Ok(SinkKind::Text));
        assert_eq!("raster".parse::<SinkKind>(), Ok(SinkKind::Raster));
        assert!("sdl".parse::<SinkKind>().is_err());
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(bind_address(None, None), "0.0.0.0:12345");
        assert_eq!(bind_address(None, Some(9000)), "0.0.0.0:9000");
        assert_eq!(bind_address(Some("127.0.0.1:7000".to_string()), None), "127.0.0.1:7000");
        assert_eq!(
            bind_address(Some("127.0.0.1:7000".to_string()), Some(9000)),
            "127.0.0.1:7000"
        );
    }
}
