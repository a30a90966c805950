use netdraw_protocol::channel::DEFAULT_HOST;
use netdraw_protocol::logger::Verbosity;
use netdraw_protocol::DEFAULT_PORT;

const HELP: &str = "\
netdraw sender - sends drawing commands over UDP

USAGE:
  netdraw-sender [OPTIONS] [<selector> <params...>]

With a selector, sends one command and exits. Without one, reads
'<selector> <params...>' lines from stdin until an empty line or EOF.

OPTIONS:
  -h, --help              Prints help information
  --to <host:port>        Receiver address (default: 127.0.0.1:12345)
  --list                  Print the numbered command menu and exit
  -v, --verbose           Show each sent datagram
  -vv, --trace            Also show how the receiver will parse it
  --log <file>            Write log output to file instead of stderr
";

#[derive(Debug)]
pub struct AppArgs {
    pub to: String,
    pub list: bool,
    pub verbosity: Verbosity,
    pub log_file: Option<String>,
    /// Selector followed by the parameter words, if given
    pub command: Vec<String>,
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

    let to: Option<String> = pargs.opt_value_from_str("--to")?;
    let list = pargs.contains("--list");
    let log_file = pargs.opt_value_from_str("--log")?;

    let command = pargs
        .finish()
        .into_iter()
        .map(|s| s.to_string_lossy().into_owned())
        .collect();

    Ok(AppArgs {
        to: to.unwrap_or_else(|| format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT)),
        list,
        verbosity,
        log_file,
        command,
    })
}
