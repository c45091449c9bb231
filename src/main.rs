use argh::FromArgs;
use log::debug;
use std::io;
use tiny_shell::{Interpreter, Streams};

#[derive(FromArgs)]
/// A small interactive shell with a handful of builtins.
struct Args {
    /// prompt printed before every input line
    #[argh(option, default = "String::from(\"$ \")")]
    prompt: String,

    /// log filter, e.g. warn, debug or tiny_shell=trace. Overrides RUST_LOG.
    #[argh(option)]
    log_level: Option<String>,

    /// run a single command line and exit with its status
    #[argh(option, short = 'c')]
    command: Option<String>,
}

fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.init();
}

fn run_once(sh: &mut Interpreter, line: &str) -> i32 {
    let (stdout, stderr) = (io::stdout(), io::stderr());
    let (mut out, mut err) = (stdout.lock(), stderr.lock());
    let mut io = Streams::new(&mut out, &mut err);
    match sh.execute(line, &mut io) {
        Ok(code) => sh.exit_request().unwrap_or(code),
        Err(e) => {
            eprintln!("{e:#}");
            1
        }
    }
}

fn main() {
    let args: Args = argh::from_env();
    init_logging(args.log_level.as_deref());

    let mut sh = Interpreter::default();
    let code = match args.command {
        Some(line) => run_once(&mut sh, &line),
        None => match sh.repl(&args.prompt) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        },
    };

    debug!("exiting with status {code}");
    std::process::exit(code);
}
