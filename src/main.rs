#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Result};
use flush::banner;
use flush::config::{BannerShow, ShellConfig};
use flush::executor::Executor;
use flush::input::{BufReadSource, EditorSource, LineSource};
use flush::logging;
use flush::prompt::FlushPrompt;
use flush::repl::{self, LoopExit};
use flush::signal::SignalHandler;
use std::env;
use std::io;
use std::process;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Options {
    command: Option<String>,
    no_rc: bool,
    no_banner: bool,
}

enum Action {
    Run(Options),
    Help,
    Version,
}

fn parse_args(args: &[String]) -> Result<Action> {
    let mut options = Options::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" => match iter.next() {
                Some(line) => options.command = Some(line.clone()),
                None => bail!("-c requires a command line"),
            },
            "--no-rc" => options.no_rc = true,
            "--no-banner" => options.no_banner = true,
            "-h" | "--help" => return Ok(Action::Help),
            "-V" | "--version" => return Ok(Action::Version),
            other => bail!("unknown argument '{}'", other),
        }
    }

    Ok(Action::Run(options))
}

fn print_help() {
    println!("flush v{} - a small interactive shell", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  flush                 Start interactive shell");
    println!("  flush -c <line>       Execute one line and exit");
    println!("  flush --no-rc         Skip ~/.flushrc");
    println!("  flush --no-banner     Do not print the startup banner");
    println!("  flush -V, --version   Show version");
    println!("  flush -h, --help      Show this help message");
    println!();
    println!("Examples:");
    println!("  flush -c \"ls -la > listing.txt\"");
    println!("  echo \"sort < in.txt | uniq\" | flush");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let options = match parse_args(&args) {
        Ok(Action::Run(options)) => options,
        Ok(Action::Help) => {
            print_help();
            return;
        }
        Ok(Action::Version) => {
            println!("flush {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Err(e) => {
            eprintln!("flush: {}", e);
            eprintln!("Try 'flush --help' for more information.");
            process::exit(2);
        }
    };

    match run(options) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("flush: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(options: Options) -> Result<i32> {
    let mut config = ShellConfig::load(options.no_rc);
    if options.no_banner {
        config.banner = BannerShow::Never;
    }

    if let Err(e) = logging::init(&config) {
        eprintln!("flush: logging disabled: {:#}", e);
    }
    info!(version = env!("CARGO_PKG_VERSION"), "flush starting");

    let mut executor = Executor::new();

    if let Some(line) = options.command {
        let outcome = executor.execute_line(&line);
        debug!(?outcome, "single command finished");
        return Ok(0);
    }

    let signals = SignalHandler::new();
    signals.setup()?;

    let prompt = FlushPrompt::from_config(&config);
    let interactive = atty::is(atty::Stream::Stdin);

    let mut source: Box<dyn LineSource> = if interactive {
        if config.banner == BannerShow::Always {
            banner::display_banner(config.prompt_color)?;
        }
        Box::new(EditorSource::new())
    } else {
        Box::new(BufReadSource::new(io::stdin().lock()))
    };

    let exit = match repl::run(source.as_mut(), &mut executor, &prompt, &signals) {
        Ok(exit) => exit,
        Err(e) => {
            eprintln!("flush: error reading input: {}", e);
            return Ok(1);
        }
    };

    if exit == LoopExit::EndOfInput {
        if interactive {
            println!();
        }
        println!("{}", repl::END_OF_INPUT_NOTICE);
    }
    debug!(?exit, jobs = executor.runtime().jobs().len(), "leaving");
    Ok(exit.exit_code())
}
