//! Jarvis console binary - interactive prompt or one-shot commands

use jarvis::{CommandResult, Config, ConsoleLog, Dispatcher, SystemBackends};
use log::info;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    commands: Vec<String>,
    json: bool,
}

#[tokio::main]
async fn main() -> jarvis::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => return Ok(()),
        Err(message) => {
            eprintln!("{}", message);
            print_usage();
            std::process::exit(2);
        }
    };

    let config = Config::load(options.config.as_deref())?;
    info!("Loaded config: {:?}", config);
    let mut dispatcher = Dispatcher::from_config(&config);
    let mut log = ConsoleLog::new(config.log_capacity);

    if options.commands.is_empty() {
        return run_console(&mut dispatcher, &mut log, options.json).await;
    }

    let mut all_ok = true;
    for line in &options.commands {
        let mark = log.next_seq();
        let result = dispatcher.handle(line, &mut log).await;
        all_ok &= result.success;
        emit(&log, mark, &result, options.json)?;
    }
    if !all_ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Read commands from stdin until `exit`, `quit` or EOF
async fn run_console(
    dispatcher: &mut Dispatcher<SystemBackends>,
    log: &mut ConsoleLog,
    json: bool,
) -> jarvis::Result<()> {
    println!(
        "Welcome to Jarvis ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("Type 'help' for commands, 'exit' to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("jarvis> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if matches!(line.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let mark = log.next_seq();
        let result = dispatcher.handle(line, log).await;
        emit(log, mark, &result, json)?;
    }
    Ok(())
}

/// Print what one command produced
fn emit(log: &ConsoleLog, mark: u64, result: &CommandResult, json: bool) -> jarvis::Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    } else {
        for entry in log.since(mark) {
            println!("{}", entry);
        }
    }
    Ok(())
}

/// `Ok(None)` means the request was fully served (help, version)
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-v" => {
                println!("Jarvis v{}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "--json" => options.json = true,
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                options.config = Some(PathBuf::from(path));
            }
            "-c" | "--command" => {
                let line = iter.next().ok_or("-c needs a command")?;
                options.commands.push(line.clone());
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(Some(options))
}

fn print_usage() {
    println!("Jarvis - desktop and Android automation console");
    println!();
    println!("Usage: jarvis [--config <file>] [--json] [-c <command>]...");
    println!();
    println!("Options:");
    println!("  --config <file>     JSON configuration file");
    println!("  -c, --command <cmd> Run a command and exit (repeatable)");
    println!("  --json              Print each result as a JSON line");
    println!("  -h, --help          Show this help");
    println!("  -v, --version       Show version");
    println!();
    println!("Commands:");
    for line in jarvis::command::HELP {
        println!("  {}", line);
    }
    println!();
    println!("Environment: JARVIS_ADB_PATH, JARVIS_DEVICE, JARVIS_TIMEOUT_SECS, RUST_LOG");
}
