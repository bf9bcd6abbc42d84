//! mosaicsh - line-mode front end
//!
//! Reads command lines from stdin, runs them through a [`Shell`] and prints
//! each finished exchange. Ctrl-C interrupts running commands.

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use mosaicsh::config::ConfigLoader;
use mosaicsh::{AppliedEvent, Config, Exchange, Payload, Shell};

/// Command line options
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Write the effective configuration here and exit
    write_config: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> anyhow::Result<Self> {
        Self::parse_from(env::args().collect())
    }

    fn parse_from(args: Vec<String>) -> anyhow::Result<Self> {
        let mut app_args = AppArgs::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    let path = args.get(i + 1).context("Missing config file path")?;
                    app_args.config_path = Some(PathBuf::from(path));
                    i += 1;
                }
                "--write-config" => {
                    let path = args.get(i + 1).context("Missing output file path")?;
                    app_args.write_config = Some(PathBuf::from(path));
                    i += 1;
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--help" | "-h" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-v" => {
                    println!("{} v{}", mosaicsh::NAME, mosaicsh::VERSION);
                    process::exit(0);
                }
                arg if arg.starts_with('-') => {
                    anyhow::bail!("Unknown option: {}", arg);
                }
                arg => {
                    warn!("Ignoring positional argument: {}", arg);
                }
            }
            i += 1;
        }

        Ok(app_args)
    }
}

/// Print help information
fn print_help() {
    println!("mosaicsh - a line-mode shell with structured history");
    println!();
    println!("USAGE:");
    println!("    mosaicsh [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>    Path to configuration file");
    println!("    --write-config <PATH>  Write the effective configuration to PATH and exit");
    println!("    -d, --debug            Enable debug logging");
    println!("    -h, --help             Print this help message");
    println!("    -v, --version          Print version information");
    println!();
    println!("CONFIGURATION:");
    println!("    mosaicsh looks for configuration files in the following order:");
    println!("    1. Path specified with --config");
    println!("    2. ./mosaicsh.toml (or .json)");
    println!("    3. <config dir>/mosaicsh/config.toml (or .json)");
    println!("    4. Built-in defaults");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AppArgs::parse().unwrap_or_else(|e| {
        eprintln!("Failed to parse arguments: {}", e);
        print_help();
        process::exit(1);
    });

    let log_level = if args.debug {
        "mosaicsh=debug"
    } else {
        "mosaicsh=info"
    };
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = load_configuration(&args)?;
    if let Some(path) = &args.write_config {
        write_configuration(&config, path)?;
        return Ok(());
    }
    let mut shell = mosaicsh::create_shell(config).context("Failed to create shell")?;

    run(&mut shell).await
}

/// Load configuration from `--config` or the default locations
fn load_configuration(args: &AppArgs) -> anyhow::Result<Config> {
    match &args.config_path {
        Some(path) => mosaicsh::init_with_config(path).map_err(|e| {
            error!("{}", mosaicsh::handle_startup_error(&e));
            anyhow::Error::new(e)
        }),
        None => Ok(mosaicsh::init()),
    }
}

/// Save `config` to `path`, as TOML or JSON by extension
fn write_configuration(config: &Config, path: &Path) -> anyhow::Result<()> {
    ConfigLoader::save_to_path(config, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote configuration to {}", path.display());
    Ok(())
}

/// The read-submit-print loop
async fn run(shell: &mut Shell) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let prompt = prompt_for(shell);
        print!("{}", prompt);
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                continue;
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };
        if line.trim() == "exit" {
            break;
        }

        let stderr_seen = shell.stderr_history().len();
        let Some(id) = shell.submit(&prompt, &line) else {
            continue;
        };

        while shell.is_running(id) {
            tokio::select! {
                applied = shell.next_event() => match applied {
                    Some(AppliedEvent::Completed(done)) if done != id => {
                        debug!("Unrelated exchange {} completed", done);
                    }
                    Some(_) => {}
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    let signalled = shell.interrupt().await;
                    info!("Interrupted {} running command(s)", signalled);
                }
            }
        }

        if let Some(exchange) = shell.stdout_history().get(id) {
            print_exchange(exchange);
        }
        for exchange in shell.stderr_history().entries().iter().skip(stderr_seen) {
            eprintln!("{}", exchange.payload.text());
        }
    }

    Ok(())
}

/// `"<directory name> % "`
fn prompt_for(shell: &Shell) -> String {
    let directory = shell.context().current_directory();
    let name = directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| directory.display().to_string());
    format!("{} % ", name)
}

fn print_exchange(exchange: &Exchange) {
    match &exchange.payload {
        Payload::Image(Some(bytes)) => {
            let format = exchange
                .payload
                .image_format()
                .map(|f| format!("{:?}", f))
                .unwrap_or_else(|| "unknown".to_string());
            println!("[image: {} bytes, {}]", bytes.len(), format);
        }
        Payload::Image(None) => println!("[image: undecodable]"),
        payload => {
            let text = payload.text();
            if !text.is_empty() {
                println!("{}", text);
            }
        }
    }

    if let Some(status) = exchange.exit_status().filter(|s| *s != 0) {
        println!("[exit {}]", status);
    }
}
