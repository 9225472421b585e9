/*!
 * Command-line interface for ctxtools
 */

use std::io;
use std::process::ExitCode;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use ctxtools::clipboard::{Clipboard, StdoutClipboard, SystemClipboard};
use ctxtools::commands::{deliver, Commands, Outcome};
use ctxtools::config::{Args, CommandKind, Config};
use ctxtools::host::LocalHost;
use ctxtools::report::{CopyReport, ReportFormat, Reporter};
use ctxtools::Result;

fn init_logging() {
    let filter = EnvFilter::try_from_env("CTXTOOLS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_args(&args)?;
    config.validate()?;
    tracing::debug!(
        workspace = ?config.workspace,
        settings = ?config.settings_path,
        "configuration loaded"
    );

    let host = LocalHost::from_config(&config)?;
    let commands = Commands::new(&host, &config.settings);
    let command = args.command.clone().unwrap_or(CommandKind::Doc { paths: Vec::new() });

    let start = Instant::now();
    let outcome = commands.run(&command)?;
    let duration = start.elapsed();

    match &outcome {
        Outcome::Notice(msg) => eprintln!("{}", msg),
        Outcome::Shown(text) => println!("{}", text),
        Outcome::Copied(copied) => {
            let (sink, destination): (Box<dyn Clipboard>, &str) = if config.print {
                (Box::new(StdoutClipboard), "stdout")
            } else {
                (Box::new(SystemClipboard::detect()?), "clipboard")
            };
            deliver(&outcome, sink.as_ref())?;
            eprintln!("{}", copied.status);

            if config.report {
                let report = CopyReport::from_copied(copied, destination, duration);
                Reporter::new(ReportFormat::ConsoleTable).print_report(&report);
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "ctxtools", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_logging();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
