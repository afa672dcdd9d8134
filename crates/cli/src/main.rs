//! msgproc command-line interface.
//!
//! Usage:
//!   msgproc run process.suite.yaml
//!   msgproc run process.suite.yaml --test route --test echo --show-replies
//!   msgproc list process.suite.yaml
//!
//! Logging goes to stderr, filtered by `--log-level` or the `MSGPROC_LOG`
//! environment variable (default `warn`).

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use colored::Colorize;
use mp_core::config::load_suite;
use mp_core::engine::suite::{run_suite, CaseOutcome, CaseStatus};
use mp_core::processes::ProcessRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "MSGPROC_LOG";

#[derive(Parser, Debug)]
#[command(name = "msgproc", version)]
#[command(about = "Run message process test suites")]
struct Cli {
    /// Log filter, e.g. `debug` or `mp_core=trace` (overrides MSGPROC_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the cases of a suite file
    Run {
        /// Suite file (YAML, or JSON with a .json extension)
        file: PathBuf,

        /// Case to run; may be repeated. Overrides the suite's `test` field
        #[arg(long = "test", short = 't')]
        tests: Vec<String>,

        /// Print the last reply of every case
        #[arg(long)]
        show_replies: bool,
    },

    /// List the cases of a suite file
    List {
        /// Suite file
        file: PathBuf,
    },
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn print_outcome(outcome: &CaseOutcome, show_reply: bool) {
    match &outcome.status {
        CaseStatus::Passed => println!("{} {}", "PASS".green().bold(), outcome.name),
        CaseStatus::Failed(reason) => {
            println!("{} {}: {}", "FAIL".red().bold(), outcome.name, reason)
        }
    }
    if show_reply {
        if let Some(reply) = &outcome.reply {
            match serde_json::to_string_pretty(reply) {
                Ok(text) => println!("{}", text.dimmed()),
                Err(_) => println!("{}", reply.to_string().dimmed()),
            }
        }
    }
}

async fn run(file: PathBuf, tests: Vec<String>, show_replies: bool) -> color_eyre::Result<()> {
    let mut suite = load_suite(&file)
        .await
        .wrap_err_with(|| format!("cannot load {}", file.display()))?;
    if !tests.is_empty() {
        suite.test = Some(tests.join(" "));
    }

    let outcomes = run_suite(Arc::new(ProcessRegistry::default()), &suite)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("{e:#}"))?;
    for outcome in &outcomes {
        print_outcome(outcome, show_replies);
    }

    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    let summary = format!("{} passed, {} failed", outcomes.len() - failed, failed);
    if failed > 0 {
        println!("{}", summary.red());
        bail!("{failed} of {} cases failed", outcomes.len());
    }
    println!("{}", summary.green());
    Ok(())
}

async fn list(file: PathBuf) -> color_eyre::Result<()> {
    let suite = load_suite(&file)
        .await
        .wrap_err_with(|| format!("cannot load {}", file.display()))?;
    let selected = suite.selected_cases();
    for (name, case) in &suite.processes {
        let marker = if selected.contains(name) { "*" } else { " " };
        println!("{marker} {name:<24} {}", case.process.class.cyan());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Command::Run {
            file,
            tests,
            show_replies,
        } => run(file, tests, show_replies).await,
        Command::List { file } => list(file).await,
    }
}
