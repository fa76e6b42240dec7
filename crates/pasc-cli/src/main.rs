//! `pasc` - a command-line interpreter for a small Pascal-like language.
//!
//! `pasc <file>` compiles and runs a source file; bare `pasc` opens an
//! interactive REPL. See `pasc --help`.

mod config;
mod error;
mod repl;

use std::fs;
use std::path::PathBuf;

use clap::Parser as ClapParser;
use pasc_eval::Evaluator;
use pasc_par::Parser as PascParser;
use pasc_sem::SemanticAnalyzer;
use pasc_util::Handler;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use error::{CliError, Result};

/// Compile and run a small Pascal-like language.
#[derive(ClapParser, Debug)]
#[command(name = "pasc")]
#[command(author = "Pasc Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile and run a small Pascal-like language", long_about = None)]
struct Cli {
    /// Source file to run. Omit to start the interactive REPL.
    file: Option<PathBuf>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, env = "PASC_VERBOSE")]
    verbose: bool,

    /// Dump the global environment (`name = value`, sorted) on success.
    #[arg(long)]
    show_globals: bool,

    /// Path to a `pasc.toml` configuration file.
    #[arg(long, env = "PASC_CONFIG")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.render());
            std::process::exit(1);
        }
    };

    let result = match &cli.file {
        Some(path) => run_file(path, &config, cli.show_globals),
        None => repl::run(&config).map_err(CliError::Io),
    };

    if let Err(err) = result {
        eprintln!("{}", err.render());
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

fn run_file(path: &std::path::Path, config: &Config, show_globals: bool) -> Result<()> {
    let source = fs::read_to_string(path).map_err(|e| CliError::ReadSource {
        path: path.display().to_string(),
        source: e,
    })?;

    let program = PascParser::from_source(&source)?.parse_program()?;

    let handler = Handler::new();
    SemanticAnalyzer::new(&handler).analyze(&program)?;

    let mut eval = Evaluator::new().with_max_call_depth(config.max_call_depth);
    eval.interpret(&program)?;

    if show_globals || config.show_globals_on_success {
        let mut vars: Vec<_> = eval.globals().collect();
        vars.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in vars {
            println!("{name} = {value}");
        }
    }

    Ok(())
}
