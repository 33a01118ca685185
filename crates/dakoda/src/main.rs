use std::io::ErrorKind;
use std::process;

use clap::Parser;
use cli::{Args, Command};
use dakoda::config::Config;
use dakoda::error::{DakodaError, DakodaResult};
use jemallocator::Jemalloc;
use polars::error::PolarsError;
use rayon::ThreadPoolBuilder;

macro_rules! bail {
    ($($arg:tt)*) => {{
        return Err(dakoda::error::DakodaError::Other(format!($($arg)*)));
    }};
}

pub(crate) mod prelude {
    pub(crate) use dakoda::prelude::*;
    pub(crate) use dakoda::progress::ProgressBarBuilder;

    pub(crate) use crate::cli::Context;
}

mod cli;
mod commands;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn num_threads(args: &Args) -> usize {
    if let Some(num_threads) = args.num_jobs {
        return num_threads;
    }

    Config::discover(args.config.as_deref())
        .map(|config| config.num_jobs())
        .unwrap_or_default()
}

fn init_logger(args: &Args) {
    let level = if args.quiet {
        "off"
    } else if args.verbose {
        "debug"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level),
    )
    .format_timestamp(None)
    .init();
}

fn run(args: Args) -> DakodaResult<()> {
    let ctx = args.context();

    match args.cmd {
        Command::Check(cmd) => cmd.execute(&ctx),
        Command::Completions(cmd) => cmd.execute(),
        Command::Config(cmd) => cmd.execute(&ctx),
        Command::Diff(cmd) => cmd.execute(&ctx),
        Command::Index(cmd) => cmd.execute(&ctx),
        Command::Meta(cmd) => cmd.execute(&ctx),
        Command::Query(cmd) => cmd.execute(&ctx),
        Command::Random(cmd) => cmd.execute(&ctx),
        Command::Summary(cmd) => cmd.execute(&ctx),
        Command::Validate(cmd) => cmd.execute(&ctx),
    }
}

fn main() {
    let args = Args::parse();
    init_logger(&args);

    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(num_threads(&args))
        .build_global()
    {
        log::warn!("unable to configure the thread pool: {e}");
    }

    match run(args) {
        Ok(()) => process::exit(0),
        Err(DakodaError::IO(e)) if e.kind() == ErrorKind::BrokenPipe => {
            process::exit(0)
        }
        Err(DakodaError::Polars(PolarsError::IO { error, .. }))
            if error.kind() == ErrorKind::BrokenPipe =>
        {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}
