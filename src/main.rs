use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod banner;
mod cli;
mod compiler;
mod config;
mod error;
mod pipeline;
mod strip;
mod style;
mod sync;
mod util;
mod workflow;

use cli::{Command, RootArgs};
use workflow::WorkflowContext;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let ctx = WorkflowContext::new(args.config, args.verbose)?;
    match args.command {
        Command::Build(build) => workflow::run_build(&ctx, build),
        Command::Sync(sync) => workflow::run_sync(&ctx, sync),
        Command::Extract(extract) => workflow::run_extract(&ctx, extract),
        Command::Banner(banner) => workflow::run_banner(&ctx, banner),
        Command::Strip(strip) => workflow::run_strip(&ctx, strip),
        Command::Unwrap(unwrap) => workflow::run_unwrap(&ctx, unwrap),
        Command::Init(init) => workflow::run_init(&ctx, init),
    }
}

/// `RUST_LOG` wins; otherwise info, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "uscomp=debug" } else { "uscomp=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
