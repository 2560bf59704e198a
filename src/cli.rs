//! CLI argument parsing for the UserStyle compile workflow.
//!
//! The CLI is thin: it resolves config and flags, then hands off to
//! `workflow`.
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "uscomp",
    version,
    about = "Compile a UserStyle stylus source into plain CSS",
    after_help = "Examples:\n  uscomp build --compress\n  uscomp build --verbose --no-sync\n  uscomp sync\n  uscomp extract --json\n  uscomp banner --date 2026-10-15\n  uscomp strip darkmode.css\n  uscomp unwrap darkmode.css",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Build config JSON (defaults to ./userstyle.json when present)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Emit debug logging; for `build`, also keep comments and temp files
    #[arg(long, short = 'v', visible_alias = "debug", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Build(BuildArgs),
    Sync(SyncArgs),
    Extract(ExtractArgs),
    Banner(BannerArgs),
    Strip(StripArgs),
    Unwrap(UnwrapArgs),
    Init(InitArgs),
}

/// Source/sibling overrides shared by commands that touch both files.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Stylus source (overrides config `source`)
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Plain CSS sibling (overrides config `sibling`)
    #[arg(long, value_name = "PATH")]
    pub sibling: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Sync, extract, reconstruct, compile, and clean the stylesheet")]
pub struct BuildArgs {
    #[command(flatten)]
    pub files: SourceArgs,

    /// Ask the compiler for compressed output
    #[arg(long, short = 'c')]
    pub compress: bool,

    /// Skip the source/sibling sync check
    #[arg(long)]
    pub no_sync: bool,

    /// Stamp the version banner before building
    #[arg(long)]
    pub banner: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Copy the newer of source and sibling over the older")]
pub struct SyncArgs {
    #[command(flatten)]
    pub files: SourceArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Print the extracted UserStyle block")]
pub struct ExtractArgs {
    #[command(flatten)]
    pub files: SourceArgs,

    /// Emit the block as JSON instead of rendered stylus
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Rewrite the version banner in source and sibling")]
pub struct BannerArgs {
    #[command(flatten)]
    pub files: SourceArgs,

    /// Date for the banner label (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,
}

#[derive(Parser, Debug)]
#[command(about = "Remove block comments from a compiled stylesheet in place")]
pub struct StripArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Remove the outer @-moz-document wrapper from a compiled stylesheet")]
pub struct UnwrapArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Write a userstyle.json config stub")]
pub struct InitArgs {
    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}
