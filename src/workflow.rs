use crate::cli::{
    BannerArgs, BuildArgs, ExtractArgs, InitArgs, SourceArgs, StripArgs, SyncArgs, UnwrapArgs,
};
use crate::compiler::StylusCompiler;
use crate::config::{self, BuildConfig, DEFAULT_CONFIG_FILE};
use crate::pipeline::{self, BuildOptions};
use crate::strip::strip_file;
use crate::style::unwrap_file;
use crate::sync::SyncOutcome;
use crate::util::display_path;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Resolved invocation context shared by every command.
pub struct WorkflowContext {
    pub cwd: PathBuf,
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
}

impl WorkflowContext {
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let cwd = env::current_dir().context("resolve working directory")?;
        Ok(Self {
            cwd,
            config_path,
            verbose,
        })
    }

    fn load_config(&self, files: &SourceArgs) -> Result<BuildConfig> {
        let mut config = config::load_config(self.config_path.as_deref(), &self.cwd)?;
        if let Some(source) = &files.source {
            config.source = source.clone();
        }
        if let Some(sibling) = &files.sibling {
            config.sibling = sibling.clone();
        }
        config::validate_config(&config)?;
        Ok(config)
    }

    fn show(&self, path: &Path) -> String {
        display_path(path, Some(&self.cwd))
    }
}

pub fn run_build(ctx: &WorkflowContext, args: BuildArgs) -> Result<()> {
    let config = ctx.load_config(&args.files)?;
    let options = BuildOptions {
        compress: args.compress,
        verbose: ctx.verbose,
        sync: !args.no_sync,
        banner_date: args.banner.then(today),
    };
    let compiler = StylusCompiler::new(config.compiler.program.clone());
    let report = pipeline::build(&config, options, &compiler)?;
    tracing::debug!(
        sync = ?report.sync,
        comments_removed = ?report.comments_removed,
        "build finished"
    );

    if let Some(label) = &report.banner {
        println!("banner: {label}");
    }
    if ctx.verbose {
        println!("kept {}", ctx.show(&report.intermediate));
    }
    println!(
        "Compilation done ({} variables). Please check '{}'.",
        report.variables,
        ctx.show(&report.compiled)
    );
    Ok(())
}

pub fn run_sync(ctx: &WorkflowContext, args: SyncArgs) -> Result<()> {
    let config = ctx.load_config(&args.files)?;
    let outcome = pipeline::stage_sync(&config)?;
    let (source, sibling) = (ctx.show(&config.source), ctx.show(&config.sibling));
    match outcome {
        SyncOutcome::SourceToSibling => println!("{source} -> {sibling}"),
        SyncOutcome::SiblingToSource => println!("{sibling} -> {source}"),
        SyncOutcome::InSync => println!("{source} = {sibling}"),
    }
    Ok(())
}

pub fn run_extract(ctx: &WorkflowContext, args: ExtractArgs) -> Result<()> {
    let config = ctx.load_config(&args.files)?;
    let extracted = pipeline::stage_extract(&config, ctx.verbose)?;
    if args.json {
        let json =
            serde_json::to_string_pretty(&extracted.block).context("serialize block JSON")?;
        println!("{json}");
    } else {
        print!("{}", extracted.block.render_splice());
    }
    Ok(())
}

pub fn run_banner(ctx: &WorkflowContext, args: BannerArgs) -> Result<()> {
    let config = ctx.load_config(&args.files)?;
    let date = args.date.unwrap_or_else(today);
    match pipeline::stage_banner(&config, date)? {
        Some(label) => println!("banner: {label}"),
        None => println!("no banner placeholder found"),
    }
    Ok(())
}

pub fn run_strip(ctx: &WorkflowContext, args: StripArgs) -> Result<()> {
    let config = ctx.load_config(&SourceArgs::default())?;
    strip_file(&args.file, &config.protected_comment)?;
    Ok(())
}

pub fn run_unwrap(ctx: &WorkflowContext, args: UnwrapArgs) -> Result<()> {
    let config = ctx.load_config(&SourceArgs::default())?;
    match unwrap_file(&args.file, &config.marker)? {
        Some(out) => println!("wrote {}", ctx.show(&out)),
        None => println!("no document wrapper in {}", ctx.show(&args.file)),
    }
    Ok(())
}

pub fn run_init(ctx: &WorkflowContext, args: InitArgs) -> Result<()> {
    let path = ctx
        .config_path
        .clone()
        .unwrap_or_else(|| ctx.cwd.join(DEFAULT_CONFIG_FILE));
    config::write_config(&path, args.force)?;
    println!("wrote {}", ctx.show(&path));
    Ok(())
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
