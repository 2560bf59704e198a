//! Named build stages.
//!
//! Each stage takes the previous stage's output as a typed input, so the
//! extract → reconstruct ordering is carried by the types rather than by
//! shared state.
use crate::banner::banner_file;
use crate::compiler::{CompileOptions, StylesheetCompiler};
use crate::config::BuildConfig;
use crate::error::StyleError;
use crate::strip::strip_file;
use crate::style::{extract_file, reconstruct_file, Block, ExtractOptions};
use crate::sync::{sync_files, SyncOutcome};
use crate::util::truncate_string;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_TRANSCRIPT_BYTES: usize = 4096;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub compress: bool,
    /// Keep comments, blank lines, and the intermediate file; skip stripping.
    pub verbose: bool,
    pub sync: bool,
    /// Stamp the version banner into source and sibling before extraction.
    pub banner_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub sync: Option<SyncOutcome>,
    pub banner: Option<String>,
    pub variables: usize,
    pub intermediate: PathBuf,
    pub compiled: PathBuf,
    pub comments_removed: Option<usize>,
}

/// Extracted block plus the source it came from.
pub struct Extracted {
    pub source: PathBuf,
    pub block: Block,
}

/// Reconstructed intermediate stylus file awaiting compilation.
pub struct Reconstructed {
    pub path: PathBuf,
}

/// Compiled stylesheet confirmed present on disk.
pub struct Compiled {
    pub path: PathBuf,
}

pub fn ensure_styl_source(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(StyleError::MissingInput {
            path: path.to_path_buf(),
        }
        .into());
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some("styl") {
        return Err(anyhow!("not a styl file: {}", path.display()));
    }
    Ok(())
}

pub fn stage_sync(config: &BuildConfig) -> Result<SyncOutcome> {
    sync_files(&config.source, &config.sibling, config.sync_strategy)
}

/// Stamp the banner into the source and, when present, its sibling.
pub fn stage_banner(config: &BuildConfig, date: NaiveDate) -> Result<Option<String>> {
    let mut label = None;
    for path in [&config.source, &config.sibling] {
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "skipping banner for missing file");
            continue;
        }
        match banner_file(path, &config.banner.placeholder, date)? {
            Some(generated) => {
                tracing::info!(path = %path.display(), label = %generated, "stamped banner");
                label = Some(generated);
            }
            None => tracing::info!(path = %path.display(), "no banner placeholder"),
        }
    }
    Ok(label)
}

pub fn stage_extract(config: &BuildConfig, verbose: bool) -> Result<Extracted> {
    ensure_styl_source(&config.source)?;
    let block = extract_file(&config.source, ExtractOptions { verbose })?;
    Ok(Extracted {
        source: config.source.clone(),
        block,
    })
}

pub fn stage_reconstruct(config: &BuildConfig, extracted: &Extracted) -> Result<Reconstructed> {
    let path = config.intermediate_path();
    reconstruct_file(&extracted.source, &extracted.block, &config.marker, &path)?;
    Ok(Reconstructed { path })
}

/// Run the compiler and confirm both its success marker and its output file.
/// The intermediate file is removed unless `keep_intermediate` is set, even
/// when the compiler itself fails.
pub fn stage_compile(
    compiler: &dyn StylesheetCompiler,
    reconstructed: Reconstructed,
    options: CompileOptions,
    success_marker: &str,
    keep_intermediate: bool,
) -> Result<Compiled> {
    let result = compiler.compile(&reconstructed.path, options);
    if !keep_intermediate {
        tracing::info!(path = %reconstructed.path.display(), "removing temp styl file");
        if let Err(err) = fs::remove_file(&reconstructed.path) {
            if result.is_ok() {
                return Err(err)
                    .with_context(|| format!("remove {}", reconstructed.path.display()));
            }
            tracing::warn!(
                path = %reconstructed.path.display(),
                %err,
                "couldn't remove temp styl file"
            );
        }
    }

    let output = result?;
    let transcript = output.transcript.trim_end();
    if !transcript.is_empty() {
        println!("{transcript}");
    }

    if !output.transcript.contains(success_marker) {
        return Err(StyleError::CompileFailure {
            program: compiler.program().to_string(),
            output: truncate_string(transcript, MAX_TRANSCRIPT_BYTES),
        }
        .into());
    }
    if !output.output_path.is_file() {
        return Err(StyleError::MissingCompiledArtifact {
            path: output.output_path,
        }
        .into());
    }
    Ok(Compiled {
        path: output.output_path,
    })
}

pub fn stage_strip(config: &BuildConfig, compiled: &Compiled) -> Result<usize> {
    strip_file(&compiled.path, &config.protected_comment)
}

/// Sync → banner → extract → reconstruct → compile → strip.
pub fn build(
    config: &BuildConfig,
    options: BuildOptions,
    compiler: &dyn StylesheetCompiler,
) -> Result<BuildReport> {
    let sync = if options.sync {
        Some(stage_sync(config)?)
    } else {
        None
    };
    let banner = match options.banner_date {
        Some(date) => stage_banner(config, date)?,
        None => None,
    };

    let extracted = stage_extract(config, options.verbose)?;
    let variables = extracted.block.vars().count();
    let reconstructed = stage_reconstruct(config, &extracted)?;
    let intermediate = reconstructed.path.clone();

    let compile_options = CompileOptions {
        compress: options.compress,
        line_numbers: options.verbose,
    };
    let compiled = stage_compile(
        compiler,
        reconstructed,
        compile_options,
        &config.compiler.success_marker,
        options.verbose,
    )?;

    let comments_removed = if options.verbose {
        None
    } else {
        Some(stage_strip(config, &compiled)?)
    };

    Ok(BuildReport {
        sync,
        banner,
        variables,
        intermediate,
        compiled: compiled.path,
        comments_removed,
    })
}
