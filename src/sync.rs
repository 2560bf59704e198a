//! Keep the stylus source and its plain CSS sibling identical.
//!
//! Whichever file is newer (by modification time or by embedded `@version`)
//! is copied over the other.
use crate::config::SyncStrategy;
use crate::error::StyleError;
use crate::util::open_reader;
use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fs;
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    SourceToSibling,
    SiblingToSource,
    InSync,
}

pub fn sync_files(source: &Path, sibling: &Path, strategy: SyncStrategy) -> Result<SyncOutcome> {
    let outcome = match (source.is_file(), sibling.is_file()) {
        (true, false) => SyncOutcome::SourceToSibling,
        (false, true) => SyncOutcome::SiblingToSource,
        (false, false) => {
            return Err(StyleError::MissingSources {
                primary: source.to_path_buf(),
                sibling: sibling.to_path_buf(),
            }
            .into())
        }
        (true, true) => match compare(source, sibling, strategy)? {
            Ordering::Greater => SyncOutcome::SourceToSibling,
            Ordering::Less => SyncOutcome::SiblingToSource,
            Ordering::Equal => SyncOutcome::InSync,
        },
    };

    match outcome {
        SyncOutcome::SourceToSibling => copy(source, sibling)?,
        SyncOutcome::SiblingToSource => copy(sibling, source)?,
        SyncOutcome::InSync => {
            tracing::debug!(source = %source.display(), sibling = %sibling.display(), "files in sync")
        }
    }
    tracing::info!(?outcome, "file sync check done");
    Ok(outcome)
}

fn copy(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .with_context(|| format!("copy {} -> {}", from.display(), to.display()))?;
    tracing::debug!(from = %from.display(), to = %to.display(), "copied");
    Ok(())
}

fn compare(source: &Path, sibling: &Path, strategy: SyncStrategy) -> Result<Ordering> {
    match strategy {
        SyncStrategy::Mtime => {
            let source_time = modified(source)?;
            let sibling_time = modified(sibling)?;
            tracing::debug!(?source_time, ?sibling_time, "comparing timestamps");
            Ok(source_time.cmp(&sibling_time))
        }
        SyncStrategy::Version => {
            let source_version = embedded_version(open_reader(source)?)?;
            let sibling_version = embedded_version(open_reader(sibling)?)?;
            tracing::debug!(?source_version, ?sibling_version, "comparing versions");
            Ok(source_version.cmp(&sibling_version))
        }
    }
}

fn modified(path: &Path) -> Result<std::time::SystemTime> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("read modification time of {}", path.display()))
}

/// Dotted numeric version from the first `@version` line. Non-numeric
/// components compare as zero; a missing version sorts below any present one.
pub fn embedded_version<R: BufRead>(reader: R) -> Result<Option<Vec<u64>>> {
    for line in reader.lines() {
        let line = line.context("read version line")?;
        let Some(rest) = line.trim().strip_prefix("@version") else {
            continue;
        };
        let Some(raw) = rest.split_whitespace().next() else {
            continue;
        };
        return Ok(Some(
            raw.split('.')
                .map(|part| part.parse::<u64>().unwrap_or(0))
                .collect(),
        ));
    }
    Ok(None)
}
