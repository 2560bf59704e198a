//! Strip the outer document wrapper from an already compiled stylesheet.
//!
//! The marker line is dropped and the wrapper's closing brace falls out of
//! [`BraceLookback`] as the final, never-emitted block tail.
use super::reconstruct::BraceLookback;
use crate::error::StyleError;
use crate::util::{open_reader, strip_line, StagedFile};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Stream `reader` into `out` without the marker line or its closing brace.
/// Returns `false` when no line starts with `marker`.
pub fn unwrap_document<R: BufRead, W: Write>(
    reader: R,
    marker: &str,
    mut out: W,
) -> Result<bool> {
    let mut lookback = BraceLookback::default();
    let mut found = false;
    for line in reader.lines() {
        let line = line.context("read stylesheet line")?;
        let line = strip_line(&line);
        if line.starts_with(marker) {
            found = true;
            continue;
        }
        lookback.push(line, &mut out)?;
    }
    lookback.finish(&mut out)?;
    out.flush()?;
    Ok(found)
}

pub fn unwrapped_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}.unwrapped.css"))
}

/// Unwrap `input` into `<stem>.unwrapped.css`. Returns the written path, or
/// `None` when the input carries no wrapper.
pub fn unwrap_file(input: &Path, marker: &str) -> Result<Option<PathBuf>> {
    if !input.is_file() {
        return Err(StyleError::MissingInput {
            path: input.to_path_buf(),
        }
        .into());
    }
    let out = unwrapped_path(input);
    let mut staged = StagedFile::new(&out)?;
    if !unwrap_document(open_reader(input)?, marker, &mut staged)? {
        tracing::info!(input = %input.display(), "no document wrapper found");
        return Ok(None);
    }
    staged.commit()?;
    Ok(Some(out))
}
