//! Rewrite a stylus source around its extracted block.
//!
//! Everything up to the marker line is dropped, the block is spliced in at
//! the marker, the `:root` block is elided and custom-property accesses are
//! inlined as bare names. Output flows through [`BraceLookback`], which holds
//! each block tail back until the next one arrives and never emits the last.
use super::classify::{is_block_tail, is_root_open, PROPERTY_ACCESS_OPEN};
use super::model::Block;
use crate::error::StyleError;
use crate::util::{open_reader, strip_line, StagedFile};
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Two-slot buffer pairing block tails with the content that precedes them.
///
/// - `push` of a content line appends it to `pending_content`.
/// - `push` of a block tail emits `pending_block_tail` (if any) followed by
///   `pending_content`, then parks the new tail and clears the content.
/// - `finish` emits `pending_content` only; the parked tail is discarded.
#[derive(Debug, Default)]
pub struct BraceLookback {
    pending_block_tail: Option<String>,
    pending_content: String,
}

impl BraceLookback {
    pub fn push<W: Write + ?Sized>(&mut self, line: &str, out: &mut W) -> io::Result<()> {
        if is_block_tail(line) {
            if let Some(tail) = self.pending_block_tail.take() {
                out.write_all(tail.as_bytes())?;
            }
            out.write_all(self.pending_content.as_bytes())?;
            self.pending_content.clear();
            self.pending_block_tail = Some(format!("{line}\n"));
        } else {
            self.pending_content.push_str(line);
            self.pending_content.push('\n');
        }
        Ok(())
    }

    /// Flush trailing content. Returns the dropped block tail, if one was
    /// parked.
    pub fn finish<W: Write + ?Sized>(self, out: &mut W) -> io::Result<Option<String>> {
        out.write_all(self.pending_content.as_bytes())?;
        Ok(self.pending_block_tail)
    }
}

/// Remove `var(--` wrappers, leaving the bare property name.
///
/// Only the first `)` after each opener is removed.
pub fn inline_property_refs(line: &str) -> String {
    if !line.contains(PROPERTY_ACCESS_OPEN) {
        return line.to_string();
    }
    let mut parts = line.split(PROPERTY_ACCESS_OPEN);
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        out.push_str(&part.replacen(')', "", 1));
    }
    out
}

/// Stream source lines into `out` rebuilt around `block`, anchored at the
/// first line starting with `marker`.
///
/// Fails with [`StyleError::MissingMarker`] when no line starts with
/// `marker`; nothing has been written to `out` in that case.
pub fn reconstruct<R: BufRead, W: Write>(
    reader: R,
    block: &Block,
    marker: &str,
    mut out: W,
) -> Result<()> {
    let mut lookback = BraceLookback::default();
    let mut ignoring = true;
    let mut within_root = false;

    for line in reader.lines() {
        let line = line.context("read source line")?;
        let line = strip_line(&line);
        if ignoring {
            if line.starts_with(marker) {
                out.write_all(block.render_splice().as_bytes())?;
                ignoring = false;
            }
            continue;
        }
        if within_root {
            if line.contains('}') {
                within_root = false;
            }
            continue;
        }
        if is_root_open(line) {
            within_root = true;
            continue;
        }
        lookback.push(&inline_property_refs(line), &mut out)?;
    }

    if ignoring {
        return Err(StyleError::MissingMarker {
            marker: marker.to_string(),
        }
        .into());
    }
    if let Some(tail) = lookback.finish(&mut out)? {
        tracing::debug!(tail = %tail.trim_end(), "dropped final block tail");
    }
    out.flush()?;
    Ok(())
}

/// Reconstruct `source` into `out_path`. The output only appears once the
/// whole file has been rebuilt.
pub fn reconstruct_file(source: &Path, block: &Block, marker: &str, out_path: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(StyleError::MissingInput {
            path: source.to_path_buf(),
        }
        .into());
    }
    tracing::info!(out = %out_path.display(), "generating temporary style file");
    let mut staged = StagedFile::new(out_path)?;
    reconstruct(open_reader(source)?, block, marker, &mut staged)
        .with_context(|| format!("reconstruct {}", source.display()))?;
    staged.commit()
}
