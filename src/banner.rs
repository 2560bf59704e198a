//! Version banner substitution.
//!
//! The first placeholder line (`--version "..."`) is rewritten with a label
//! built from the first `@name` and `@version` fields seen above it.
use crate::util::{open_reader, strip_line, StagedFile};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::io::{BufRead, Write};
use std::path::Path;

/// Day-of-month suffix as a cascade of thresholds: 1 → st, 2 → nd, 3 → rd,
/// everything else → th. Days 21-23 and 31 therefore read `21th`, `22th`,
/// `23th` and `31th`.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if day < 2 {
        "st"
    } else if day < 3 {
        "nd"
    } else if day < 4 {
        "rd"
    } else {
        "th"
    }
}

pub fn banner_label(name: &str, version: &str, date: NaiveDate) -> String {
    format!(
        "{name} v{version} -- {} {}{}, {}",
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

struct BannerPatterns {
    name: Regex,
    version: Regex,
    placeholder: Regex,
}

impl BannerPatterns {
    fn new(placeholder: &str) -> Result<Self> {
        let placeholder = Regex::new(&format!(
            r#"^(\s*{}\s+)"[^"]*"(.*)$"#,
            regex::escape(placeholder)
        ))
        .context("compile banner placeholder pattern")?;
        Ok(Self {
            name: Regex::new(r"^\s*@name\s+(.+?)\s*$").context("compile name pattern")?,
            version: Regex::new(r"^\s*@version\s+(\S+)").context("compile version pattern")?,
            placeholder,
        })
    }
}

/// Copy `reader` to `out` with the first placeholder stamped. Line endings
/// pass through unchanged. Returns the generated label, if any.
pub fn apply_banner<R: BufRead, W: Write>(
    mut reader: R,
    placeholder: &str,
    date: NaiveDate,
    mut out: W,
) -> Result<Option<String>> {
    let patterns = BannerPatterns::new(placeholder)?;
    let mut name: Option<String> = None;
    let mut version: Option<String> = None;
    let mut label: Option<String> = None;
    let mut raw = String::new();

    loop {
        raw.clear();
        if reader.read_line(&mut raw).context("read banner line")? == 0 {
            break;
        }
        let line = strip_line(&raw);
        if name.is_none() {
            name = patterns.name.captures(line).map(|caps| caps[1].to_string());
        }
        if version.is_none() {
            version = patterns.version.captures(line).map(|caps| caps[1].to_string());
        }
        if label.is_none() {
            if let Some(caps) = patterns.placeholder.captures(line) {
                match (name.as_deref(), version.as_deref()) {
                    (Some(name), Some(version)) => {
                        let generated = banner_label(name, version, date);
                        write!(out, "{}\"{generated}\"{}", &caps[1], &caps[2])?;
                        out.write_all(raw[line.len()..].as_bytes())?;
                        label = Some(generated);
                        continue;
                    }
                    _ => tracing::warn!("version placeholder found before @name/@version"),
                }
            }
        }
        out.write_all(raw.as_bytes())?;
    }

    out.flush()?;
    Ok(label)
}

/// Rewrite the banner in `path` in place. Returns the generated label, or
/// `None` when no placeholder was substituted (the file is left untouched).
pub fn banner_file(path: &Path, placeholder: &str, date: NaiveDate) -> Result<Option<String>> {
    let mut staged = StagedFile::new(path)?;
    let label = apply_banner(open_reader(path)?, placeholder, date, &mut staged)?;
    if label.is_some() {
        staged.commit()?;
    }
    Ok(label)
}
