//! Post-compile removal of leftover block comments.
//!
//! Comments whose opening line carries the protected marker (the UserStyle
//! header) pass through untouched.
use crate::error::StyleError;
use crate::util::{open_reader, strip_line, StagedFile};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;

const COMMENT_OPEN: &str = "/*";
const COMMENT_CLOSE: &str = "*/";

/// Copy `reader` to `out` minus unprotected block comments. Returns the
/// number of comments removed.
pub fn strip_comments<R: BufRead, W: Write>(
    reader: R,
    protected: &str,
    mut out: W,
) -> Result<usize> {
    let mut removed = 0;
    let mut within_comment = false;

    for line in reader.lines() {
        let line = line.context("read stylesheet line")?;
        let line = strip_line(&line);
        if within_comment {
            if line.contains(COMMENT_CLOSE) {
                within_comment = false;
                removed += 1;
            }
            continue;
        }
        let opens_comment = line.trim_start().starts_with(COMMENT_OPEN);
        if opens_comment && !line.contains(protected) {
            let after_open = &line.trim_start()[COMMENT_OPEN.len()..];
            if after_open.contains(COMMENT_CLOSE) {
                removed += 1;
            } else {
                within_comment = true;
            }
            continue;
        }
        writeln!(out, "{line}")?;
    }

    if within_comment {
        tracing::warn!("unterminated comment at end of file");
    }
    out.flush()?;
    Ok(removed)
}

/// Strip comments from `path` in place and return the removed count.
pub fn strip_file(path: &Path, protected: &str) -> Result<usize> {
    if !path.is_file() {
        return Err(StyleError::MissingInput {
            path: path.to_path_buf(),
        }
        .into());
    }
    tracing::info!(path = %path.display(), "cleaning leftover comments");
    let mut staged = StagedFile::new(path)?;
    let removed = strip_comments(open_reader(path)?, protected, &mut staged)?;
    staged.commit()?;
    println!("{removed} comments removed.");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTECTED: &str = "==UserStyle==";

    fn strip(text: &str) -> (String, usize) {
        let mut out = Vec::new();
        let removed = strip_comments(text.as_bytes(), PROTECTED, &mut out).expect("strip");
        (String::from_utf8(out).expect("utf-8 output"), removed)
    }

    const COMPILED: &str = "\
/* ==UserStyle==
@name Foo
==/UserStyle== */
/* single line */
body {
  color: #fff;
}
/*
 * multi
 * line
 */
a {
  color: #5288c1;
}
";

    #[test]
    fn removes_single_and_multi_line_comments() {
        let (text, removed) = strip(COMPILED);
        assert_eq!(removed, 2);
        assert_eq!(
            text,
            "/* ==UserStyle==\n@name Foo\n==/UserStyle== */\nbody {\n  color: #fff;\n}\na {\n  color: #5288c1;\n}\n"
        );
    }

    #[test]
    fn stripping_is_idempotent() {
        let (once, _) = strip(COMPILED);
        let (twice, removed) = strip(&once);
        assert_eq!(twice, once);
        assert_eq!(removed, 0);
    }

    #[test]
    fn protected_single_line_comment_survives() {
        let (text, removed) = strip("/* ==UserStyle== */\n");
        assert_eq!(removed, 0);
        assert_eq!(text, "/* ==UserStyle== */\n");
    }

    #[test]
    fn strip_file_rewrites_in_place() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("darkmode.css");
        std::fs::write(&path, COMPILED).expect("seed css");
        assert_eq!(strip_file(&path, PROTECTED).expect("strip"), 2);
        assert_eq!(strip_file(&path, PROTECTED).expect("strip again"), 0);
        let text = std::fs::read_to_string(&path).expect("read back");
        assert!(!text.contains("multi"));
    }
}
