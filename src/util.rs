use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Drop a trailing `\r\n`, `\n`, or bare `\r` from a single line.
pub fn strip_line(line: &str) -> &str {
    if let Some(stripped) = line.strip_suffix("\r\n") {
        return stripped;
    }
    line.strip_suffix('\n')
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

pub fn open_reader(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Buffered output staged in a temp file beside `target`.
///
/// `commit` moves it over `target`; dropping it uncommitted deletes the temp
/// file and leaves `target` as it was.
pub struct StagedFile {
    target: PathBuf,
    writer: BufWriter<NamedTempFile>,
}

impl StagedFile {
    pub fn new(target: &Path) -> Result<Self> {
        let dir = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        let tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("create temp file in {}", dir.display()))?;
        Ok(Self {
            target: target.to_path_buf(),
            writer: BufWriter::new(tmp),
        })
    }

    pub fn commit(self) -> Result<()> {
        let StagedFile { target, writer } = self;
        let tmp = writer
            .into_inner()
            .map_err(|err| anyhow!("flush {}: {}", target.display(), err.error()))?;
        tmp.persist(&target)
            .map_err(|err| anyhow!("replace {}: {}", target.display(), err.error))?;
        Ok(())
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}

pub fn truncate_string(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut truncated = String::new();
    for ch in text.chars() {
        if truncated.len() + ch.len_utf8() > max_bytes {
            break;
        }
        truncated.push(ch);
    }
    truncated
}
