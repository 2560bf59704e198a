//! External stylesheet compiler.
//!
//! Compilers are opaque: the workflow only sees the captured transcript and
//! the path the output is expected at.
use crate::error::StyleError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub compress: bool,
    pub line_numbers: bool,
}

#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Captured stdout followed by stderr.
    pub transcript: String,
    /// Where the compiled stylesheet is expected.
    pub output_path: PathBuf,
}

pub trait StylesheetCompiler {
    fn program(&self) -> &str;

    fn compile(&self, input: &Path, options: CompileOptions) -> Result<CompileOutput>;
}

/// Compiled output lands beside the input with a `.css` extension.
pub fn compiled_path(input: &Path) -> PathBuf {
    input.with_extension("css")
}

/// Runs the `stylus` CLI (or a compatible program) found on PATH.
pub struct StylusCompiler {
    program: String,
}

impl StylusCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(options: CompileOptions) -> Vec<&'static str> {
        let mut args = Vec::new();
        if options.compress {
            args.push("--compress");
        }
        if options.line_numbers {
            args.push("--line-numbers");
        }
        args
    }
}

impl StylesheetCompiler for StylusCompiler {
    fn program(&self) -> &str {
        &self.program
    }

    fn compile(&self, input: &Path, options: CompileOptions) -> Result<CompileOutput> {
        let binary = which::which(&self.program).map_err(|_| StyleError::CompilerNotFound {
            program: self.program.clone(),
        })?;
        let args = Self::args(options);
        tracing::info!(program = %binary.display(), ?args, input = %input.display(), "compiling");
        let output = Command::new(&binary)
            .args(&args)
            .arg(input)
            .output()
            .with_context(|| format!("run {}", binary.display()))?;

        let mut transcript = String::from_utf8_lossy(&output.stdout).to_string();
        transcript.push_str(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            tracing::warn!(status = ?output.status.code(), "compiler exited unsuccessfully");
        }
        Ok(CompileOutput {
            transcript,
            output_path: compiled_path(input),
        })
    }
}
