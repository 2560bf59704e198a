//! Typed failures raised by the compile workflow.
//!
//! Stage functions return `anyhow::Result`; these variants are the cases a
//! caller may want to match on after downcasting.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    /// A required input file does not exist.
    #[error("missing input {}", path.display())]
    MissingInput { path: PathBuf },

    /// Neither the stylus source nor its plain CSS sibling exists.
    #[error("cannot find '{}' or '{}'", primary.display(), sibling.display())]
    MissingSources { primary: PathBuf, sibling: PathBuf },

    /// No line of the source starts with the document marker.
    #[error("no line starts with '{marker}'")]
    MissingMarker { marker: String },

    /// The compiler could not be located on PATH.
    #[error("compiler '{program}' not found on PATH")]
    CompilerNotFound { program: String },

    /// The compiler transcript lacks the configured success marker.
    #[error("couldn't compile with {program}: {output}")]
    CompileFailure { program: String, output: String },

    /// The compiler reported success but produced no output file.
    #[error("couldn't find compiled CSS file {}", path.display())]
    MissingCompiledArtifact { path: PathBuf },

    /// A declaration line does not have the expected token layout.
    #[error("malformed declaration on line {line}: {reason}")]
    MalformedDeclaration { line: usize, reason: String },
}

impl StyleError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        StyleError::MalformedDeclaration {
            line,
            reason: reason.into(),
        }
    }
}
