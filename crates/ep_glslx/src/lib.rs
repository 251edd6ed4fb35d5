//! Client for the external `glslx` shader compiler.
//!
//! The shader inliner hands candidate string literals to a [`ShaderCompiler`]
//! and only ever sees a structured outcome: either a list of compiled
//! shaders, or the compiler's diagnostic log. Transport failures (binary
//! missing, malformed payload) are a separate error type so callers can
//! decide whether to recover — the pipeline treats both the same way and
//! leaves the literal untouched.
//!
//! `glslx` is invoked with renaming disabled (the surrounding JavaScript
//! references shader symbols by name) and JSON output:
//! `{"shaders": [{"name": ..., "contents": ...}], "log": ...}`.

use std::io::Write;
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// One compiled shader from the compiler's output payload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ShaderEntry {
    #[serde(default)]
    pub name: String,
    pub contents: String,
}

/// What the compiler said about one source string.
#[derive(Debug)]
pub enum CompileOutcome {
    /// Empty diagnostic log; the payload carried compiled shaders.
    Compiled { shaders: Vec<ShaderEntry> },
    /// The compiler rejected the input. The log is for the caller to
    /// report; the input must be left as it was.
    Rejected { log: String },
}

/// Failure to talk to the compiler at all, as opposed to a rejection.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("failed to run `{bin}`: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{bin}` produced an invalid payload: {source}")]
    Payload {
        bin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The seam between the pipeline and the external shader compiler.
pub trait ShaderCompiler {
    fn compile(&self, source: &str) -> Result<CompileOutcome, CompilerError>;
}

/// JSON payload of `glslx --format=json`.
#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    log: String,
    #[serde(default)]
    shaders: Vec<ShaderEntry>,
}

/// Subprocess client for the `glslx` binary.
pub struct GlslxCli {
    bin: String,
}

impl GlslxCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Default for GlslxCli {
    fn default() -> Self {
        Self::new("glslx")
    }
}

impl ShaderCompiler for GlslxCli {
    fn compile(&self, source: &str) -> Result<CompileOutcome, CompilerError> {
        let mut file = tempfile::Builder::new()
            .prefix("elmpost-shader-")
            .suffix(".glslx")
            .tempfile()?;
        file.write_all(source.as_bytes())?;
        file.flush()?;

        debug!(bin = %self.bin, len = source.len(), "invoking shader compiler");
        let output = Command::new(&self.bin)
            .arg(file.path())
            .arg("--format=json")
            .arg("--renaming=none")
            .output()
            .map_err(|source| CompilerError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        if !output.status.success() {
            return Ok(CompileOutcome::Rejected {
                log: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let payload: Payload =
            serde_json::from_slice(&output.stdout).map_err(|source| CompilerError::Payload {
                bin: self.bin.clone(),
                source,
            })?;

        if payload.log.is_empty() {
            Ok(CompileOutcome::Compiled {
                shaders: payload.shaders,
            })
        } else {
            Ok(CompileOutcome::Rejected { log: payload.log })
        }
    }
}
