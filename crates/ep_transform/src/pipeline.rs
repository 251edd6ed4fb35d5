//! Fixed-order driver over one exclusively-owned module tree.
//!
//! The tree is parsed once, every phase reads and/or mutates it, and it is
//! printed once. Arity analysis must complete for the whole module before
//! the call rewriter starts; the shader, compat, and annotation phases are
//! mutually independent but all run before emission. Any fatal error
//! leaves the caller with no output to emit.

use ep_ast::Conventions;
use ep_glslx::ShaderCompiler;
use swc_ecma_ast::Module;
use tracing::debug;

use crate::error::TransformError;
use crate::{annotate, arity, calls, compat, shader};

/// Per-phase counters for logging and assertions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub arity_entries: usize,
    pub shaders_inlined: usize,
    pub shaders_rejected: usize,
    pub patches_applied: usize,
    pub annotations_inserted: usize,
    pub calls_rewritten: usize,
}

pub struct Pipeline {
    conventions: Conventions,
}

impl Pipeline {
    pub fn new(conventions: Conventions) -> Self {
        Self { conventions }
    }

    /// Run all phases over one module.
    ///
    /// `shader_compiler` is `None` when shader inlining is disabled; the
    /// phase is skipped entirely rather than invoked and rejected.
    pub fn run(
        &self,
        module: &mut Module,
        shader_compiler: Option<&dyn ShaderCompiler>,
    ) -> Result<Report, TransformError> {
        let arity_map = arity::analyze(module, &self.conventions);
        debug!(entries = arity_map.len(), "arity analysis complete");

        let (shaders_inlined, shaders_rejected) = match shader_compiler {
            Some(compiler) => shader::inline_shaders(module, &self.conventions, compiler),
            None => (0, 0),
        };

        let patches_applied = compat::apply_patches(module, &self.conventions.patches)?;
        let annotations_inserted = annotate::annotate_entry(module, &self.conventions)?;
        let calls_rewritten = calls::rewrite_calls(module, &self.conventions, &arity_map);
        debug!(calls_rewritten, "dispatch rewriting complete");

        Ok(Report {
            arity_entries: arity_map.len(),
            shaders_inlined,
            shaders_rejected,
            patches_applied,
            annotations_inserted,
            calls_rewritten,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Conventions::default())
    }
}
