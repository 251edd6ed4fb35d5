//! Inline embedded shader source literals through the external compiler.
//!
//! Every string literal longer than the configured threshold is treated as
//! candidate shader source. The threshold is a heuristic prefilter only:
//! a long non-shader string will reach the compiler and be rejected. A
//! rejection (or a transport failure) is logged and the literal is left
//! untouched — one bad candidate never aborts the run.

use ep_ast::Conventions;
use ep_glslx::{CompileOutcome, ShaderCompiler};
use swc_ecma_ast::{Module, Str};
use swc_ecma_visit::{VisitMut, VisitMutWith};
use tracing::{debug, warn};

/// Replace compilable shader literals in place.
///
/// Returns `(inlined, rejected)` counts.
pub fn inline_shaders(
    module: &mut Module,
    conventions: &Conventions,
    compiler: &dyn ShaderCompiler,
) -> (usize, usize) {
    let mut inliner = ShaderInliner {
        compiler,
        min_len: conventions.shader_min_len,
        inlined: 0,
        rejected: 0,
    };
    module.visit_mut_with(&mut inliner);
    (inliner.inlined, inliner.rejected)
}

struct ShaderInliner<'a> {
    compiler: &'a dyn ShaderCompiler,
    min_len: usize,
    inlined: usize,
    rejected: usize,
}

impl VisitMut for ShaderInliner<'_> {
    fn visit_mut_str(&mut self, literal: &mut Str) {
        if literal.value.len() <= self.min_len {
            return;
        }

        match self.compiler.compile(&literal.value.to_string_lossy()) {
            Ok(CompileOutcome::Compiled { shaders }) => match shaders.into_iter().next() {
                Some(first) => {
                    debug!(
                        before = literal.value.len(),
                        after = first.contents.len(),
                        "inlined shader literal"
                    );
                    literal.value = first.contents.into();
                    // Drop the original raw text so the emitter prints the
                    // replacement value.
                    literal.raw = None;
                    self.inlined += 1;
                }
                None => {
                    warn!("shader compiler returned an empty shader list");
                    self.rejected += 1;
                }
            },
            Ok(CompileOutcome::Rejected { log }) => {
                warn!(len = literal.value.len(), %log, "shader candidate rejected");
                self.rejected += 1;
            }
            Err(err) => {
                warn!(len = literal.value.len(), error = %err, "shader compiler unavailable");
                self.rejected += 1;
            }
        }
    }
}
