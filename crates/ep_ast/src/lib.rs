//! Naming conventions of Elm-compiled JavaScript.
//!
//! Re-exports the standard SWC AST and defines the configuration that
//! drives the transform passes:
//! - wrapper-constructor tags (`F2`..`F9`) and dispatch-helper tags (`A2`..`A9`)
//! - fixed runtime names (`_Platform_export`, `__optimize`, the flags decoder)
//! - the shader-literal length threshold
//! - the compatibility patch table

pub use swc_ecma_ast::*;

use serde::{Deserialize, Serialize};

/// A compatibility patch: a function declaration name and the source text
/// of the body that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRule {
    /// Name of the function declaration to patch.
    pub name: String,
    /// Statement-level source text of the replacement body.
    pub body: String,
}

/// Naming conventions of one generated module.
///
/// Kept as a single explicit value (rather than literals scattered through
/// the passes) so the convention-matching rules stay auditable and each
/// pass can be tested in isolation against a custom set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conventions {
    /// Wrapper-constructor prefix: `F3(fn)` wraps `fn` with arity 3.
    pub wrapper_tag: char,
    /// Dispatch-helper prefix: `A3(f, a, b, c)` calls `f` with 3 arguments.
    pub dispatch_tag: char,
    /// Member invoked by the direct-call rewrite: `A3(f, a, b, c)` → `f.f(a, b, c)`.
    pub dispatch_field: String,
    /// The runtime's export function; the annotation insertion point.
    pub export_fn: String,
    /// Builder of the trivial flags value for the seeded entry call.
    pub entry_seed: String,
    /// Prepack's "treat this closure as statically known" hint.
    pub optimize_fn: String,
    /// Minimum string-literal length considered candidate shader source.
    pub shader_min_len: usize,
    /// Function bodies replaced before the whole-program specializer runs.
    pub patches: Vec<PatchRule>,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            wrapper_tag: 'F',
            dispatch_tag: 'A',
            dispatch_field: "f".to_string(),
            export_fn: "_Platform_export".to_string(),
            entry_seed: "$elm$json$Json$Decode$succeed".to_string(),
            optimize_fn: "__optimize".to_string(),
            shader_min_len: 100,
            patches: vec![PatchRule {
                // Prepack cannot analyze the runtime's `document` probe;
                // stand in a closed form with the same result field names.
                name: "_Browser_visibilityInfo".to_string(),
                body: "return { b4: 'hidden', b0: 'visibilitychange' };".to_string(),
            }],
        }
    }
}

impl Conventions {
    /// Arity encoded in a wrapper-constructor name, e.g. `F3` → 3.
    pub fn wrapper_arity(&self, name: &str) -> Option<u8> {
        tag_arity(name, self.wrapper_tag)
    }

    /// Arity encoded in a dispatch-helper name, e.g. `A3` → 3.
    pub fn dispatch_arity(&self, name: &str) -> Option<u8> {
        tag_arity(name, self.dispatch_tag)
    }
}

/// Match `<tag><digit>` where the digit is 2–9. Anything longer, shorter,
/// or out of range is not a generated helper name.
fn tag_arity(name: &str, tag: char) -> Option<u8> {
    let rest = name.strip_prefix(tag)?;
    let mut digits = rest.chars();
    let digit = digits.next()?;
    if digits.next().is_some() {
        return None;
    }
    let n = digit.to_digit(10)? as u8;
    (2..=9).contains(&n).then_some(n)
}
