//! Replace function bodies the downstream specializer cannot analyze.
//!
//! The patch table maps a declared function name to replacement body text.
//! Bodies stay as source text in the configuration so the stand-ins are
//! auditable; they are parsed once when the patcher is built. A malformed
//! body is a configuration defect and fails the run; a patch target absent
//! from the module is a silent no-op.

use ep_ast::PatchRule;
use swc_common::{sync::Lrc, FileName, SourceMap};
use swc_ecma_ast::{BlockStmt, Decl, EsVersion, FnDecl, Module, ModuleItem, Stmt};
use swc_ecma_parser::{EsSyntax, Syntax};
use swc_ecma_visit::{VisitMut, VisitMutWith};
use tracing::debug;

use crate::error::TransformError;

/// Apply the patch table to a module. Returns the number of bodies replaced.
pub fn apply_patches(module: &mut Module, rules: &[PatchRule]) -> Result<usize, TransformError> {
    let mut patcher = CompatPatcher::new(rules)?;
    module.visit_mut_with(&mut patcher);
    Ok(patcher.applied)
}

pub struct CompatPatcher {
    patches: Vec<(String, BlockStmt)>,
    applied: usize,
}

impl CompatPatcher {
    pub fn new(rules: &[PatchRule]) -> Result<Self, TransformError> {
        let mut patches = Vec::with_capacity(rules.len());
        for rule in rules {
            let body = parse_body(&rule.body).ok_or_else(|| TransformError::InvalidPatch {
                name: rule.name.clone(),
            })?;
            patches.push((rule.name.clone(), body));
        }
        Ok(Self { patches, applied: 0 })
    }
}

impl VisitMut for CompatPatcher {
    fn visit_mut_fn_decl(&mut self, decl: &mut FnDecl) {
        let replacement = self
            .patches
            .iter()
            .find(|(name, _)| name.as_str() == &*decl.ident.sym)
            .map(|(_, body)| body.clone());
        if let Some(body) = replacement {
            debug!(name = %decl.ident.sym, "patched function body");
            decl.function.body = Some(body);
            self.applied += 1;
            // The replacement body carries nothing left to patch.
            return;
        }
        decl.visit_mut_children_with(self);
    }
}

/// Parse statement-level body text by wrapping it in a throwaway function
/// declaration and stealing the block.
fn parse_body(source: &str) -> Option<BlockStmt> {
    let wrapped = format!("function __patch__() {{ {source} }}");
    let source_map: Lrc<SourceMap> = Default::default();
    let file = source_map.new_source_file(Lrc::new(FileName::Anon), wrapped);
    let module = swc_ecma_parser::parse_file_as_module(
        &file,
        Syntax::Es(EsSyntax::default()),
        EsVersion::latest(),
        None,
        &mut vec![],
    )
    .ok()?;
    match module.body.into_iter().next()? {
        ModuleItem::Stmt(Stmt::Decl(Decl::Fn(f))) => f.function.body,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use ep_ast::Conventions;

    use super::*;
    use crate::testutil::{emit, normalize, parse};

    #[test]
    fn known_bad_body_is_replaced() {
        let mut parsed = parse(
            "function _Browser_visibilityInfo() { return { b4: document.hidden, b0: 'x' }; }",
        );
        let applied = apply_patches(&mut parsed.module, &Conventions::default().patches).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(
            emit(&parsed),
            normalize(
                "function _Browser_visibilityInfo() { return { b4: 'hidden', b0: 'visibilitychange' }; }"
            )
        );
    }

    #[test]
    fn absent_target_is_a_no_op() {
        let src = "function somethingElse() { return 1; }";
        let mut parsed = parse(src);
        let applied = apply_patches(&mut parsed.module, &Conventions::default().patches).unwrap();
        assert_eq!(applied, 0);
        assert_eq!(emit(&parsed), normalize(src));
    }

    #[test]
    fn malformed_replacement_text_is_fatal() {
        let rules = vec![PatchRule {
            name: "f".to_string(),
            body: "return {{{".to_string(),
        }];
        let mut parsed = parse("function f() {}");
        match apply_patches(&mut parsed.module, &rules) {
            Err(TransformError::InvalidPatch { name }) => assert_eq!(name, "f"),
            other => panic!("expected InvalidPatch, got {other:?}"),
        }
    }

    #[test]
    fn nested_declaration_is_patched() {
        let mut parsed = parse(
            "(function (scope) { function _Browser_visibilityInfo() { return document.hidden; } })(this);",
        );
        let applied = apply_patches(&mut parsed.module, &Conventions::default().patches).unwrap();
        assert_eq!(applied, 1);
    }
}
