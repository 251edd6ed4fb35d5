//! Static arity inference over wrapper-constructor declarations.
//!
//! Two sub-passes over every variable declarator in the module, in source
//! order:
//!
//! 1. `var name = F⟨N⟩(...)` records `name → N`.
//! 2. `var alias = name` with `name` already mapped copies the arity.
//!
//! Sub-pass 2 runs against the map as completed by sub-pass 1 over the
//! whole module, so a single-hop alias resolves no matter where its
//! referent is declared. It also inserts as it scans, so an alias chain
//! (`y = x; z = y;`) resolves only when its hops appear in source order —
//! full transitive closure is deliberately not attempted.
//!
//! The tree is never mutated here. The returned map is immutable from the
//! consumer's point of view: the call rewriter must not run until this
//! pass has finished.

use std::collections::HashMap;

use ep_ast::Conventions;
use swc_ecma_ast::{Callee, Expr, Module, VarDeclarator};
use swc_ecma_visit::{Visit, VisitWith};

/// Identifier name → curried-argument count (2–9 from wrapper tags).
pub type ArityMap = HashMap<String, u8>;

/// Build the completed arity map for a module.
pub fn analyze(module: &Module, conventions: &Conventions) -> ArityMap {
    let mut map = ArityMap::new();

    let mut wrappers = WrapperScan {
        conventions,
        map: &mut map,
    };
    module.visit_with(&mut wrappers);

    let mut aliases = AliasScan { map: &mut map };
    module.visit_with(&mut aliases);

    map
}

/// Sub-pass 1: wrapper constructions.
struct WrapperScan<'a> {
    conventions: &'a Conventions,
    map: &'a mut ArityMap,
}

impl Visit for WrapperScan<'_> {
    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if let (Some(name), Some(Expr::Call(call))) = (d.name.as_ident(), d.init.as_deref()) {
            if let Callee::Expr(callee) = &call.callee {
                if let Expr::Ident(id) = &**callee {
                    if let Some(arity) = self.conventions.wrapper_arity(&id.sym) {
                        self.map.insert(name.id.sym.to_string(), arity);
                    }
                }
            }
        }
        d.visit_children_with(self);
    }
}

/// Sub-pass 2: plain-reference aliases of already-known names.
struct AliasScan<'a> {
    map: &'a mut ArityMap,
}

impl Visit for AliasScan<'_> {
    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if let (Some(name), Some(Expr::Ident(referent))) = (d.name.as_ident(), d.init.as_deref()) {
            if let Some(&arity) = self.map.get(&*referent.sym) {
                self.map.insert(name.id.sym.to_string(), arity);
            }
        }
        d.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::parse;

    fn map_of(source: &str) -> ArityMap {
        analyze(&parse(source).module, &Conventions::default())
    }

    #[test]
    fn wrapper_declarations_are_recorded() {
        let map = map_of("var a = F2(fn); var b = F9(fn); var c = other(fn);");
        assert_eq!(map.get("a"), Some(&2));
        assert_eq!(map.get("b"), Some(&9));
        assert_eq!(map.get("c"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn single_hop_alias_is_order_independent() {
        // The alias appears before its referent's declaration.
        let map = map_of("var y = x; var x = F3(fn);");
        assert_eq!(map.get("x"), Some(&3));
        assert_eq!(map.get("y"), Some(&3));
    }

    #[test]
    fn alias_chain_resolves_in_source_order_only() {
        let forward = map_of("var x = F3(fn); var y = x; var z = y;");
        assert_eq!(forward.get("z"), Some(&3));

        // `z = y` is scanned before `y` is known; the chain stays open.
        let backward = map_of("var x = F3(fn); var z = y; var y = x;");
        assert_eq!(backward.get("y"), Some(&3));
        assert_eq!(backward.get("z"), None);
    }

    #[test]
    fn nested_declarations_are_scanned() {
        let map = map_of("function outer() { var inner = F4(fn); return inner; }");
        assert_eq!(map.get("inner"), Some(&4));
    }

    #[test]
    fn non_identifier_initializers_are_ignored() {
        let map = map_of("var a = F2; var b = F3(fn)(x); var c = 5;");
        assert!(map.is_empty());
    }
}
