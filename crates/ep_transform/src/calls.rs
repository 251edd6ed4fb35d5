//! Rewrite provable dispatch calls into direct method calls.
//!
//! `A⟨N⟩(f, a₁, .., aₙ)` dispatches a curried call through a helper that
//! works for any arity. When the arity map proves `f` holds exactly `N`
//! curried arguments and the call supplies exactly `N`, the helper is
//! bypassed: the call becomes `f.f(a₁, .., aₙ)`.
//!
//! All four conditions must hold at once — dispatch-tag callee, more than
//! one argument, first argument a mapped identifier, recorded arity equal
//! to both the tag and the argument count. A call failing any one of them
//! is left byte-identical; the generic helper is still correct there, just
//! slower. The rewrite is purely syntactic and idempotent: its output
//! contains no call matching the pattern.
//!
//! Must run only after the arity map is complete. A combined
//! discover-and-rewrite pass would miss dispatch calls whose target is
//! declared later in the text.

use ep_ast::Conventions;
use swc_common::DUMMY_SP;
use swc_ecma_ast::{CallExpr, Callee, Expr, IdentName, MemberExpr, MemberProp, Module};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::arity::ArityMap;

/// Rewrite every provable dispatch call site. Returns the rewrite count.
pub fn rewrite_calls(module: &mut Module, conventions: &Conventions, arity: &ArityMap) -> usize {
    let mut rewriter = CallRewriter {
        conventions,
        arity,
        rewritten: 0,
    };
    module.visit_mut_with(&mut rewriter);
    rewriter.rewritten
}

struct CallRewriter<'a> {
    conventions: &'a Conventions,
    arity: &'a ArityMap,
    rewritten: usize,
}

impl CallRewriter<'_> {
    /// The four match conditions; `None` means leave the call alone.
    fn provable_target(&self, call: &CallExpr) -> Option<()> {
        let tag = match &call.callee {
            Callee::Expr(expr) => match &**expr {
                Expr::Ident(id) => self.conventions.dispatch_arity(&id.sym)?,
                _ => return None,
            },
            _ => return None,
        };
        if call.args.len() < 2 {
            return None;
        }
        let first = &call.args[0];
        if first.spread.is_some() {
            return None;
        }
        let target = match &*first.expr {
            Expr::Ident(id) => id,
            _ => return None,
        };
        let recorded = *self.arity.get(&*target.sym)?;
        (recorded == tag && usize::from(recorded) == call.args.len() - 1).then_some(())
    }
}

impl VisitMut for CallRewriter<'_> {
    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        call.visit_mut_children_with(self);

        if self.provable_target(call).is_none() {
            return;
        }

        let first = call.args.remove(0);
        call.callee = Callee::Expr(Box::new(Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: first.expr,
            prop: MemberProp::Ident(IdentName::new(
                self.conventions.dispatch_field.as_str().into(),
                DUMMY_SP,
            )),
        })));
        self.rewritten += 1;
    }
}
