//! Inject optimizer hints ahead of the application export call.
//!
//! The downstream whole-program specializer only inlines closures it has
//! been told are statically available. This pass finds the single
//! `_Platform_export(main)` statement, traces `main` back to the
//! application-constructor call it aliases, and inserts one
//! `__optimize(part)` statement per constructor argument plus a final
//! `__optimize(main(seed(0)))` so the specializer observes a realized call
//! graph instead of one reached only through the export mechanism.
//!
//! A missing or ambiguous export call, or a constructor that cannot be
//! resolved, is fatal: the rest of the pipeline has no well-defined
//! annotation target.

use ep_ast::Conventions;
use swc_common::DUMMY_SP;
use swc_ecma_ast::{
    CallExpr, Callee, Expr, ExprOrSpread, ExprStmt, Ident, Lit, Module, ModuleItem, Number, Stmt,
    VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};
use tracing::debug;

use crate::error::TransformError;

/// Aliases the Elm compiler emits between `main` and the constructor call.
const MAX_ALIAS_HOPS: usize = 8;

/// Annotate the module's entry point. Returns the number of statements
/// inserted.
pub fn annotate_entry(
    module: &mut Module,
    conventions: &Conventions,
) -> Result<usize, TransformError> {
    let mut locator = ExportLocator {
        export_fn: &conventions.export_fn,
        hits: Vec::new(),
    };
    module.visit_with(&mut locator);

    let exported = match locator.hits.len() {
        0 => return Err(TransformError::EntryPointNotFound(conventions.export_fn.clone())),
        1 => locator.hits.remove(0),
        count => {
            return Err(TransformError::AmbiguousEntryPoint {
                name: conventions.export_fn.clone(),
                count,
            })
        }
    };
    let exported = exported
        .ok_or_else(|| TransformError::UnresolvedConstructor(conventions.export_fn.clone()))?;

    let parts = constructor_parts(module, &exported)
        .ok_or_else(|| TransformError::UnresolvedConstructor(exported.clone()))?;
    debug!(main = %exported, parts = parts.len(), "resolved application constructor");

    let mut annotations: Vec<Stmt> = parts
        .iter()
        .map(|part| optimize_stmt(conventions, ident_expr(part)))
        .collect();
    annotations.push(optimize_stmt(
        conventions,
        seeded_entry_call(conventions, &exported),
    ));
    let inserted = annotations.len();

    let mut inserter = AnnotationInserter {
        export_fn: &conventions.export_fn,
        pending: Some(annotations),
    };
    module.visit_mut_with(&mut inserter);

    Ok(inserted)
}

/// Finds every statement-level export call and the identifier it exports.
struct ExportLocator<'a> {
    export_fn: &'a str,
    /// One entry per export statement; `None` when the argument shape is
    /// not a lone identifier.
    hits: Vec<Option<String>>,
}

impl Visit for ExportLocator<'_> {
    fn visit_expr_stmt(&mut self, stmt: &ExprStmt) {
        if let Expr::Call(call) = &*stmt.expr {
            if callee_is(call, self.export_fn) {
                self.hits.push(sole_ident_arg(call));
            }
        }
        stmt.visit_children_with(self);
    }
}

fn callee_is(call: &CallExpr, name: &str) -> bool {
    match &call.callee {
        Callee::Expr(expr) => matches!(&**expr, Expr::Ident(id) if &*id.sym == name),
        _ => false,
    }
}

fn sole_ident_arg(call: &CallExpr) -> Option<String> {
    match call.args.as_slice() {
        [arg] if arg.spread.is_none() => match &*arg.expr {
            Expr::Ident(id) => Some(id.sym.to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// Follow `var a = b;` hops from the exported name to the constructor
/// call, then read the identifier arguments it was built from.
fn constructor_parts(module: &Module, exported: &str) -> Option<Vec<String>> {
    let mut current = exported.to_string();
    for _ in 0..MAX_ALIAS_HOPS {
        match initializer_of(module, &current)? {
            Expr::Ident(next) => current = next.sym.to_string(),
            Expr::Call(call) => {
                return Some(
                    call.args
                        .iter()
                        .filter_map(|arg| match (&arg.spread, &*arg.expr) {
                            (None, Expr::Ident(id)) => Some(id.sym.to_string()),
                            _ => None,
                        })
                        .collect(),
                );
            }
            _ => return None,
        }
    }
    None
}

fn initializer_of(module: &Module, name: &str) -> Option<Expr> {
    let mut finder = InitFinder { name, found: None };
    module.visit_with(&mut finder);
    finder.found
}

struct InitFinder<'a> {
    name: &'a str,
    found: Option<Expr>,
}

impl Visit for InitFinder<'_> {
    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if self.found.is_none() {
            if let Some(ident) = d.name.as_ident() {
                if &*ident.id.sym == self.name {
                    self.found = d.init.as_deref().cloned();
                    return;
                }
            }
        }
        d.visit_children_with(self);
    }
}

/// Splices the annotation statements immediately before the export
/// statement, wherever its enclosing statement list lives.
struct AnnotationInserter<'a> {
    export_fn: &'a str,
    pending: Option<Vec<Stmt>>,
}

impl AnnotationInserter<'_> {
    fn is_export_stmt(&self, stmt: &Stmt) -> bool {
        matches!(
            stmt,
            Stmt::Expr(es) if matches!(&*es.expr, Expr::Call(call) if callee_is(call, self.export_fn))
        )
    }
}

impl VisitMut for AnnotationInserter<'_> {
    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        stmts.visit_mut_children_with(self);
        if self.pending.is_some() {
            if let Some(pos) = stmts.iter().position(|s| self.is_export_stmt(s)) {
                let annotations = self.pending.take().unwrap();
                stmts.splice(pos..pos, annotations);
            }
        }
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        items.visit_mut_children_with(self);
        if self.pending.is_some() {
            if let Some(pos) = items.iter().position(
                |item| matches!(item, ModuleItem::Stmt(s) if self.is_export_stmt(s)),
            ) {
                let annotations = self.pending.take().unwrap();
                items.splice(pos..pos, annotations.into_iter().map(ModuleItem::Stmt));
            }
        }
    }
}

fn ident_expr(name: &str) -> Expr {
    Expr::Ident(Ident::new_no_ctxt(name.into(), DUMMY_SP))
}

fn call_expr(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        span: DUMMY_SP,
        callee: Callee::Expr(Box::new(callee)),
        args: args
            .into_iter()
            .map(|expr| ExprOrSpread {
                spread: None,
                expr: Box::new(expr),
            })
            .collect(),
        type_args: None,
        ..Default::default()
    })
}

/// `__optimize(arg);`
fn optimize_stmt(conventions: &Conventions, arg: Expr) -> Stmt {
    Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(call_expr(ident_expr(&conventions.optimize_fn), vec![arg])),
    })
}

/// `main(seed(0))` — a realized entry call with a synthesized trivial
/// flags value.
fn seeded_entry_call(conventions: &Conventions, exported: &str) -> Expr {
    let zero = Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value: 0.0,
        raw: None,
    }));
    call_expr(
        ident_expr(exported),
        vec![call_expr(ident_expr(&conventions.entry_seed), vec![zero])],
    )
}
