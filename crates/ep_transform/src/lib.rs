//! Whole-module rewriting passes for Elm-compiled JavaScript.
//!
//! The compiler represents curried functions as arity-tagged wrapper
//! objects (`F2(fn)`..`F9(fn)`) and curried calls as variadic dispatch
//! helpers (`A2(f, a, b)`..). A generic minifier cannot remove that
//! indirection because it cannot prove arity equivalence; these passes
//! can, because the wrapper tags spell the arity out.
//!
//! Passes, in pipeline order:
//! - [`arity`] — build the name → arity map (read-only, must complete first)
//! - [`shader`] — inline/minify embedded shader string literals
//! - [`compat`] — replace function bodies that break the downstream specializer
//! - [`annotate`] — inject `__optimize` hints ahead of the export call
//! - [`calls`] — rewrite provable dispatch calls into direct `.f(...)` calls

pub mod annotate;
pub mod arity;
pub mod calls;
pub mod compat;
pub mod error;
pub mod pipeline;
pub mod shader;

pub use arity::ArityMap;
pub use error::TransformError;
pub use pipeline::{Pipeline, Report};
