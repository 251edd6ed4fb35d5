//! Parse and emit compiler-generated JavaScript through SWC.
//!
//! The pipeline never implements its own syntax handling: SWC is the
//! tree adapter. A module is parsed exactly once, mutated in place by the
//! transform passes, and printed exactly once. A file that fails to parse
//! aborts the whole run before any output is produced.

pub mod emit;
pub mod parse;

pub use emit::emit_js;
pub use parse::{parse_js, ParsedModule};
