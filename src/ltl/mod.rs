//! Linear Temporal Logic over provenance traces.
//!
//! - [`formula`]: the syntax tree, normalization, reference compilation and propositional
//!   satisfaction.
//! - [`atoms`]: the atomic propositions a formula can mention and the valuations that decide them.
//! - [`references`]: the arena that `@name` references point into.
//! - [`closure`]: subformulae and closure, used to build automata.
//! - [`parser`]: the surface syntax.

pub mod atoms;

pub mod closure;

pub mod formula;

pub mod parser;

pub mod references;

pub use atoms::{AtomicProposition, Valuation};
pub use closure::{closure, subformulae};
pub use formula::{Formula, LtlError};
pub use parser::{is_label, parse, parse_with, ParseError, MAX_NESTING};
pub use references::RefTable;
