//! tugdecomp: render Python 3 bytecode parse trees back to source text.
//!
//! The semantic-action layer lives in `tugdecomp-semantics`; the data model,
//! errors, and JSON envelopes in `tugdecomp-core`. This crate re-exports both
//! and adds the command-line front door.

// Core infrastructure - re-exported from tugdecomp-core
pub use tugdecomp_core::error;
pub use tugdecomp_core::output;
pub use tugdecomp_core::revision;
pub use tugdecomp_core::tree;

// Semantic actions - re-exported from tugdecomp-semantics
pub use tugdecomp_semantics as semantics;

// Front door
pub mod cli;
