//! Domain layer: manifest grammar, tree construction and code emission
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod emitter;
pub mod entities;
pub mod error;
pub mod parser;

pub use builder::{fold_declaration, TreeBuilder};
pub use emitter::{
    directory_symbol, emit, epilogue, preamble, DeclaredSet, EmitOptions, Emission, EntryOrder,
};
pub use entities::*;
pub use error::{DomainError, DomainResult, SyntaxError};
pub use parser::parse_manifest;
