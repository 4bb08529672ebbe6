//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// A manifest that does not match the grammar at some position.
///
/// `line` and `column` are 1-based, `offset` is the 0-based byte offset
/// into the manifest text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error at line {line}, column {column}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub expected: String,
    pub found: String,
}

/// Domain errors represent manifest or tree violations.
/// These are independent of where the manifest text came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("structural conflict at {path}: {reason}")]
    StructuralConflict { path: String, reason: String },

    #[error("generated symbol '{symbol}' is produced by both {first} and {second}")]
    SymbolCollision {
        symbol: String,
        first: String,
        second: String,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
