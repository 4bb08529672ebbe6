//! staticfs-gen: compiles manifests of path-to-handler bindings into the
//! C initialisers of a static, read-only virtual filesystem.
//!
//! ```text
//! manifest text → declarations → merged tree → generated C
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
