//! Code emitter: turns a finished tree into C initialisers.
//!
//! Output comes in two passes over the tree. The first writes one `extern`
//! declaration per distinct handler name; the second writes one
//! `STATICFS_DIR` record per directory in post-order, so every nested
//! directory record precedes the record that references it.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::entities::{join_path, Directory, Entry, Node, Tree, ROOT_NAME};
use crate::domain::error::{DomainError, DomainResult};

pub const GENERATED_HEADER: &str = "// Generated. DO NOT EDIT";
pub const DIR_MACRO: &str = "STATICFS_DIR";
pub const DIR_ENTRY_MACRO: &str = "STATICFS_DIR_ENTRY";
pub const CALLABLE_ENTRY_MACRO: &str = "STATICFS_DIR_ENTRY_CALLABLE";
pub const LAST_ENTRY_MACRO: &str = "STATICFS_DIR_ENTRY_LAST";
/// Suffix `STATICFS_DIR` appends to a directory symbol to name its node.
pub const NODE_SUFFIX: &str = "_staticnode";

/// Order in which a directory's entries are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrder {
    /// Order in which entries were first declared
    #[default]
    Insertion,
    /// Lexicographic by entry name
    Sorted,
}

/// Knobs for the generated file's framing and signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub includes: Vec<String>,
    pub handler_return_type: String,
    pub handler_params: String,
    pub root_symbol: String,
    pub root_type: String,
    pub order: EntryOrder,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            includes: vec!["vfs.h".into()],
            handler_return_type: "int".into(),
            handler_params: "int argc, const char** argv".into(),
            root_symbol: "staticfs_root".into(),
            root_type: "vnode_t".into(),
            order: EntryOrder::Insertion,
        }
    }
}

/// Handler names that already have an `extern` declaration in this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredSet {
    names: HashSet<String>,
}

impl DeclaredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name`; returns false if it was already declared.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Result of one emission pass.
#[derive(Debug, Clone)]
pub struct Emission {
    /// Extern declarations followed by directory records
    pub text: String,
    pub declared: DeclaredSet,
    /// Number of directory records written, root included
    pub directories: usize,
}

/// Generated C symbol for the directory at `path` (empty path is the root).
///
/// Components are joined with `_`; characters that cannot appear in a C
/// identifier are replaced by `_`.
pub fn directory_symbol(path: &[String]) -> String {
    if path.is_empty() {
        return ROOT_NAME.to_string();
    }
    path.iter()
        .map(|c| c.replace(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'), "_"))
        .join("_")
}

/// Header comment and include block.
pub fn preamble(options: &EmitOptions) -> String {
    let mut out = format!("{}\n", GENERATED_HEADER);
    for include in &options.includes {
        out.push_str(&format!("#include <{}>\n", include));
    }
    out.push('\n');
    out
}

/// Statement exposing the root directory under the well-known symbol.
pub fn epilogue(options: &EmitOptions) -> String {
    format!(
        "{ty} {name} = ({ty})&{root}{suffix};\n",
        ty = options.root_type,
        name = options.root_symbol,
        root = directory_symbol(&[]),
        suffix = NODE_SUFFIX,
    )
}

/// Emit declarations and directory records for `tree`.
///
/// Fails if two directories map to the same generated symbol, or a directory
/// symbol clashes with the root symbol or a handler name.
#[instrument(level = "debug", skip_all)]
pub fn emit(tree: &Tree, options: &EmitOptions) -> DomainResult<Emission> {
    check_symbols(tree, options)?;

    let mut text = String::new();
    let mut declared = DeclaredSet::new();
    declare_handlers(tree.root(), options, &mut declared, &mut text);
    if !declared.is_empty() {
        text.push('\n');
    }

    let mut directories = 0;
    emit_records(tree.root(), &mut Vec::new(), options, &mut text, &mut directories);

    debug!(
        "emitted {} extern declarations and {} directory records",
        declared.len(),
        directories
    );
    Ok(Emission {
        text,
        declared,
        directories,
    })
}

fn ordered(dir: &Directory, order: EntryOrder) -> Vec<&Entry> {
    match order {
        EntryOrder::Insertion => dir.entries.iter().collect(),
        EntryOrder::Sorted => dir
            .entries
            .iter()
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect(),
    }
}

/// Every generated name must be unique: directory symbols, the root symbol
/// and extern handler names share one C namespace.
fn check_symbols(tree: &Tree, options: &EmitOptions) -> DomainResult<()> {
    let mut seen = HashMap::from([(
        options.root_symbol.clone(),
        format!("root symbol '{}'", options.root_symbol),
    )]);
    check_directory_symbols(tree.root(), &mut Vec::new(), &mut seen)?;
    check_handler_names(tree.root(), &mut Vec::new(), &seen)
}

fn collision(symbol: String, first: &str, second: String) -> DomainError {
    DomainError::SymbolCollision {
        symbol,
        first: first.to_string(),
        second,
    }
}

fn check_directory_symbols(
    dir: &Directory,
    path: &mut Vec<String>,
    seen: &mut HashMap<String, String>,
) -> DomainResult<()> {
    let symbol = directory_symbol(path);
    let here = join_path(path);
    if let Some(first) = seen.get(&symbol) {
        return Err(collision(symbol, first, here));
    }
    seen.insert(symbol, here);

    for entry in &dir.entries {
        if let Node::Directory(sub) = &entry.node {
            path.push(entry.name.clone());
            check_directory_symbols(sub, path, seen)?;
            path.pop();
        }
    }
    Ok(())
}

fn check_handler_names(
    dir: &Directory,
    path: &mut Vec<String>,
    seen: &HashMap<String, String>,
) -> DomainResult<()> {
    for entry in &dir.entries {
        path.push(entry.name.clone());
        match &entry.node {
            Node::Directory(sub) => check_handler_names(sub, path, seen)?,
            Node::Handler(handler) => {
                if let Some(first) = seen.get(&handler.name) {
                    return Err(collision(
                        handler.name.clone(),
                        first,
                        format!("handler at {}", join_path(path)),
                    ));
                }
            }
        }
        path.pop();
    }
    Ok(())
}

fn declare_handlers(
    dir: &Directory,
    options: &EmitOptions,
    declared: &mut DeclaredSet,
    out: &mut String,
) {
    for entry in ordered(dir, options.order) {
        match &entry.node {
            Node::Directory(sub) => declare_handlers(sub, options, declared, out),
            Node::Handler(handler) => {
                if declared.insert(&handler.name) {
                    out.push_str(&format!(
                        "extern {} {}({});\n",
                        options.handler_return_type, handler.name, options.handler_params
                    ));
                }
            }
        }
    }
}

fn emit_records(
    dir: &Directory,
    path: &mut Vec<String>,
    options: &EmitOptions,
    out: &mut String,
    count: &mut usize,
) {
    let entries = ordered(dir, options.order);

    for entry in &entries {
        if let Node::Directory(sub) = &entry.node {
            path.push(entry.name.clone());
            emit_records(sub, path, options, out, count);
            path.pop();
        }
    }

    out.push_str(&format!("{}({},\n", DIR_MACRO, directory_symbol(path)));
    for entry in &entries {
        let line = match &entry.node {
            Node::Directory(_) => {
                path.push(entry.name.clone());
                let symbol = directory_symbol(path);
                path.pop();
                format!("{}(\"{}\", {})", DIR_ENTRY_MACRO, entry.name, symbol)
            }
            Node::Handler(handler) => {
                format!("{}(\"{}\", {})", CALLABLE_ENTRY_MACRO, entry.name, handler.name)
            }
        };
        out.push_str(&format!("    {},\n", line));
    }
    out.push_str(&format!("    {},\n);\n\n", LAST_ENTRY_MACRO));
    *count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_path_when_symbol_then_joins_with_underscore() {
        let path = vec!["usr".to_string(), "local-bin".to_string()];
        assert_eq!(directory_symbol(&path), "usr_local_bin");
        assert_eq!(directory_symbol(&[]), "root");
    }

    #[test]
    fn given_default_options_when_framing_then_matches_vfs_header() {
        let options = EmitOptions::default();
        assert_eq!(
            preamble(&options),
            "// Generated. DO NOT EDIT\n#include <vfs.h>\n\n"
        );
        assert_eq!(
            epilogue(&options),
            "vnode_t staticfs_root = (vnode_t)&root_staticnode;\n"
        );
    }

    #[test]
    fn given_repeated_name_when_inserting_then_declared_once() {
        let mut declared = DeclaredSet::new();
        assert!(declared.insert("cmd_ls"));
        assert!(!declared.insert("cmd_ls"));
        assert_eq!(declared.len(), 1);
    }

    #[test]
    fn given_empty_tree_when_emitting_then_only_root_record() {
        let emission = emit(&Tree::new(), &EmitOptions::default()).unwrap();
        assert_eq!(
            emission.text,
            "STATICFS_DIR(root,\n    STATICFS_DIR_ENTRY_LAST,\n);\n\n"
        );
        assert_eq!(emission.directories, 1);
        assert!(emission.declared.is_empty());
    }
}
