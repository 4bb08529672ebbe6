//! Tree builder: folds declarations into one shared directory tree.

use tracing::{debug, instrument};

use crate::domain::entities::{join_path, Declaration, EntryKind, Node, Tree};
use crate::domain::error::{DomainError, DomainResult};

/// Accumulates declarations from any number of manifests into one tree.
///
/// Intermediate path components become directories (created on first use,
/// reused afterwards); the last component is bound to a handler. A path that
/// would have to be both a directory and a handler is rejected.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: Tree,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue building on top of an existing tree.
    pub fn from_tree(tree: Tree) -> Self {
        Self { tree }
    }

    /// Fold a single declaration into the tree.
    #[instrument(level = "trace", skip(self, decl), fields(decl = %decl))]
    pub fn add(&mut self, decl: &Declaration) -> DomainResult<()> {
        let (last, parents) =
            decl.components
                .split_last()
                .ok_or_else(|| DomainError::StructuralConflict {
                    path: "/".to_string(),
                    reason: "declaration has no path components".to_string(),
                })?;

        let mut dir = self.tree.root_mut();
        for (depth, name) in parents.iter().enumerate() {
            let existing = dir.entries.iter().position(|e| e.name == *name);
            let node = match existing {
                Some(idx) => &mut dir.entries[idx].node,
                None => {
                    debug!("creating directory {}", join_path(&decl.components[..=depth]));
                    dir.push(name.clone(), Node::directory(name.clone()))
                }
            };
            dir = match node {
                Node::Directory(sub) => sub,
                Node::Handler(handler) => {
                    return Err(DomainError::StructuralConflict {
                        path: join_path(&decl.components[..=depth]),
                        reason: format!(
                            "bound to handler '{}' but {} needs it to be a directory",
                            handler.name,
                            decl.path()
                        ),
                    });
                }
            };
        }

        let leaf = match decl.kind {
            EntryKind::Func => Node::handler(decl.handler.clone()),
        };

        match dir.entries.iter().position(|e| e.name == *last) {
            None => {
                dir.push(last.clone(), leaf);
                Ok(())
            }
            Some(idx) => match (&dir.entries[idx].node, &leaf) {
                (Node::Handler(existing), Node::Handler(new)) if existing.name == new.name => {
                    debug!("{} already bound to {}, ignoring", decl.path(), new.name);
                    Ok(())
                }
                (existing, _) => Err(DomainError::StructuralConflict {
                    path: decl.path(),
                    reason: format!(
                        "already {}, cannot bind it to handler '{}'",
                        existing.describe(),
                        decl.handler
                    ),
                }),
            },
        }
    }

    /// Fold declarations in order, stopping at the first conflict.
    pub fn extend<'a>(
        &mut self,
        declarations: impl IntoIterator<Item = &'a Declaration>,
    ) -> DomainResult<()> {
        for decl in declarations {
            self.add(decl)?;
        }
        Ok(())
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn finish(self) -> Tree {
        self.tree
    }
}

/// Return `tree` with `decl` folded in.
pub fn fold_declaration(tree: Tree, decl: &Declaration) -> DomainResult<Tree> {
    let mut builder = TreeBuilder::from_tree(tree);
    builder.add(decl)?;
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(path: &str, handler: &str) -> Declaration {
        let components = path
            .split('/')
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();
        Declaration::new(components, EntryKind::Func, handler)
    }

    #[test]
    fn given_nested_path_when_adding_then_creates_intermediate_directories() {
        let mut builder = TreeBuilder::new();
        builder.add(&decl("/usr/local/bin/ls", "cmd_ls")).unwrap();

        let tree = builder.finish();
        assert!(tree.lookup("/usr").unwrap().as_directory().is_some());
        assert!(tree.lookup("/usr/local/bin").unwrap().as_directory().is_some());
        assert_eq!(
            tree.lookup("/usr/local/bin/ls").unwrap().as_handler().unwrap().name,
            "cmd_ls"
        );
    }

    #[test]
    fn given_handler_then_nested_path_when_adding_then_conflicts() {
        let tree = fold_declaration(Tree::new(), &decl("/bin", "cmd_bin")).unwrap();
        let err = fold_declaration(tree, &decl("/bin/ls", "cmd_ls")).unwrap_err();
        assert!(
            matches!(err, DomainError::StructuralConflict { ref path, .. } if path == "/bin"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn given_same_binding_twice_when_adding_then_is_idempotent() {
        let mut builder = TreeBuilder::new();
        builder.add(&decl("/bin/ls", "cmd_ls")).unwrap();
        builder.add(&decl("/bin/ls", "cmd_ls")).unwrap();
        assert_eq!(builder.tree().handler_count(), 1);
    }
}
