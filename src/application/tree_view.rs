//! Terminal rendering of the merged tree.

use termtree::Tree as TermTree;

use crate::domain::{Directory, Node, Tree};

pub trait ToTermTree {
    fn to_term_tree(&self) -> TermTree<String>;
}

impl ToTermTree for Tree {
    fn to_term_tree(&self) -> TermTree<String> {
        directory_tree("/".to_string(), self.root())
    }
}

fn directory_tree(label: String, dir: &Directory) -> TermTree<String> {
    let leaves: Vec<_> = dir
        .entries
        .iter()
        .map(|entry| match &entry.node {
            Node::Directory(sub) => directory_tree(format!("{}/", entry.name), sub),
            Node::Handler(handler) => TermTree::new(format!("{} -> {}", entry.name, handler.name)),
        })
        .collect();

    TermTree::new(label).with_leaves(leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Declaration, EntryKind, TreeBuilder};

    #[test]
    fn given_tree_when_rendering_then_shows_directories_and_handlers() {
        let mut builder = TreeBuilder::new();
        builder
            .add(&Declaration::new(
                vec!["bin".into(), "ls".into()],
                EntryKind::Func,
                "cmd_ls",
            ))
            .unwrap();

        let rendered = builder.finish().to_term_tree().to_string();

        assert!(rendered.starts_with("/\n"));
        assert!(rendered.contains("bin/"));
        assert!(rendered.contains("ls -> cmd_ls"));
    }
}
