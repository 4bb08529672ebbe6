//! Domain entities: core data structures

use std::fmt;

/// Name of the root directory; also the root's generated symbol.
pub const ROOT_NAME: &str = "root";

/// Kind of entry a declaration binds its path to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A callable handler, written `func <identifier>` in a manifest.
    Func,
}

impl EntryKind {
    /// Manifest keyword introducing this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            EntryKind::Func => "func",
        }
    }

    /// Look up an entry kind by its manifest keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "func" => Some(EntryKind::Func),
            _ => None,
        }
    }
}

/// One parsed manifest statement: `/a/b/c:func handler`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Path components from the root, never empty
    pub components: Vec<String>,
    pub kind: EntryKind,
    /// Identifier of the external callable; never checked for existence
    pub handler: String,
}

impl Declaration {
    pub fn new(components: Vec<String>, kind: EntryKind, handler: impl Into<String>) -> Self {
        Self {
            components,
            kind,
            handler: handler.into(),
        }
    }

    /// Slash-joined absolute path of the declaration.
    pub fn path(&self) -> String {
        join_path(&self.components)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.path(), self.kind.keyword(), self.handler)
    }
}

/// Render path components as an absolute path (`/` for none).
pub fn join_path(components: &[String]) -> String {
    format!("/{}", components.join("/"))
}

/// Reference to an external callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    pub name: String,
}

/// Named slot inside a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub node: Node,
}

/// Container node. Entries keep their insertion order and have unique names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Directory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.node)
    }

    /// Append a new entry. Callers check for an existing name first.
    pub(crate) fn push(&mut self, name: impl Into<String>, node: Node) -> &mut Node {
        self.entries.push(Entry {
            name: name.into(),
            node,
        });
        let last = self.entries.len() - 1;
        &mut self.entries[last].node
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A node of the static filesystem tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(Directory),
    Handler(Handler),
}

impl Node {
    pub fn directory(name: impl Into<String>) -> Self {
        Node::Directory(Directory::new(name))
    }

    pub fn handler(name: impl Into<String>) -> Self {
        Node::Handler(Handler { name: name.into() })
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Node::Handler(handler) => Some(handler),
            Node::Directory(_) => None,
        }
    }

    /// Short description used in conflict messages.
    pub fn describe(&self) -> String {
        match self {
            Node::Directory(_) => "a directory".to_string(),
            Node::Handler(h) => format!("handler '{}'", h.name),
        }
    }
}

/// The whole static filesystem; owns every node below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: Directory,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// An empty tree: just the root directory.
    pub fn new() -> Self {
        Self {
            root: Directory::new(ROOT_NAME),
        }
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Directory {
        &mut self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Find the node at `path` (slash-separated, leading slash optional).
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut components = path.split('/').filter(|c| !c.is_empty());
        let first = components.next()?;
        let mut node = self.root.get(first)?;
        for name in components {
            node = node.as_directory()?.get(name)?;
        }
        Some(node)
    }

    /// Number of distinct handler bindings in the tree.
    pub fn handler_count(&self) -> usize {
        fn count(dir: &Directory) -> usize {
            dir.entries
                .iter()
                .map(|e| match &e.node {
                    Node::Directory(sub) => count(sub),
                    Node::Handler(_) => 1,
                })
                .sum()
        }
        count(&self.root)
    }
}
