use std::cell::OnceCell;

use derive_more::Display;
use hashlink::LinkedHashMap;
use snafu::Snafu;
use tracing::trace;

use crate::filesystem::Size;

/// Name given to the root directory of every tree.
pub const ROOT_NAME: &str = "/";

/// Index of a node inside the [`ResourceTree`] that created it.
///
/// Ids are only meaningful for the tree that handed them out. Using an id with
/// another tree is a logic error and may panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("#{_0}")]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Directory {
        children: LinkedHashMap<String, NodeId>,
    },
    File {
        size: Size,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    kind: NodeKind,
    /// Aggregate size of a directory, cleared whenever a descendant is added.
    /// Only the tree itself fills it.
    memoized_size: OnceCell<Size>,
}

impl Node {
    fn directory(name: String, parent: Option<NodeId>) -> Self {
        Node {
            name,
            parent,
            kind: NodeKind::Directory {
                children: LinkedHashMap::new(),
            },
            memoized_size: OnceCell::new(),
        }
    }

    fn file(name: String, parent: NodeId, size: Size) -> Self {
        Node {
            name,
            parent: Some(parent),
            kind: NodeKind::File { size },
            memoized_size: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    /// Children of a directory in the order they were added. `None` for files.
    pub fn children(&self) -> Option<&LinkedHashMap<String, NodeId>> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children()?.get(name).copied()
    }

    /// Stored size of a file, or the memoized aggregate of a directory if it is
    /// currently valid.
    fn cached_size(&self) -> Option<Size> {
        match &self.kind {
            NodeKind::File { size } => Some(*size),
            NodeKind::Directory { .. } => self.memoized_size.get().copied(),
        }
    }
}

/// A directory/file hierarchy stored as an arena of nodes.
///
/// Children are owned by the arena and referenced by [`NodeId`]; the parent
/// link on each node is a plain id, so there is no ownership cycle between a
/// directory and its children. The root directory is created with the tree
/// and nodes are never removed.
#[derive(Debug, Clone)]
pub struct ResourceTree {
    nodes: Vec<Node>,
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTree {
    pub fn new() -> Self {
        ResourceTree {
            nodes: vec![Node::directory(ROOT_NAME.to_string(), None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Looks up a node by id.
    ///
    /// # Panics
    ///
    /// If `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_ref(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn child(&self, directory: NodeId, name: &str) -> Option<NodeId> {
        self.node(directory).child(name)
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn directory_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_directory()).count()
    }

    pub fn file_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_file()).count()
    }

    /// Children of `id` in insertion order. Empty for files.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children()
            .into_iter()
            .flat_map(|children| children.values().copied())
    }

    pub fn subdirectories(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(move |&child| self.node(child).is_directory())
    }

    /// Absolute slash-separated path of a node, e.g. `/` or `/a/e`.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_some() {
                segments.push(node.name.as_str());
            }
            current = node.parent;
        }
        segments.reverse();
        format!("{ROOT_NAME}{}", segments.join("/"))
    }

    pub fn add_directory(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        let name = name.into();
        self.ensure_vacant(parent, &name)?;
        let id = self.push_child(parent, Node::directory(name, Some(parent)));
        trace!("Created directory {}", self.path(id));
        Ok(id)
    }

    pub fn add_file(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        size: Size,
    ) -> Result<NodeId, TreeError> {
        let name = name.into();
        self.ensure_vacant(parent, &name)?;
        let id = self.push_child(parent, Node::file(name, parent, size));
        trace!("Created file {} ({size})", self.path(id));
        Ok(id)
    }

    fn ensure_vacant(&self, parent: NodeId, name: &str) -> Result<(), TreeError> {
        match self.node(parent).children() {
            None => NotADirectorySnafu {
                path: self.path(parent),
            }
            .fail(),
            Some(children) if children.contains_key(name) => NameConflictSnafu {
                name,
                directory: self.path(parent),
            }
            .fail(),
            Some(_) => Ok(()),
        }
    }

    fn push_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        let name = node.name.clone();
        self.nodes.push(node);
        if let NodeKind::Directory { children } = &mut self.nodes[parent.0].kind {
            children.insert(name, id);
        }
        self.invalidate_sizes_from(parent);
        id
    }

    /// Clears the memoized size of `id` and every ancestor above it.
    ///
    /// A memoized directory always has memoized descendants, so the walk can
    /// stop at the first directory that holds no value.
    fn invalidate_sizes_from(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &mut self.nodes[node_id.0];
            if node.is_directory() && node.memoized_size.take().is_none() {
                break;
            }
            current = node.parent;
        }
    }

    /// Size of a file, or the sum of every file below a directory.
    ///
    /// Directory sizes are memoized on first use. The walk is post-order over
    /// an explicit stack, so tree depth is not bounded by the call stack.
    pub fn aggregate_size(&self, id: NodeId) -> Size {
        if let Some(size) = self.node(id).cached_size() {
            return size;
        }

        let mut result = Size::ZERO;
        let mut stack = vec![(id, false)];
        while let Some((directory, expanded)) = stack.pop() {
            let node = self.node(directory);
            let NodeKind::Directory { children } = &node.kind else {
                continue;
            };
            if node.memoized_size.get().is_some() {
                continue;
            }

            if expanded {
                // Every child directory was pushed after this entry, so it is
                // already memoized.
                let total: Size = children
                    .values()
                    .filter_map(|&child| self.node(child).cached_size())
                    .sum();
                let _ = node.memoized_size.set(total);
                result = total;
            } else {
                stack.push((directory, true));
                stack.extend(
                    children
                        .values()
                        .filter(|&&child| self.node(child).cached_size().is_none())
                        .map(|&child| (child, false)),
                );
            }
        }
        result
    }
}

/// Borrowed view of one node together with the tree it lives in.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a ResourceTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a ResourceTree {
        self.tree
    }

    pub fn name(&self) -> &'a str {
        self.tree.node(self.id).name()
    }

    pub fn size(&self) -> Size {
        self.tree.aggregate_size(self.id)
    }

    pub fn path(&self) -> String {
        self.tree.path(self.id)
    }

    pub fn is_directory(&self) -> bool {
        self.tree.node(self.id).is_directory()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree
            .parent(self.id)
            .map(|parent| self.tree.node_ref(parent))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum TreeError {
    #[snafu(display("'{name}' already exists in {directory}"))]
    NameConflict { name: String, directory: String },
    #[snafu(display("{path} is a file and cannot hold children"))]
    NotADirectory { path: String },
}
