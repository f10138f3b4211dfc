//! Hierarchical translation trees.
//!
//! A [`Tree`] addresses nodes by dot-separated path segments. Each node may
//! hold one [`TranslationRecord`] and any number of named children, and knows
//! its parent so that relative paths can be resolved from it.
//!
//! Nodes live in an arena owned by the tree. A link makes one node reachable
//! through a second parent, which is how a whole subtree gets aliased.

mod error;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub use error::TreeError;

use crate::types::TranslationRecord;

/// Handle to a node inside one [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    record: Option<Arc<TranslationRecord>>,
    children: BTreeMap<String, NodeId>,
}

impl Node {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            record: None,
            children: BTreeMap::new(),
        }
    }
}

/// A rose tree of translation records.
///
/// # Example
///
/// ```
/// use i18nmod::{RecordContent, Tree, TranslationRecord};
///
/// let mut tree = Tree::new();
/// tree.add(
///     TranslationRecord::builder()
///         .key("users.greeting")
///         .content(RecordContent::Text("Hello".to_string()))
///         .build(),
/// )
/// .unwrap();
/// tree.link("people", "users").unwrap();
///
/// assert_eq!(tree.get("people.greeting").unwrap().text(), Some("Hello"));
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    const ROOT: NodeId = NodeId(0);

    /// Create a tree holding only its root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("", None)],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Segment name of a node (empty for the root).
    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn record(&self, id: NodeId) -> Option<&Arc<TranslationRecord>> {
        self.node(id).record.as_ref()
    }

    /// Named children of a node, in name order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> {
        self.node(id)
            .children
            .iter()
            .map(|(name, child)| (name.as_str(), *child))
    }

    /// Whether the tree holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.is_subtree_empty(Self::ROOT)
    }

    fn is_subtree_empty(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.record.is_none()
            && node
                .children
                .values()
                .all(|child| self.is_subtree_empty(*child))
    }

    /// Descend from `from` along `path`, creating missing nodes.
    ///
    /// A leading `/` restarts at the root. Each leading `.` then moves one
    /// level up toward the parent before the remaining segments are walked.
    pub fn tree(&mut self, from: NodeId, path: &str) -> Result<NodeId, TreeError> {
        let (mut node, rest) = self.start_of(from, path)?;
        if rest.is_empty() {
            return Ok(node);
        }

        for segment in rest.split('.') {
            if segment.is_empty() {
                return Err(TreeError::EmptySegment {
                    path: path.to_string(),
                });
            }
            node = match self.node(node).children.get(segment).copied() {
                Some(child) => child,
                None => {
                    let child = self.push(Node::new(segment, Some(node)));
                    self.node_mut(node)
                        .children
                        .insert(segment.to_string(), child);
                    child
                }
            };
        }
        Ok(node)
    }

    /// Look up the node at `path` without creating anything.
    pub fn find(&self, from: NodeId, path: &str) -> Result<Option<NodeId>, TreeError> {
        let (mut node, rest) = self.start_of(from, path)?;
        if rest.is_empty() {
            return Ok(Some(node));
        }

        for segment in rest.split('.') {
            if segment.is_empty() {
                return Err(TreeError::EmptySegment {
                    path: path.to_string(),
                });
            }
            match self.node(node).children.get(segment) {
                Some(child) => node = *child,
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    /// Resolve the `/` and leading-dot prefix of a path.
    fn start_of<'p>(&self, from: NodeId, path: &'p str) -> Result<(NodeId, &'p str), TreeError> {
        if path.is_empty() {
            return Err(TreeError::EmptyPath);
        }

        let (mut node, mut rest) = match path.strip_prefix('/') {
            Some(rest) => (Self::ROOT, rest),
            None => (from, path),
        };

        while let Some(stripped) = rest.strip_prefix('.') {
            node = self
                .parent(node)
                .ok_or_else(|| TreeError::AboveRoot {
                    path: path.to_string(),
                })?;
            rest = stripped;
        }

        Ok((node, rest))
    }

    /// Record stored at an absolute path, if any.
    pub fn get(&self, path: &str) -> Option<&Arc<TranslationRecord>> {
        self.find(Self::ROOT, path)
            .ok()
            .flatten()
            .and_then(|id| self.record(id))
    }

    /// Insert a record at its own key path, replacing any previous record.
    pub fn add(&mut self, record: TranslationRecord) -> Result<NodeId, TreeError> {
        let id = self.tree(Self::ROOT, record.key())?;
        self.node_mut(id).record = Some(Arc::new(record));
        Ok(id)
    }

    /// Redirect the node at `path` to the node resolved by `target`.
    ///
    /// `target` is resolved relative to the parent of `path`: `x.y` names a
    /// sibling subtree, `.x.y` starts one level higher, `/x.y` is absolute.
    pub fn link(&mut self, path: &str, target: &str) -> Result<NodeId, TreeError> {
        let node = self.tree(Self::ROOT, path)?;
        self.link_node(node, target)
    }

    /// Replace `node` in its parent's child map with the node at `target`.
    pub fn link_node(&mut self, node: NodeId, target: &str) -> Result<NodeId, TreeError> {
        let parent = self.parent(node).ok_or(TreeError::LinkRoot)?;
        let destination = self.tree(parent, target)?;

        if self.reaches(destination, parent) {
            return Err(TreeError::LinkCycle {
                path: self.path_of(node),
                target: target.to_string(),
            });
        }

        let name = self.node(node).name.clone();
        self.node_mut(parent).children.insert(name, destination);
        Ok(destination)
    }

    /// Whether `to` is `from` or reachable from it through child edges.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut seen = vec![false; self.nodes.len()];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if seen[id.0] {
                continue;
            }
            seen[id.0] = true;
            stack.extend(self.node(id).children.values().copied());
        }
        false
    }

    /// Dotted path from the root following parent links.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node != Self::ROOT {
                segments.push(self.node(node).name.as_str());
            }
            current = self.parent(node);
        }
        segments.reverse();
        segments.join(".")
    }

    /// Merge `other` into this tree.
    ///
    /// Paths only present in `other` are copied in. Where both trees hold a
    /// record at the same path, this tree's record is kept: the first writer
    /// wins and later merges only fill gaps.
    pub fn merge(&mut self, other: &Tree) {
        let mut copied = HashMap::new();
        self.merge_node(Self::ROOT, other, Tree::ROOT, &mut copied);
    }

    fn merge_node(
        &mut self,
        target: NodeId,
        other: &Tree,
        source: NodeId,
        copied: &mut HashMap<NodeId, NodeId>,
    ) {
        if self.node(target).record.is_none() {
            self.node_mut(target).record = other.node(source).record.clone();
        }

        let incoming: Vec<(String, NodeId)> = other
            .node(source)
            .children
            .iter()
            .map(|(name, child)| (name.clone(), *child))
            .collect();

        for (name, child) in incoming {
            if other.is_subtree_empty(child) {
                continue;
            }
            match self.node(target).children.get(&name).copied() {
                Some(existing) => self.merge_node(existing, other, child, copied),
                None => {
                    let copy = self.copy_subtree(other, child, target, copied);
                    self.node_mut(target).children.insert(name, copy);
                }
            }
        }
    }

    /// Copy a subtree of `other` under `parent`, keeping shared nodes shared.
    fn copy_subtree(
        &mut self,
        other: &Tree,
        source: NodeId,
        parent: NodeId,
        copied: &mut HashMap<NodeId, NodeId>,
    ) -> NodeId {
        if let Some(existing) = copied.get(&source) {
            return *existing;
        }

        let node = other.node(source);
        let mut fresh = Node::new(&node.name, Some(parent));
        fresh.record = node.record.clone();
        let id = self.push(fresh);
        copied.insert(source, id);

        for (name, child) in &node.children {
            let copy = self.copy_subtree(other, *child, id, copied);
            self.node_mut(id).children.insert(name.clone(), copy);
        }
        id
    }

    /// Drop child entries whose subtree holds no record.
    pub fn prune(&mut self) {
        let ids: Vec<NodeId> = (0..self.nodes.len()).map(NodeId).collect();
        for id in ids {
            let empty: Vec<String> = self
                .node(id)
                .children
                .iter()
                .filter(|(_, child)| self.is_subtree_empty(**child))
                .map(|(name, _)| name.clone())
                .collect();
            for name in empty {
                self.node_mut(id).children.remove(&name);
            }
        }
    }

    /// Visit every record depth-first with its dotted path.
    ///
    /// Linked subtrees are visited once per path that reaches them.
    pub fn walk(&self, mut f: impl FnMut(&str, &Arc<TranslationRecord>)) {
        self.walk_node(Self::ROOT, "", &mut f);
    }

    fn walk_node(
        &self,
        id: NodeId,
        prefix: &str,
        f: &mut impl FnMut(&str, &Arc<TranslationRecord>),
    ) {
        for (name, child) in &self.node(id).children {
            let path = format!("{prefix}{name}");
            if let Some(record) = &self.node(*child).record {
                f(&path, record);
            }
            self.walk_node(*child, &format!("{path}."), f);
        }
    }

    /// Flatten into a path → record map.
    pub fn flatten(&self) -> BTreeMap<String, Arc<TranslationRecord>> {
        let mut flat = BTreeMap::new();
        self.walk(|path, record| {
            flat.insert(path.to_string(), Arc::clone(record));
        });
        flat
    }

    fn same_shape(&self, id: NodeId, other: &Tree, other_id: NodeId) -> bool {
        let (a, b) = (self.node(id), other.node(other_id));
        let records_match = match (&a.record, &b.record) {
            (Some(x), Some(y)) => x == y,
            (None, None) => true,
            (Some(_), None) | (None, Some(_)) => false,
        };
        records_match
            && a.children.len() == b.children.len()
            && a.children.iter().all(|(name, child)| {
                b.children
                    .get(name)
                    .is_some_and(|theirs| self.same_shape(*child, other, *theirs))
            })
    }
}

impl PartialEq for Tree {
    /// Structural equality: same paths holding equal records.
    fn eq(&self, other: &Self) -> bool {
        self.same_shape(Self::ROOT, other, Tree::ROOT)
    }
}
