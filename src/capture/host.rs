//! Host document abstraction.
//!
//! The watcher never touches a real rendering engine: it only needs a stream
//! of structural changes and a way to query nodes. [`SyntheticDocument`] is a
//! small in-memory tree implementing that capability.

use super::selector::{ElementView, Selector};
use crate::errors::{AppError, AppResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub type NodeId = usize;

/// Listener invoked with the click target (the clicked node, which may be a
/// descendant of the node the listener is bound to).
pub type ClickHandler = Arc<dyn Fn(NodeId) + Send + Sync>;

/// One child-list change under `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

pub trait HostAdapter: Send + Sync {
    /// Stream of child-list change batches for the whole connected tree.
    fn subscribe(&self) -> UnboundedReceiver<Vec<Mutation>>;

    /// First element at or below `root`, in document order, matching `selector`.
    fn query(&self, root: NodeId, selector: &Selector) -> Option<NodeId>;

    fn query_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId>;

    /// Nearest element from `node` upwards (inclusive) matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId>;

    fn document_root(&self) -> NodeId;

    fn is_element(&self, node: NodeId) -> bool;

    /// Current value of a form field.
    fn value(&self, node: NodeId) -> Option<String>;

    /// Concatenated text of the node and its descendants.
    fn text_content(&self, node: NodeId) -> String;

    fn has_marker(&self, node: NodeId, marker: &str) -> bool;

    fn set_marker(&self, node: NodeId, marker: &str);

    fn add_click_listener(&self, node: NodeId, handler: ClickHandler);
}

enum NodeKind {
    Element {
        tag: String,
        attrs: HashMap<String, String>,
    },
    Text(String),
}

struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: Option<String>,
    listeners: Vec<ClickHandler>,
}

impl ElementView for Node {
    fn tag(&self) -> &str {
        match &self.kind {
            NodeKind::Element { tag, .. } => tag.as_str(),
            NodeKind::Text(_) => "#text",
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }
}

const ROOT: NodeId = 0;

struct Tree {
    nodes: Vec<Node>,
    subscribers: Vec<UnboundedSender<Vec<Mutation>>>,
}

impl Tree {
    fn node(&self, id: NodeId) -> AppResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| AppError::Host(format!("unknown node {id}")))
    }

    fn node_mut(&mut self, id: NodeId) -> AppResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| AppError::Host(format!("unknown node {id}")))
    }

    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes.get(id).and_then(|n| n.parent), move |p| {
            self.nodes.get(*p).and_then(|n| n.parent)
        })
    }

    fn is_connected(&self, id: NodeId) -> bool {
        id == ROOT || self.ancestors(id).any(|a| a == ROOT)
    }

    fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id).map(|n| &n.kind),
            Some(NodeKind::Element { .. })
        )
    }

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        if !self.is_element(id) {
            return false;
        }
        let node = &self.nodes[id];
        selector.matches(node, self.ancestors(id).map(|a| &self.nodes[a]))
    }

    /// Pre-order walk of the subtree rooted at `root`, root included.
    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.get(id) {
                out.push(id);
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    fn text_of(&self, id: NodeId) -> String {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| match &self.nodes[n].kind {
                NodeKind::Text(t) => Some(t.as_str()),
                NodeKind::Element { .. } => None,
            })
            .collect()
    }

    fn notify(&mut self, batch: Vec<Mutation>) {
        self.subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
    }

    fn detach(&mut self, id: NodeId) -> Option<Mutation> {
        let parent = self.nodes.get(id)?.parent?;
        let was_connected = self.is_connected(parent);

        self.nodes[parent].children.retain(|c| *c != id);
        self.nodes[id].parent = None;

        was_connected.then(|| Mutation {
            target: parent,
            added: Vec::new(),
            removed: vec![id],
        })
    }
}

/// In-memory document with a `body` root element.
#[derive(Clone)]
pub struct SyntheticDocument {
    tree: Arc<Mutex<Tree>>,
}

impl Default for SyntheticDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticDocument {
    pub fn new() -> Self {
        let body = Node {
            kind: NodeKind::Element {
                tag: "body".to_string(),
                attrs: HashMap::new(),
            },
            parent: None,
            children: Vec::new(),
            value: None,
            listeners: Vec::new(),
        };

        Self {
            tree: Arc::new(Mutex::new(Tree {
                nodes: vec![body],
                subscribers: Vec::new(),
            })),
        }
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs,
        })
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&self, kind: NodeKind) -> NodeId {
        let mut tree = self.tree.lock();
        tree.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            value: None,
            listeners: Vec::new(),
        });
        tree.nodes.len() - 1
    }

    /// Move `child` under `parent`. Subscribers hear about it only when the
    /// parent is part of the document.
    pub fn append(&self, parent: NodeId, child: NodeId) -> AppResult<()> {
        let mut tree = self.tree.lock();
        if !tree.is_element(parent) {
            return Err(AppError::Host(format!("node {parent} cannot have children")));
        }
        tree.node(child)?;
        if child == ROOT || child == parent || tree.ancestors(parent).any(|a| a == child) {
            return Err(AppError::Host(format!(
                "cannot insert node {child} under its own descendant {parent}"
            )));
        }

        let mut batch: Vec<Mutation> = tree.detach(child).into_iter().collect();

        tree.node_mut(child)?.parent = Some(parent);
        tree.node_mut(parent)?.children.push(child);

        if tree.is_connected(parent) {
            batch.push(Mutation {
                target: parent,
                added: vec![child],
                removed: Vec::new(),
            });
        }
        if !batch.is_empty() {
            tree.notify(batch);
        }
        Ok(())
    }

    pub fn remove(&self, node: NodeId) -> AppResult<()> {
        let mut tree = self.tree.lock();
        tree.node(node)?;
        if node == ROOT {
            return Err(AppError::Host("the document root cannot be removed".into()));
        }
        if let Some(m) = tree.detach(node) {
            tree.notify(vec![m]);
        }
        Ok(())
    }

    pub fn set_value(&self, node: NodeId, value: &str) -> AppResult<()> {
        self.tree.lock().node_mut(node)?.value = Some(value.to_string());
        Ok(())
    }

    /// Replace the children of `node` with a single text node.
    pub fn set_text(&self, node: NodeId, text: &str) -> AppResult<()> {
        let text_node = self.create_text(text);
        let mut tree = self.tree.lock();
        if !tree.is_element(node) {
            return Err(AppError::Host(format!("node {node} is not an element")));
        }

        let old = std::mem::take(&mut tree.node_mut(node)?.children);
        for c in &old {
            tree.nodes[*c].parent = None;
        }
        tree.nodes[text_node].parent = Some(node);
        tree.nodes[node].children.push(text_node);

        if tree.is_connected(node) {
            tree.notify(vec![Mutation {
                target: node,
                added: vec![text_node],
                removed: old,
            }]);
        }
        Ok(())
    }

    /// Dispatch a click on `node`, bubbling up through its ancestors.
    /// Returns how many listeners ran.
    pub fn click(&self, node: NodeId) -> AppResult<usize> {
        let handlers: Vec<ClickHandler> = {
            let tree = self.tree.lock();
            tree.node(node)?;
            std::iter::once(node)
                .chain(tree.ancestors(node))
                .flat_map(|id| tree.nodes[id].listeners.iter().cloned())
                .collect()
        };

        // listeners run without the tree lock held
        for h in &handlers {
            h(node);
        }
        Ok(handlers.len())
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.tree
            .lock()
            .nodes
            .get(node)
            .map(|n| n.listeners.len())
            .unwrap_or(0)
    }
}

impl HostAdapter for SyntheticDocument {
    fn subscribe(&self) -> UnboundedReceiver<Vec<Mutation>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.tree.lock().subscribers.push(tx);
        rx
    }

    fn query(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        let tree = self.tree.lock();
        tree.subtree(root)
            .into_iter()
            .find(|id| tree.matches(*id, selector))
    }

    fn query_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let tree = self.tree.lock();
        tree.subtree(root)
            .into_iter()
            .filter(|id| tree.matches(*id, selector))
            .collect()
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let tree = self.tree.lock();
        std::iter::once(node)
            .chain(tree.ancestors(node))
            .find(|id| tree.matches(*id, selector))
    }

    fn document_root(&self) -> NodeId {
        ROOT
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.tree.lock().is_element(node)
    }

    fn value(&self, node: NodeId) -> Option<String> {
        self.tree.lock().nodes.get(node).and_then(|n| n.value.clone())
    }

    fn text_content(&self, node: NodeId) -> String {
        self.tree.lock().text_of(node)
    }

    fn has_marker(&self, node: NodeId, marker: &str) -> bool {
        self.tree
            .lock()
            .nodes
            .get(node)
            .and_then(|n| n.attr(marker))
            .is_some()
    }

    fn set_marker(&self, node: NodeId, marker: &str) {
        if let Some(Node {
            kind: NodeKind::Element { attrs, .. },
            ..
        }) = self.tree.lock().nodes.get_mut(node)
        {
            attrs.insert(marker.to_string(), "true".to_string());
        }
    }

    fn add_click_listener(&self, node: NodeId, handler: ClickHandler) {
        if let Some(n) = self.tree.lock().nodes.get_mut(node) {
            n.listeners.push(handler);
        }
    }
}
