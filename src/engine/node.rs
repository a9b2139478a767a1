//! Node descriptors and the node arena.
//!
//! Application code builds a [`Node`] tree with the builder methods below and
//! hands it to [`Engine::insert`](crate::Engine::insert), which validates it
//! and flattens it into the [`NodeTree`] arena. From then on a node is
//! addressed by [`NodeId`]; disposing it removes it from the arena, and the
//! generational key makes every later lookup miss.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use slotmap::SlotMap;

use crate::config::StyleContext;
use crate::error::NodeError;
use crate::properties::{Configurator, PropertyStore};
use crate::style::NodeStyle;
use crate::types::ViewKind;
use crate::view::{EventTarget, View, ViewEvent, ViewId};

use super::delegate::{ComponentKey, DelegateKey};

slotmap::new_key_type! {
    /// Handle to a node in the engine's arena.
    pub struct NodeId;
}

/// Creates the view for a node.
pub type CreateFn = Rc<dyn Fn(&StyleContext) -> View>;

/// Configuration and override closures.
pub type ConfigureFn = Rc<dyn Fn(&mut Configurator<'_>)>;

// =============================================================================
// Reuse identifiers
// =============================================================================

/// `"{kind}"` or `"{kind}_{qualifier}"`.
pub fn reuse_identifier(kind: ViewKind, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(qualifier) => format!("{}_{qualifier}", kind.name()),
        None => kind.name().to_string(),
    }
}

/// Stable 64-bit fingerprint of a reuse identifier.
pub fn fingerprint(reuse_identifier: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    reuse_identifier.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Node builder
// =============================================================================

/// Declarative description of one tree position.
#[derive(Clone)]
pub struct Node {
    kind: ViewKind,
    qualifier: Option<String>,
    key: Option<String>,
    children: Vec<Node>,
    unmanaged: Vec<Node>,
    create: Option<CreateFn>,
    configure: Option<ConfigureFn>,
    overrides: Option<ConfigureFn>,
    styles: Vec<Rc<dyn NodeStyle>>,
    handlers: Vec<EventTarget>,
    delegate: Option<DelegateKey>,
    component: Option<ComponentKey>,
}

impl Node {
    pub fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            qualifier: None,
            key: None,
            children: Vec::new(),
            unmanaged: Vec::new(),
            create: None,
            configure: None,
            overrides: None,
            styles: Vec::new(),
            handlers: Vec::new(),
            delegate: None,
            component: None,
        }
    }

    /// Qualify the reuse identifier; nodes only share views with nodes of the
    /// same kind and qualifier.
    pub fn reuse_identifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Stable key for lookups. Not used for matching.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn child(mut self, child: impl Into<Option<Node>>) -> Self {
        self.children.extend(child.into());
        self
    }

    /// Append children, dropping `None` placeholders.
    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Option<Node>>,
    {
        for child in children {
            let child: Option<Node> = child.into();
            self.children.extend(child);
        }
        self
    }

    /// Attach a child the engine tracks for keys and disposal but never
    /// renders; its container manages it.
    pub fn unmanaged(mut self, child: Node) -> Self {
        self.unmanaged.push(child);
        self
    }

    /// Custom view creation. Requires [`reuse_identifier`](Self::reuse_identifier).
    pub fn create_with(mut self, create: impl Fn(&StyleContext) -> View + 'static) -> Self {
        self.create = Some(Rc::new(create));
        self
    }

    pub fn configure(mut self, configure: impl Fn(&mut Configurator<'_>) + 'static) -> Self {
        self.configure = Some(Rc::new(configure));
        self
    }

    /// Runs after the configuration closure.
    pub fn overrides(mut self, overrides: impl Fn(&mut Configurator<'_>) + 'static) -> Self {
        self.overrides = Some(Rc::new(overrides));
        self
    }

    pub fn style(self, style: impl NodeStyle + 'static) -> Self {
        self.shared_style(Rc::new(style))
    }

    pub fn shared_style(mut self, style: Rc<dyn NodeStyle>) -> Self {
        self.styles.push(style);
        self
    }

    pub fn on(mut self, event: impl Into<String>, handler: impl Fn(&ViewEvent) + 'static) -> Self {
        self.handlers.push(EventTarget::new(event, handler));
        self
    }

    pub fn delegate(mut self, delegate: DelegateKey) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn component(mut self, component: ComponentKey) -> Self {
        self.component = Some(component);
        self
    }

    fn validate(&self) -> Result<(), NodeError> {
        if self.create.is_some() && self.qualifier.is_none() {
            return Err(NodeError::AmbiguousReuseIdentifier { kind: self.kind });
        }
        self.children
            .iter()
            .chain(&self.unmanaged)
            .try_for_each(Node::validate)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("qualifier", &self.qualifier)
            .field("key", &self.key)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Arena record
// =============================================================================

/// A node as stored in the arena.
pub struct NodeData {
    pub(crate) kind: ViewKind,
    pub(crate) reuse_identifier: String,
    pub(crate) fingerprint: u64,
    pub(crate) key: Option<String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) unmanaged_children: Vec<NodeId>,
    pub(crate) index: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) view: Option<ViewId>,
    pub(crate) store: PropertyStore,
    pub(crate) create: Option<CreateFn>,
    pub(crate) configure: Option<ConfigureFn>,
    pub(crate) overrides: Option<ConfigureFn>,
    pub(crate) styles: Vec<Rc<dyn NodeStyle>>,
    pub(crate) handlers: Vec<EventTarget>,
    pub(crate) delegate: Option<DelegateKey>,
    pub(crate) component: Option<ComponentKey>,
    pub(crate) pending_mount: bool,
    /// Set when reconciliation skipped this subtree; cleared by the next
    /// configuration pass.
    pub(crate) aborted: bool,
}

impl NodeData {
    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn reuse_identifier(&self) -> &str {
        &self.reuse_identifier
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn unmanaged_children(&self) -> &[NodeId] {
        &self.unmanaged_children
    }

    /// Position among the parent's children.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Bound view, if constructed.
    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    /// Properties recorded by the configuration pass in progress.
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }
}

impl fmt::Debug for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeData")
            .field("reuse_identifier", &self.reuse_identifier)
            .field("key", &self.key)
            .field("index", &self.index)
            .field("view", &self.view)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Arena of live nodes.
#[derive(Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, NodeData>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and flatten a descriptor tree. Returns the root's id.
    pub fn insert(&mut self, node: Node) -> Result<NodeId, NodeError> {
        node.validate()?;
        Ok(self.flatten(node, None, 0))
    }

    fn flatten(&mut self, node: Node, parent: Option<NodeId>, index: usize) -> NodeId {
        let Node {
            kind,
            qualifier,
            key,
            children,
            unmanaged,
            create,
            configure,
            overrides,
            styles,
            handlers,
            delegate,
            component,
        } = node;

        let reuse_identifier = reuse_identifier(kind, qualifier.as_deref());
        let id = self.nodes.insert(NodeData {
            kind,
            fingerprint: fingerprint(&reuse_identifier),
            reuse_identifier,
            key,
            children: Vec::new(),
            unmanaged_children: Vec::new(),
            index,
            parent,
            view: None,
            store: PropertyStore::new(),
            create,
            configure,
            overrides,
            styles,
            handlers,
            delegate,
            component,
            pending_mount: false,
            aborted: false,
        });

        let children = children
            .into_iter()
            .enumerate()
            .map(|(i, child)| self.flatten(child, Some(id), i))
            .collect();
        let unmanaged = unmanaged
            .into_iter()
            .enumerate()
            .map(|(i, child)| self.flatten(child, Some(id), i))
            .collect();

        let data = &mut self.nodes[id];
        data.children = children;
        data.unmanaged_children = unmanaged;
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        self.nodes.remove(id)
    }

    /// `id` and its managed descendants, pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id, false)
    }

    /// Like [`subtree`](Self::subtree), also descending into unmanaged children.
    pub fn subtree_with_unmanaged(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id, true)
    }

    fn walk(&self, id: NodeId, unmanaged: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            if unmanaged {
                stack.extend(node.unmanaged_children.iter().rev().copied());
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Depth-first search for the first node whose key equals `key`.
    pub fn node_with_key(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.subtree_with_unmanaged(id)
            .into_iter()
            .find(|candidate| self.nodes[*candidate].key.as_deref() == Some(key))
    }

    /// Every key in the subtree, unmanaged children included.
    pub fn retrieve_keys_recursively(&self, id: NodeId) -> HashSet<String> {
        self.subtree_with_unmanaged(id)
            .into_iter()
            .filter_map(|node| self.nodes[node].key.clone())
            .collect()
    }

    /// Nearest node from `id` upwards (inclusive) with a component.
    pub(crate) fn owning_component(&self, id: NodeId) -> Option<ComponentKey> {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c)) {
            if node.component.is_some() {
                return node.component;
            }
            current = node.parent;
        }
        None
    }
}

impl Index<NodeId> for NodeTree {
    type Output = NodeData;

    fn index(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for NodeTree {
    fn index_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id]
    }
}
