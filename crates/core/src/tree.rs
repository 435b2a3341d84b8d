//! The enriched data tree.
//!
//! Containers live in an arena and refer to each other through [`NodeId`]
//! handles. Every container records the handle of the container that holds
//! it (its parent relation) and, when it was a sequence element, its
//! position in that sequence (its index relation). Scalars are stored inline
//! in their container's slots and carry no relations.
//!
//! Template functions never see the arena directly; they receive a
//! [`NodeRef`], which resolves keys through the parent chain the way a
//! child object would fall back to its ancestors' fields.

use crate::error::TemplateError;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Handle of a container in an [`EnrichedTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Key names under which the parent and index relations are exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationNames {
    pub parent: String,
    pub index: String,
}

impl RelationNames {
    pub fn new(parent: impl Into<String>, index: impl Into<String>) -> Self {
        Self { parent: parent.into(), index: index.into() }
    }

    /// Both names must be non-empty and distinct, otherwise one relation
    /// would hide the other.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.parent.is_empty() || self.index.is_empty() {
            return Err(TemplateError::InvalidRelations("relation names cannot be empty".to_string()));
        }
        if self.parent == self.index {
            return Err(TemplateError::InvalidRelations(format!(
                "parent and index relations share the key '{}'",
                self.parent
            )));
        }
        Ok(())
    }
}

impl Default for RelationNames {
    fn default() -> Self {
        Self::new("$parent", "$index")
    }
}

/// A position inside a container: either an inline value or another container.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Value(Value),
    Node(NodeId),
}

impl Slot {
    pub(crate) fn null() -> Self {
        Slot::Value(Value::Null)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Body {
    Sequence(Vec<Slot>),
    Mapping(IndexMap<String, Slot>),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) body: Body,
    pub(crate) parent: Option<NodeId>,
    pub(crate) index: Option<usize>,
}

/// A data tree whose containers know their parent and originating index.
#[derive(Debug, Clone)]
pub struct EnrichedTree {
    nodes: Vec<NodeData>,
    root: Slot,
    relations: RelationNames,
}

impl EnrichedTree {
    pub(crate) fn empty(relations: RelationNames) -> Self {
        Self { nodes: Vec::new(), root: Slot::null(), relations }
    }

    /// The relation key names this tree was enriched with.
    pub fn relations(&self) -> &RelationNames {
        &self.relations
    }

    /// Number of containers in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A view of the root position.
    pub fn root(&self) -> NodeRef<'_> {
        self.slot_ref(&self.root)
    }

    /// A view of the container behind `id`, if this tree has one.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then(|| self.node_ref(id))
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, at: At::Node(id) }
    }

    /// Materialises the tree back into plain JSON, without relations.
    pub fn to_plain(&self) -> Value {
        self.materialize(&self.root)
    }

    // --- arena plumbing used by the enrichment and evaluation passes ---

    pub(crate) fn alloc(&mut self, body: Body) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData { body, parent: None, index: None });
        id
    }

    pub(crate) fn attach(&mut self, id: NodeId, parent: Option<NodeId>, index: Option<usize>) {
        let data = &mut self.nodes[id.0];
        data.parent = parent;
        data.index = index;
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub(crate) fn body_mut(&mut self, id: NodeId) -> &mut Body {
        &mut self.nodes[id.0].body
    }

    pub(crate) fn root_slot(&self) -> &Slot {
        &self.root
    }

    pub(crate) fn set_root(&mut self, root: Slot) {
        self.root = root;
    }

    pub(crate) fn is_mapping(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].body, Body::Mapping(_))
    }

    pub(crate) fn is_sequence(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].body, Body::Sequence(_))
    }

    fn slot_ref<'t>(&'t self, slot: &'t Slot) -> NodeRef<'t> {
        match slot {
            Slot::Node(id) => NodeRef { tree: self, at: At::Node(*id) },
            Slot::Value(v) => NodeRef { tree: self, at: At::Leaf(Cow::Borrowed(v)) },
        }
    }

    fn materialize(&self, slot: &Slot) -> Value {
        match slot {
            Slot::Value(v) => v.clone(),
            Slot::Node(id) => match &self.nodes[id.0].body {
                Body::Sequence(items) => Value::Array(items.iter().map(|s| self.materialize(s)).collect()),
                Body::Mapping(entries) => Value::Object(
                    entries
                        .iter()
                        .map(|(k, s)| (k.clone(), self.materialize(s)))
                        .collect::<Map<String, Value>>(),
                ),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum At<'t> {
    Node(NodeId),
    Leaf(Cow<'t, Value>),
}

/// A read-only view of one position in an [`EnrichedTree`].
///
/// This is the evaluation context handed to template functions.
#[derive(Debug, Clone)]
pub struct NodeRef<'t> {
    tree: &'t EnrichedTree,
    at: At<'t>,
}

impl<'t> NodeRef<'t> {
    /// A view of a value that is not stored in any container.
    pub(crate) fn detached(tree: &'t EnrichedTree, value: &'t Value) -> Self {
        Self { tree, at: At::Leaf(Cow::Borrowed(value)) }
    }

    pub fn tree(&self) -> &'t EnrichedTree {
        self.tree
    }

    /// The container handle, if this position is a container.
    pub fn id(&self) -> Option<NodeId> {
        match self.at {
            At::Node(id) => Some(id),
            At::Leaf(_) => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        match &self.at {
            At::Node(id) => self.tree.is_mapping(*id),
            At::Leaf(v) => v.is_object(),
        }
    }

    pub fn is_sequence(&self) -> bool {
        match &self.at {
            At::Node(id) => self.tree.is_sequence(*id),
            At::Leaf(v) => v.is_array(),
        }
    }

    /// The enclosing container. Roots and scalar leaves have none.
    pub fn parent(&self) -> Option<NodeRef<'t>> {
        let At::Node(id) = self.at else { return None };
        self.tree.data(id).parent.map(|p| self.tree.node_ref(p))
    }

    /// The position this container had in its enclosing sequence.
    pub fn index(&self) -> Option<usize> {
        let At::Node(id) = self.at else { return None };
        self.tree.data(id).index
    }

    /// Looks a key up on this position only. The configured relation names
    /// always resolve to the parent container and the index, even when the
    /// mapping holds an entry of the same name.
    pub fn own(&self, key: &str) -> Option<NodeRef<'t>> {
        match &self.at {
            At::Node(id) => {
                let data = self.tree.data(*id);
                let relations = &self.tree.relations;
                if key == relations.parent {
                    return self.parent();
                }
                if key == relations.index {
                    return data.index.map(|i| NodeRef { tree: self.tree, at: At::Leaf(Cow::Owned(Value::from(i))) });
                }
                match &data.body {
                    Body::Mapping(entries) => entries.get(key).map(|slot| self.tree.slot_ref(slot)),
                    Body::Sequence(_) => None,
                }
            }
            At::Leaf(Cow::Borrowed(value)) => value
                .get(key)
                .map(|v| NodeRef { tree: self.tree, at: At::Leaf(Cow::Borrowed(v)) }),
            At::Leaf(Cow::Owned(_)) => None,
        }
    }

    /// Looks a key up on this position, then on each ancestor in turn.
    pub fn get(&self, key: &str) -> Option<NodeRef<'t>> {
        if let Some(found) = self.own(key) {
            return Some(found);
        }
        let mut ancestor = self.parent();
        while let Some(node) = ancestor {
            if let Some(found) = node.own(key) {
                return Some(found);
            }
            ancestor = node.parent();
        }
        None
    }

    /// Element `i` of a sequence.
    pub fn at(&self, i: usize) -> Option<NodeRef<'t>> {
        match &self.at {
            At::Node(id) => match &self.tree.data(*id).body {
                Body::Sequence(items) => items.get(i).map(|s| self.tree.slot_ref(s)),
                Body::Mapping(_) => None,
            },
            At::Leaf(Cow::Borrowed(value)) => value
                .get(i)
                .map(|v| NodeRef { tree: self.tree, at: At::Leaf(Cow::Borrowed(v)) }),
            At::Leaf(Cow::Owned(_)) => None,
        }
    }

    /// Resolves a dotted path such as `$parent.name` or `items.0.id`.
    /// Numeric segments index into sequences; every other segment goes
    /// through [`NodeRef::get`].
    pub fn path(&self, path: &str) -> Option<NodeRef<'t>> {
        let mut current = self.clone();
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match segment.parse::<usize>() {
                Ok(i) if current.is_sequence() => current.at(i)?,
                _ => current.get(segment)?,
            };
        }
        Some(current)
    }

    /// Own data keys of a mapping, in insertion order. Relations are not listed.
    pub fn keys(&self) -> Vec<&str> {
        match &self.at {
            At::Node(id) => match &self.tree.data(*id).body {
                Body::Mapping(entries) => entries.keys().map(String::as_str).collect(),
                Body::Sequence(_) => Vec::new(),
            },
            At::Leaf(v) => v.as_object().map(|m| m.keys().map(String::as_str).collect()).unwrap_or_default(),
        }
    }

    /// Number of elements (sequences) or entries (mappings); zero for scalars.
    pub fn len(&self) -> usize {
        match &self.at {
            At::Node(id) => match &self.tree.data(*id).body {
                Body::Sequence(items) => items.len(),
                Body::Mapping(entries) => entries.len(),
            },
            At::Leaf(v) => match v.as_ref() {
                Value::Array(a) => a.len(),
                Value::Object(m) => m.len(),
                _ => 0,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn leaf(&self) -> Option<&Value> {
        match &self.at {
            At::Leaf(v) => Some(v.as_ref()),
            At::Node(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.leaf().is_some_and(Value::is_null)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.leaf().and_then(Value::as_str)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.leaf().and_then(Value::as_f64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.leaf().and_then(Value::as_i64)
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.leaf().and_then(Value::as_u64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.leaf().and_then(Value::as_bool)
    }

    /// Materialises this position as plain JSON, without relations.
    pub fn to_value(&self) -> Value {
        match &self.at {
            At::Node(id) => self.tree.materialize(&Slot::Node(*id)),
            At::Leaf(v) => v.as_ref().clone(),
        }
    }
}

impl fmt::Display for NodeRef<'_> {
    /// Strings print without quotes; everything else prints as JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_value() {
            Value::String(s) => f.write_str(&s),
            other => write!(f, "{other}"),
        }
    }
}
