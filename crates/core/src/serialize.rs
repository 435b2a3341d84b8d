//! Cycle-safe JSON serialization and the bookkeeping-key censor.
//!
//! The enriched tree is serialized through borrowed `Serialize` views. A
//! visited bitmap indexed by [`NodeId`] ensures each container is written at
//! most once; a container reached a second time (only possible through a
//! parent relation) is left out of the output.

use crate::error::TemplateError;
use crate::tree::{Body, EnrichedTree, NodeId, Slot};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::cell::RefCell;

/// First character of every bookkeeping key.
pub const BOOKKEEPING_SENTINEL: char = '$';

/// Decides, per mapping key, whether the entry is written.
pub type KeyFilter = dyn Fn(&str) -> bool;

pub fn is_bookkeeping_key(key: &str) -> bool {
    key.starts_with(BOOKKEEPING_SENTINEL)
}

/// Drops bookkeeping entries: returns `None` for keys starting with `$`,
/// otherwise hands the value back.
pub fn censor<V>(key: &str, value: V) -> Option<V> {
    if is_bookkeeping_key(key) { None } else { Some(value) }
}

/// [`censor`] in the shape of a [`KeyFilter`].
pub fn censor_key(key: &str) -> bool {
    censor(key, ()).is_some()
}

/// Recursively removes bookkeeping entries from a plain value.
pub fn censor_value(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(censor_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter_map(|(k, v)| censor(k, v).map(|v| (k.clone(), censor_value(v))))
                .collect::<Map<String, Value>>(),
        ),
        scalar => scalar.clone(),
    }
}

/// Indentation of serialized output, after `JSON.stringify`'s `space` argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Indent {
    #[default]
    Compact,
    /// Up to ten spaces per level.
    Spaces(usize),
    /// Up to ten characters of the given text per level.
    Text(String),
}

impl Indent {
    fn unit(&self) -> Option<String> {
        let unit = match self {
            Indent::Compact => return None,
            Indent::Spaces(n) => " ".repeat((*n).min(10)),
            Indent::Text(text) => text.chars().take(10).collect(),
        };
        (!unit.is_empty()).then_some(unit)
    }
}

/// Serializes anything serde can, honouring `indent`.
pub fn stringify<S: Serialize + ?Sized>(value: &S, indent: &Indent) -> Result<String, TemplateError> {
    let Some(unit) = indent.unit() else {
        return Ok(serde_json::to_string(value)?);
    };
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(unit.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| TemplateError::Serialization(e.to_string()))
}

/// Serializes an enriched tree, dropping entries rejected by `filter` and
/// skipping containers that were already written.
pub fn stringify_cyclic(tree: &EnrichedTree, filter: Option<&KeyFilter>, indent: &Indent) -> Result<String, TemplateError> {
    stringify(&tree.view().filtered(filter), indent)
}

/// Serializes a plain value, dropping entries rejected by `filter`.
pub fn stringify_value(value: &Value, filter: Option<&KeyFilter>, indent: &Indent) -> Result<String, TemplateError> {
    stringify(&ValueView { value, filter }, indent)
}

impl EnrichedTree {
    /// A serializable view of the whole tree. Relations are omitted unless
    /// requested with [`TreeView::with_relations`].
    pub fn view(&self) -> TreeView<'_> {
        TreeView {
            tree: self,
            filter: None,
            relations: false,
            visited: RefCell::new(vec![false; self.len()]),
        }
    }

    /// Serializes the tree through `filter` straight into a `Value`.
    pub fn to_value(&self, filter: Option<&KeyFilter>) -> Result<Value, TemplateError> {
        Ok(serde_json::to_value(self.view().filtered(filter))?)
    }
}

/// Serializable view of an [`EnrichedTree`].
pub struct TreeView<'t> {
    tree: &'t EnrichedTree,
    filter: Option<&'t KeyFilter>,
    relations: bool,
    visited: RefCell<Vec<bool>>,
}

impl<'t> TreeView<'t> {
    pub fn filtered(mut self, filter: Option<&'t KeyFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Also writes each mapping's parent and index relations under their
    /// configured names. A parent that was already written is skipped.
    pub fn with_relations(mut self) -> Self {
        self.relations = true;
        self
    }

    fn keep(&self, key: &str) -> bool {
        self.filter.is_none_or(|f| f(key))
    }

    fn is_visited(&self, id: NodeId) -> bool {
        self.visited.borrow()[id.index()]
    }

    fn mark(&self, id: NodeId) {
        self.visited.borrow_mut()[id.index()] = true;
    }

    fn slot<'v>(&'v self, slot: &'v Slot) -> SlotView<'v, 't> {
        SlotView { view: self, slot }
    }
}

impl Serialize for TreeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slot(self.tree.root_slot()).serialize(serializer)
    }
}

struct SlotView<'v, 't> {
    view: &'v TreeView<'t>,
    slot: &'v Slot,
}

impl Serialize for SlotView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.slot {
            Slot::Value(value) => ValueView { value, filter: self.view.filter }.serialize(serializer),
            Slot::Node(id) => NodeView { view: self.view, id: *id }.serialize(serializer),
        }
    }
}

struct NodeView<'v, 't> {
    view: &'v TreeView<'t>,
    id: NodeId,
}

impl Serialize for NodeView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let view = self.view;
        view.mark(self.id);
        let data = view.tree.data(self.id);
        match &data.body {
            Body::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for slot in items {
                    match slot {
                        Slot::Node(id) if view.is_visited(*id) => seq.serialize_element(&Value::Null)?,
                        _ => seq.serialize_element(&view.slot(slot))?,
                    }
                }
                seq.end()
            }
            Body::Mapping(entries) => {
                let mut map = serializer.serialize_map(None)?;
                let names = view.tree.relations();
                for (key, slot) in entries {
                    if !view.keep(key) || matches!(slot, Slot::Node(id) if view.is_visited(*id)) {
                        continue;
                    }
                    // Relation names resolve to relations, not to data.
                    if view.relations && (*key == names.parent || *key == names.index) {
                        continue;
                    }
                    map.serialize_entry(key, &view.slot(slot))?;
                }
                if view.relations {
                    if view.keep(&names.parent) {
                        match data.parent {
                            None => map.serialize_entry(&names.parent, &Value::Null)?,
                            Some(parent) if view.is_visited(parent) => {}
                            Some(parent) => map.serialize_entry(&names.parent, &NodeView { view, id: parent })?,
                        }
                    }
                    if let Some(index) = data.index
                        && view.keep(&names.index)
                    {
                        map.serialize_entry(&names.index, &index)?;
                    }
                }
                map.end()
            }
        }
    }
}

struct ValueView<'v> {
    value: &'v Value,
    filter: Option<&'v KeyFilter>,
}

impl Serialize for ValueView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for value in items {
                    seq.serialize_element(&ValueView { value, filter: self.filter })?;
                }
                seq.end()
            }
            Value::Object(entries) => {
                let mut map = serializer.serialize_map(None)?;
                for (key, value) in entries {
                    if self.filter.is_none_or(|f| f(key)) {
                        map.serialize_entry(key, &ValueView { value, filter: self.filter })?;
                    }
                }
                map.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}
