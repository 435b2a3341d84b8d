//! The two-phase template evaluator.
//!
//! The template is walked in lock-step with the enriched data. At every
//! mapping level all function entries run first and their results are
//! written into the data node; only then are the remaining entries
//! evaluated recursively, so nested templates observe the freshly computed
//! sibling values.

use crate::enrich::enrich;
use crate::error::TemplateError;
use crate::template::{TemplateFn, TemplateNode};
use crate::tree::{Body, EnrichedTree, NodeId, NodeRef, Slot};
use indexmap::IndexMap;
use serde_json::Value;

/// Evaluates `template` against `tree`, writing results into the tree.
/// The returned tree is the raw context: it still carries relations and any
/// bookkeeping keys the template produced.
pub fn eval_functions(template: &TemplateNode, mut tree: EnrichedTree) -> Result<EnrichedTree, TemplateError> {
    let root = tree.root_slot().clone();
    let evaluated = Evaluator { tree: &mut tree }.eval(template, root, None, None)?;
    tree.set_root(evaluated);
    Ok(tree)
}

struct Evaluator<'t> {
    tree: &'t mut EnrichedTree,
}

impl Evaluator<'_> {
    fn eval(
        &mut self,
        template: &TemplateNode,
        data: Slot,
        parent: Option<NodeId>,
        key: Option<&str>,
    ) -> Result<Slot, TemplateError> {
        match template {
            TemplateNode::Function(_) => Err(TemplateError::InvalidTemplate(match key {
                Some(key) => format!("function at '{key}' is not inside a mapping"),
                None => "a function cannot be the template root".to_string(),
            })),
            TemplateNode::Sequence(_) => Err(TemplateError::InvalidTemplate(format!(
                "templates should not contain sequences (found at '{}')",
                key.unwrap_or("<root>")
            ))),
            TemplateNode::Mapping(entries) => match data {
                Slot::Node(id) if self.tree.is_sequence(id) => {
                    self.broadcast(entries, id)?;
                    Ok(Slot::Node(id))
                }
                other => self.eval_on_object(entries, other, parent, None),
            },
            literal => Ok(Slot::Value(literal.as_literal().unwrap_or(Value::Null))),
        }
    }

    /// Applies one mapping template to every element of a sequence.
    fn broadcast(&mut self, entries: &IndexMap<String, TemplateNode>, id: NodeId) -> Result<(), TemplateError> {
        let len = match &self.tree.data(id).body {
            Body::Sequence(items) => items.len(),
            Body::Mapping(_) => 0,
        };
        log::trace!("broadcasting template over {len} sequence elements");
        for i in 0..len {
            let item = match &self.tree.data(id).body {
                Body::Sequence(items) => items[i].clone(),
                Body::Mapping(_) => Slot::null(),
            };
            let result = self.eval_on_object(entries, item, Some(id), Some(i))?;
            if let Body::Sequence(items) = self.tree.body_mut(id) {
                items[i] = result;
            }
        }
        Ok(())
    }

    fn eval_on_object(
        &mut self,
        entries: &IndexMap<String, TemplateNode>,
        data: Slot,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<Slot, TemplateError> {
        let id = match data {
            Slot::Node(id) if self.tree.is_mapping(id) => id,
            Slot::Value(Value::Null) => {
                let id = self.tree.alloc(Body::Mapping(IndexMap::new()));
                self.tree.attach(id, parent, index);
                id
            }
            Slot::Value(value @ Value::Object(_)) => match enrich(self.tree, &value, parent, index)? {
                Slot::Node(id) => id,
                other => return Ok(other),
            },
            other => {
                self.call_detached(entries, &other)?;
                return Ok(other);
            }
        };

        // Phase 1: functions, written back immediately.
        for (key, node) in entries {
            if let TemplateNode::Function(f) = node {
                let value = self.call(f, key, self.tree.node_ref(id))?;
                if let Body::Mapping(slots) = self.tree.body_mut(id) {
                    slots.insert(key.clone(), Slot::Value(value));
                }
            }
        }

        // Phase 2: everything else, recursively.
        for (key, node) in entries.iter().filter(|(_, node)| !node.is_function()) {
            let child = match &self.tree.data(id).body {
                Body::Mapping(slots) => slots.get(key).cloned().unwrap_or_else(Slot::null),
                Body::Sequence(_) => Slot::null(),
            };
            let result = self.eval(node, child, Some(id), Some(key))?;
            if let Body::Mapping(slots) = self.tree.body_mut(id) {
                slots.insert(key.clone(), result);
            }
        }

        Ok(Slot::Node(id))
    }

    /// Runs the functions of `entries` with a non-mapping position as their
    /// context. Such a position cannot hold keys, so the results are dropped.
    fn call_detached(&self, entries: &IndexMap<String, TemplateNode>, data: &Slot) -> Result<(), TemplateError> {
        for (key, node) in entries {
            if let TemplateNode::Function(f) = node {
                let this = match data {
                    Slot::Node(id) => self.tree.node_ref(*id),
                    Slot::Value(value) => NodeRef::detached(&*self.tree, value),
                };
                let discarded = self.call(f, key, this)?;
                log::warn!("dropping result of '{key}' evaluated on a non-mapping value: {discarded}");
            }
        }
        Ok(())
    }

    fn call(&self, f: &TemplateFn, key: &str, this: NodeRef<'_>) -> Result<Value, TemplateError> {
        f.call(&this).map_err(|e| TemplateError::Function {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich_with_parents;
    use crate::tree::RelationNames;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn run(template: &TemplateNode, data: serde_json::Value) -> Result<serde_json::Value, TemplateError> {
        let tree = enrich_with_parents(&data, RelationNames::default())?;
        Ok(eval_functions(template, tree)?.to_plain())
    }

    #[test]
    fn test_function_reads_local_data() {
        let template = TemplateNode::mapping()
            .with("@id", TemplateNode::function(|this| json!(format!("urn:{}", this.get("name").unwrap()))));
        let result = run(&template, json!({ "name": "x" })).unwrap();
        assert_eq!(result, json!({ "name": "x", "@id": "urn:x" }));
    }

    #[test]
    fn test_broadcast_over_sequence_with_parent_access() {
        let template = TemplateNode::mapping().with(
            "items",
            TemplateNode::mapping().with(
                "@id",
                TemplateNode::function(|this| {
                    let parent = this.path("$parent.name").map(|n| n.to_string()).unwrap_or_default();
                    let name = this.get("name").map(|n| n.to_string()).unwrap_or_default();
                    json!(format!("urn:{parent}/{name}"))
                }),
            ),
        );
        let data = json!({ "name": "root", "items": [{ "name": "a" }, { "name": "b" }] });
        let result = run(&template, data).unwrap();
        assert_eq!(result["items"][0]["@id"], json!("urn:root/a"));
        assert_eq!(result["items"][1]["@id"], json!("urn:root/b"));
    }

    #[test]
    fn test_functions_run_before_nested_templates() {
        let template = TemplateNode::mapping()
            .with(
                "child",
                TemplateNode::mapping().with(
                    "@id",
                    TemplateNode::function(|this| this.path("$parent.@id").map(|n| n.to_value()).unwrap_or_default()),
                ),
            )
            .with("@id", TemplateNode::function(|_| json!("urn:parent")));
        let result = run(&template, json!({ "child": {} })).unwrap();
        assert_eq!(result["child"]["@id"], json!("urn:parent"));
    }

    #[test]
    fn test_function_phase_order_follows_template() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = |name: &'static str, seen: Arc<Mutex<Vec<&'static str>>>| {
            TemplateNode::function(move |_| {
                seen.lock().unwrap().push(name);
                json!(name)
            })
        };
        let template = TemplateNode::mapping()
            .with("nested", TemplateNode::mapping().with("inner", record("inner", seen.clone())))
            .with("first", record("first", seen.clone()))
            .with("second", record("second", seen.clone()));
        run(&template, json!({ "nested": {} })).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "inner"]);
    }

    #[test]
    fn test_index_relation_visible_to_functions() {
        let template = TemplateNode::mapping()
            .with("@id", TemplateNode::function(|this| json!(this.get("$index").and_then(|i| i.as_u64()))));
        let result = run(&template, json!([{ "n": 1 }, { "n": 2 }])).unwrap();
        assert_eq!(result, json!([{ "n": 1, "@id": 0 }, { "n": 2, "@id": 1 }]));
    }

    #[test]
    fn test_missing_data_materialises_mapping() {
        let template = TemplateNode::mapping()
            .with("@context", TemplateNode::mapping().with("@vocab", "http://schema.org/"));
        let result = run(&template, json!({ "name": "x" })).unwrap();
        assert_eq!(result["@context"], json!({ "@vocab": "http://schema.org/" }));
    }

    #[test]
    fn test_scalar_context_keeps_scalar() {
        let template = TemplateNode::mapping()
            .with("name", TemplateNode::mapping().with("x", TemplateNode::function(|this| json!(this.as_str()))));
        let result = run(&template, json!({ "name": "plain" })).unwrap();
        assert_eq!(result, json!({ "name": "plain" }));
    }

    #[test]
    fn test_literal_scalars_pass_through() {
        let template = TemplateNode::mapping().with("@type", "Person");
        let result = run(&template, json!({ "name": "x" })).unwrap();
        assert_eq!(result, json!({ "name": "x", "@type": "Person" }));
    }

    #[test]
    fn test_function_root_is_invalid() {
        let template = TemplateNode::function(|_| json!(1));
        assert!(matches!(run(&template, json!({})), Err(TemplateError::InvalidTemplate(_))));
    }

    #[test]
    fn test_sequence_branch_is_invalid() {
        let template = TemplateNode::mapping().with("list", TemplateNode::Sequence(vec![]));
        assert!(matches!(run(&template, json!({ "list": [] })), Err(TemplateError::InvalidTemplate(_))));
    }

    #[test]
    fn test_function_failure_names_key() {
        let template = TemplateNode::mapping().with("@id", TemplateNode::try_function(|_| Err("no name".into())));
        match run(&template, json!({})) {
            Err(TemplateError::Function { key, message }) => {
                assert_eq!(key, "@id");
                assert_eq!(message, "no name");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
