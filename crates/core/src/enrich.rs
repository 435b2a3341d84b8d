//! Builds an [`EnrichedTree`] from a data tree.

use crate::error::TemplateError;
use crate::tree::{Body, EnrichedTree, NodeId, RelationNames, Slot};
use crate::value::{NodeKind, TreeValue};
use indexmap::IndexMap;

/// Copies `data` into a fresh arena, attaching a parent relation to every
/// container and an index relation to every container that sits in a
/// sequence. The input is only read; the returned tree is the working copy.
pub fn enrich_with_parents<T: TreeValue>(data: &T, relations: RelationNames) -> Result<EnrichedTree, TemplateError> {
    relations.validate()?;
    let mut tree = EnrichedTree::empty(relations);
    let root = enrich(&mut tree, data, None, None)?;
    tree.set_root(root);
    log::trace!("enriched data tree with {} containers", tree.len());
    Ok(tree)
}

/// Enriches one position. Children are visited before the node's own
/// relations are attached.
pub(crate) fn enrich<T: TreeValue>(
    tree: &mut EnrichedTree,
    node: &T,
    parent: Option<NodeId>,
    index: Option<usize>,
) -> Result<Slot, TemplateError> {
    match node.kind() {
        NodeKind::Function(_) => Err(TemplateError::UnsupportedValue(
            "functions are not expected in data".to_string(),
        )),
        NodeKind::Scalar(value) => Ok(Slot::Value(value)),
        NodeKind::Sequence(items) => {
            let id = tree.alloc(Body::Sequence(Vec::with_capacity(items.len())));
            for (i, item) in items.iter().enumerate() {
                let slot = enrich(tree, item, Some(id), Some(i))?;
                if let Body::Sequence(slots) = tree.body_mut(id) {
                    slots.push(slot);
                }
            }
            tree.attach(id, parent, index);
            Ok(Slot::Node(id))
        }
        NodeKind::Mapping(entries) => {
            let id = tree.alloc(Body::Mapping(IndexMap::with_capacity(entries.len())));
            for (key, value) in entries {
                let slot = enrich(tree, value, Some(id), None)?;
                if let Body::Mapping(slots) = tree.body_mut(id) {
                    slots.insert(key.to_string(), slot);
                }
            }
            tree.attach(id, parent, index);
            Ok(Slot::Node(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateNode;
    use serde_json::json;

    #[test]
    fn test_every_container_points_at_its_holder() {
        let data = json!({ "a": { "b": [ { "c": 1 }, [2] ] } });
        let tree = enrich_with_parents(&data, RelationNames::default()).unwrap();
        let root = tree.root();
        let a = root.own("a").unwrap();
        let b = a.own("b").unwrap();
        let first = b.at(0).unwrap();
        let nested = b.at(1).unwrap();

        assert_eq!(a.parent().unwrap().id(), root.id());
        assert_eq!(b.parent().unwrap().id(), a.id());
        assert_eq!(first.parent().unwrap().id(), b.id());
        assert_eq!(nested.parent().unwrap().id(), b.id());
        assert_eq!(first.index(), Some(0));
        assert_eq!(nested.index(), Some(1));
        assert_eq!(a.index(), None);
    }

    #[test]
    fn test_content_is_unchanged() {
        let data = json!({ "name": "x", "list": [1, "two", null, { "k": false }] });
        let tree = enrich_with_parents(&data, RelationNames::default()).unwrap();
        assert_eq!(tree.to_plain(), data);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_scalar_root() {
        let tree = enrich_with_parents(&json!("just text"), RelationNames::default()).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root().as_str(), Some("just text"));
    }

    #[test]
    fn test_colliding_relation_names_are_rejected() {
        let err = enrich_with_parents(&json!({}), RelationNames::new("$x", "$x")).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidRelations(_)));
    }

    #[test]
    fn test_functions_in_data_are_rejected() {
        let data = TemplateNode::mapping().with("f", TemplateNode::function(|_| json!(1)));
        let err = enrich_with_parents(&data, RelationNames::default()).unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedValue(_)));
    }
}
