//! Lets JPath expressions read enriched data nodes.
use ldtemplate_core::NodeRef;
use ldtemplate_jpath::{Scope, Step};
use serde_json::Value;

/// Adapts a [`NodeRef`] to the JPath [`Scope`] contract. Keys resolve with
/// ancestor fallback, and relation names (`$parent`, `$index`) are ordinary
/// path segments.
pub struct NodeScope<'n, 't>(pub &'n NodeRef<'t>);

impl Scope for NodeScope<'_, '_> {
    fn select(&self, steps: &[Step]) -> Option<Value> {
        let mut current = self.0.clone();
        for step in steps {
            current = match step {
                Step::Key(key) => current.get(key)?,
                Step::Index(i) => current.at(*i)?,
            };
        }
        Some(current.to_value())
    }

    fn current(&self) -> Value {
        self.0.to_value()
    }

    fn position(&self) -> Option<usize> {
        self.0.index()
    }
}
