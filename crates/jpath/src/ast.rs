//! Parsed JPath expressions.
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `'text'`, `42`, `true`, `null`.
    Literal(Value),
    /// `name`, `$parent.@id`, `items[0]`, `['schema:name']`, `this`.
    Path(Path),
    /// `concat('urn:', name)`.
    Call { function: String, args: Vec<Expression> },
}

/// A walk from the scope, one step at a time.
///
/// A path without steps selects the scope itself (`.` or `this`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub steps: Vec<Step>,
}

impl Path {
    pub fn current() -> Self {
        Self::default()
    }

    pub fn is_current(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A mapping key. Relation names such as `$parent` and `$index` are
    /// keys too; the scope decides what they resolve to.
    Key(String),
    Index(usize),
}
