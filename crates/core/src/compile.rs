//! Compiling a template into a reusable transformation.

use crate::enrich::enrich_with_parents;
use crate::error::TemplateError;
use crate::eval::eval_functions;
use crate::merge::deep_extend;
use crate::serialize::{censor_key, censor_value};
use crate::template::TemplateNode;
use crate::tree::RelationNames;
use serde_json::Value;
use std::sync::Arc;

/// A template ready to be applied to any number of data trees.
///
/// Applying never mutates the input and shares no mutable state between
/// calls, so one compiled template can serve several threads at once.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: Arc<TemplateNode>,
    relations: RelationNames,
}

/// Compiles `template` with the default relation names (`$parent`, `$index`).
pub fn compile(template: TemplateNode) -> CompiledTemplate {
    CompiledTemplate { template: Arc::new(template), relations: RelationNames::default() }
}

impl CompiledTemplate {
    /// Fails if `relations` are unusable (see [`RelationNames::validate`]).
    pub fn new(template: TemplateNode, relations: RelationNames) -> Result<Self, TemplateError> {
        relations.validate()?;
        Ok(Self { template: Arc::new(template), relations })
    }

    pub fn with_relations(mut self, relations: RelationNames) -> Result<Self, TemplateError> {
        relations.validate()?;
        self.relations = relations;
        Ok(self)
    }

    pub fn template(&self) -> &TemplateNode {
        &self.template
    }

    pub fn relations(&self) -> &RelationNames {
        &self.relations
    }

    /// Evaluates the template against a private enriched copy of `data`,
    /// strips bookkeeping, and merges `data` back over the result so that
    /// original fields win and only genuinely new keys come from the template.
    pub fn apply(&self, data: &Value) -> Result<Value, TemplateError> {
        let enriched = enrich_with_parents(data, self.relations.clone())?;
        log::debug!("evaluating template against {} enriched containers", enriched.len());

        let raw_context = eval_functions(&self.template, enriched)?;
        let clean_context = raw_context.to_value(Some(&censor_key))?;

        deep_extend(clean_context, &censor_value(data))
    }

    /// The compiled template as a plain closure.
    pub fn into_fn(self) -> impl Fn(&Value) -> Result<Value, TemplateError> + Send + Sync {
        move |data| self.apply(data)
    }
}
