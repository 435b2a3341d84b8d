// Loads JSON template documents and runs them against data.
use crate::ast::JsonTemplateFile;
use crate::compiler::Compiler;
use crate::error::JsonTemplateError;
use ldtemplate_core::{CompiledTemplate, Indent, RelationNames, censor_key, censor_value, deep_extend, stringify_value};
use ldtemplate_jpath::FunctionRegistry;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// JSON template parser
pub struct JsonParser {
    functions: Arc<FunctionRegistry>,
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonParser {
    /// A parser whose expressions can call the built-in functions.
    pub fn new() -> Self {
        Self::with_functions(FunctionRegistry::default())
    }

    pub fn with_functions(functions: FunctionRegistry) -> Self {
        Self { functions: Arc::new(functions) }
    }

    pub fn parse(&self, template_source: &str) -> Result<CompiledJsonTemplate, JsonTemplateError> {
        let document: Value = serde_json::from_str(template_source)?;
        self.parse_value(document)
    }

    pub fn parse_value(&self, document: Value) -> Result<CompiledJsonTemplate, JsonTemplateError> {
        let file = JsonTemplateFile::from_value(document)?;
        if !file.template.is_object() {
            return Err(JsonTemplateError::Compilation(
                "_template must be a JSON object".to_string(),
            ));
        }

        let relations: RelationNames = file.relations.map(Into::into).unwrap_or_default();
        relations.validate()?;

        let compiler = Compiler::new(Arc::clone(&self.functions));
        let template = compiler.compile(&file.template)?;
        template.validate()?;

        log::debug!(
            "compiled JSON template (relations '{}'/'{}', schema: {})",
            relations.parent,
            relations.index,
            file.schema.is_some()
        );

        Ok(CompiledJsonTemplate {
            template: CompiledTemplate::new(template, relations)?,
            schema: file.schema,
        })
    }

    pub fn parse_file(&self, path: &Path) -> Result<CompiledJsonTemplate, JsonTemplateError> {
        let source = fs::read_to_string(path)
            .map_err(|e| JsonTemplateError::Compilation(format!("cannot read '{}': {}", path.display(), e)))?;
        self.parse(&source)
    }
}

/// Compiled JSON template
#[derive(Debug, Clone)]
pub struct CompiledJsonTemplate {
    template: CompiledTemplate,
    schema: Option<Value>,
}

impl CompiledJsonTemplate {
    /// Applies the template and overlays the schema, if any.
    pub fn execute(&self, data: &Value) -> Result<Value, JsonTemplateError> {
        let result = self.template.apply(data)?;
        match &self.schema {
            Some(schema) => Ok(deep_extend(result, &censor_value(schema))?),
            None => Ok(result),
        }
    }

    pub fn execute_str(&self, data_source: &str) -> Result<Value, JsonTemplateError> {
        let data: Value = serde_json::from_str(data_source)?;
        self.execute(&data)
    }

    /// Executes and serializes the result without bookkeeping keys.
    pub fn render(&self, data: &Value, indent: &Indent) -> Result<String, JsonTemplateError> {
        let result = self.execute(data)?;
        Ok(stringify_value(&result, Some(&censor_key), indent)?)
    }

    /// Replaces the relation names the document declared.
    pub fn with_relations(mut self, relations: RelationNames) -> Result<Self, JsonTemplateError> {
        self.template = self.template.with_relations(relations)?;
        Ok(self)
    }

    pub fn relations(&self) -> &RelationNames {
        self.template.relations()
    }

    pub fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    pub fn template(&self) -> &CompiledTemplate {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldtemplate_core::TemplateError;
    use serde_json::json;

    #[test]
    fn test_document_with_schema_and_relations() {
        let source = r#"{
            "_template": { "items": { "@id": "urn:{{ up.name }}/{{ pos }}" } },
            "_schema": { "@context": { "@vocab": "http://schema.org/" } },
            "_relations": { "parent": "up", "index": "pos" }
        }"#;
        let compiled = JsonParser::new().parse(source).unwrap();
        assert_eq!(compiled.relations().parent, "up");

        let result = compiled.execute(&json!({ "name": "r", "items": [{}, {}] })).unwrap();
        assert_eq!(result["items"][1]["@id"], json!("urn:r/1"));
        assert_eq!(result["@context"]["@vocab"], json!("http://schema.org/"));
    }

    #[test]
    fn test_colliding_relations_are_rejected() {
        let source = r#"{
            "_template": { "items": { "i": "{{ $x }}" } },
            "_relations": { "parent": "$x", "index": "$x" }
        }"#;
        let err = JsonParser::new().parse(source).err().unwrap();
        assert!(matches!(err, JsonTemplateError::Template(TemplateError::InvalidRelations(_))));

        let compiled = JsonParser::new().parse(r#"{ "items": {} }"#).unwrap();
        assert!(compiled.with_relations(RelationNames::new("$x", "$x")).is_err());
    }

    #[test]
    fn test_bare_template_document() {
        let compiled = JsonParser::new().parse(r#"{ "@type": "Person" }"#).unwrap();
        assert!(compiled.schema().is_none());
        assert_eq!(compiled.execute(&json!({ "name": "x" })).unwrap(), json!({ "@type": "Person", "name": "x" }));
    }

    #[test]
    fn test_render_is_censored_and_indented() {
        let compiled = JsonParser::new().parse(r#"{ "_template": { "$tmp": "{{ name }}" } }"#).unwrap();
        let text = compiled.render(&json!({ "name": "x" }), &Indent::Spaces(1)).unwrap();
        assert_eq!(text, "{\n \"name\": \"x\"\n}");
    }

    #[test]
    fn test_non_object_template_is_rejected() {
        let err = JsonParser::new().parse(r#"{ "_template": "{{ name }}" }"#).err().unwrap();
        assert!(matches!(err, JsonTemplateError::Compilation(_)));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(JsonParser::new().parse("{"), Err(JsonTemplateError::JsonParse(_))));
    }

    #[test]
    fn test_custom_function_registry() {
        fn shout(
            _: &ldtemplate_jpath::EvaluationContext,
            args: Vec<Value>,
        ) -> Result<Value, ldtemplate_jpath::JPathError> {
            Ok(json!(format!("{}!", args.first().and_then(Value::as_str).unwrap_or_default())))
        }
        let mut functions = FunctionRegistry::default();
        functions.register("shout", shout);
        let compiled = JsonParser::with_functions(functions)
            .parse(r#"{ "greeting": "{{ shout(name) }}" }"#)
            .unwrap();
        assert_eq!(compiled.execute(&json!({ "name": "hi" })).unwrap()["greeting"], json!("hi!"));
    }
}
