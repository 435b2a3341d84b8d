//! The on-disk shape of a JSON template document.
use ldtemplate_core::RelationNames;
use serde::Deserialize;
use serde_json::Value;

/// A template document.
///
/// ```json
/// {
///   "_template": { "@id": "urn:{{ name }}" },
///   "_schema": { "@context": { "@vocab": "http://schema.org/" } },
///   "_relations": { "parent": "$parent", "index": "$index" }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct JsonTemplateFile {
    /// The template tree. Strings containing `{{ ... }}` become functions.
    #[serde(rename = "_template")]
    pub template: Value,
    /// A static document merged over every generated result.
    #[serde(rename = "_schema", default)]
    pub schema: Option<Value>,
    #[serde(rename = "_relations", default)]
    pub relations: Option<RelationsConfig>,
}

impl JsonTemplateFile {
    /// Reads a document. A JSON value without a `_template` key is taken
    /// to be a bare template tree.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.get("_template").is_some() {
            serde_json::from_value(value)
        } else {
            Ok(Self { template: value, schema: None, relations: None })
        }
    }
}

/// Relation key names as written in a template document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelationsConfig {
    pub parent: String,
    pub index: String,
}

impl Default for RelationsConfig {
    fn default() -> Self {
        let names = RelationNames::default();
        Self { parent: names.parent, index: names.index }
    }
}

impl From<RelationsConfig> for RelationNames {
    fn from(config: RelationsConfig) -> Self {
        RelationNames::new(config.parent, config.index)
    }
}
