use ldtemplate::TemplateNode;
use serde_json::{Value, json};

/// An organisation with nested members and addresses.
pub fn organisation() -> Value {
    json!({
        "name": "acme",
        "founded": 1999,
        "members": [
            { "name": "ada", "roles": ["admin"], "address": { "city": "london" } },
            { "name": "bob", "roles": [], "address": { "city": "oslo" } }
        ],
        "tags": ["tools", "widgets"]
    })
}

/// A template document for [`organisation`].
pub fn organisation_document() -> Value {
    json!({
        "_template": {
            "@id": "urn:org:{{ name }}",
            "@type": "Organization",
            "members": {
                "@id": "urn:org:{{ $parent.name }}/member/{{ $index }}",
                "@type": "Person",
                "address": {
                    "@id": "{{ $parent.@id }}/address",
                    "@type": "PostalAddress"
                }
            }
        },
        "_schema": {
            "@context": { "@vocab": "http://schema.org/" }
        }
    })
}

/// `{"@id": "urn:" + this.name}` as a code template.
pub fn id_from_name() -> TemplateNode {
    TemplateNode::mapping().with(
        "@id",
        TemplateNode::function(|this| {
            json!(format!("urn:{}", this.get("name").map(|n| n.to_string()).unwrap_or_default()))
        }),
    )
}

/// `{"@id": "urn:" + this.$parent.name + "/" + this.name}` as a code template.
pub fn id_from_parent_and_name() -> TemplateNode {
    TemplateNode::mapping().with(
        "@id",
        TemplateNode::function(|this| {
            let parent = this.path("$parent.name").map(|n| n.to_string()).unwrap_or_default();
            let name = this.get("name").map(|n| n.to_string()).unwrap_or_default();
            json!(format!("urn:{parent}/{name}"))
        }),
    )
}
