//! Response-schema description and its normalisation for constrained decoding.
//!
//! The layout reply shape is described once, by hand, as a [`SchemaNode`]
//! tree. Two renderings are derived from it:
//!
//! * [`normalize`]: the Gemini `responseSchema` dialect (an OpenAPI subset
//!   with upper-case type names) used as the decoding constraint.
//! * [`to_json_schema`]: plain JSON Schema, embedded verbatim in the
//!   instruction text so providers without constrained decoding still see
//!   the expected format.
//!
//! ```text
//! Object ──▶ {"type":"OBJECT","properties":{…},"required":[…],"propertyOrdering":[…]}
//! List   ──▶ {"type":"ARRAY","items":…,"maxItems":n}
//! Enum   ──▶ {"type":"STRING","format":"enum","enum":[…]}
//! ```

use crate::output::ElementType;
use serde_json::{json, Map, Value};

/// A node in a declarative result schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Integer,
    Number,
    Boolean,
    /// A string restricted to the listed values.
    Enum(Vec<String>),
    List {
        items: Box<SchemaNode>,
        max_items: Option<usize>,
    },
    Object(Vec<Field>),
}

/// A named property of an [`SchemaNode::Object`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub node: SchemaNode,
    pub description: Option<String>,
    pub required: bool,
    /// Value assumed when the field is absent. Implies `required == false`.
    pub default: Option<Value>,
}

impl Field {
    pub fn required(name: impl Into<String>, node: SchemaNode) -> Self {
        Self {
            name: name.into(),
            node,
            description: None,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, node: SchemaNode) -> Self {
        Self {
            required: false,
            ..Self::required(name, node)
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.required = false;
        self.default = Some(value);
        self
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl SchemaNode {
    pub fn list_of(items: SchemaNode) -> Self {
        SchemaNode::List {
            items: Box::new(items),
            max_items: None,
        }
    }

    pub fn enum_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaNode::Enum(values.into_iter().map(Into::into).collect())
    }
}

/// Hand-maintained description of the layout reply:
/// `{"layout_items": [{"element_type": <enum>, "summary": <string>}, …]}`.
pub fn layout_elements_schema(max_items: usize) -> SchemaNode {
    let item = SchemaNode::Object(vec![
        Field::required(
            "element_type",
            SchemaNode::enum_of(ElementType::ALL.iter().map(|t| t.as_str())),
        )
        .describe(format!(
            "Type of detected Item. Find Tables, figures and images. Use {} for \
             everything else, be as exhaustive as possible. Return {max_items} Items at most.",
            ElementType::TextBlock.as_str()
        )),
        Field::required("summary", SchemaNode::String)
            .describe("A detailed description of the layout Item."),
    ]);

    SchemaNode::Object(vec![Field::required(
        "layout_items",
        SchemaNode::List {
            items: Box::new(item),
            max_items: Some(max_items),
        },
    )])
}

/// Convert a schema description into the model's constrained-output dialect.
pub fn normalize(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::String => json!({ "type": "STRING" }),
        SchemaNode::Integer => json!({ "type": "INTEGER" }),
        SchemaNode::Number => json!({ "type": "NUMBER" }),
        SchemaNode::Boolean => json!({ "type": "BOOLEAN" }),
        SchemaNode::Enum(values) => json!({
            "type": "STRING",
            "format": "enum",
            "enum": values,
        }),
        SchemaNode::List { items, max_items } => {
            let mut out = json!({ "type": "ARRAY", "items": normalize(items) });
            if let Some(n) = max_items {
                out["maxItems"] = json!(n);
            }
            out
        }
        SchemaNode::Object(fields) => {
            let mut properties = Map::new();
            for field in fields {
                let mut prop = normalize(&field.node);
                if let Some(ref d) = field.description {
                    prop["description"] = json!(d);
                }
                properties.insert(field.name.clone(), prop);
            }
            let mut out = json!({
                "type": "OBJECT",
                "properties": properties,
                "propertyOrdering": fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            });
            let required = required_names(fields);
            if !required.is_empty() {
                out["required"] = json!(required);
            }
            out
        }
    }
}

/// Render a schema description as standard JSON Schema.
pub fn to_json_schema(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::String => json!({ "type": "string" }),
        SchemaNode::Integer => json!({ "type": "integer" }),
        SchemaNode::Number => json!({ "type": "number" }),
        SchemaNode::Boolean => json!({ "type": "boolean" }),
        SchemaNode::Enum(values) => json!({ "type": "string", "enum": values }),
        SchemaNode::List { items, max_items } => {
            let mut out = json!({ "type": "array", "items": to_json_schema(items) });
            if let Some(n) = max_items {
                out["maxItems"] = json!(n);
            }
            out
        }
        SchemaNode::Object(fields) => {
            let mut properties = Map::new();
            for field in fields {
                let mut prop = to_json_schema(&field.node);
                if let Some(ref d) = field.description {
                    prop["description"] = json!(d);
                }
                if let Some(ref default) = field.default {
                    prop["default"] = default.clone();
                }
                properties.insert(field.name.clone(), prop);
            }
            let mut out = json!({ "type": "object", "properties": properties });
            let required = required_names(fields);
            if !required.is_empty() {
                out["required"] = json!(required);
            }
            out
        }
    }
}

fn required_names(fields: &[Field]) -> Vec<&str> {
    fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect()
}
