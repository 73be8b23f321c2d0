//! Storage Data Types
//!
//! Documents as stored on a shard, and the request/response shapes of the
//! document write path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A JSON document identified by (index, type, id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub index: String,
    pub doc_type: String,
    pub id: String,
    pub source: Value,
}

impl Document {
    pub fn new(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
        source: Value,
    ) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
            source,
        }
    }

    /// Every leaf value of the source as text, keyed by dotted field path.
    ///
    /// Nested objects flatten to `outer.inner`; array elements share their
    /// field's path. `null` leaves are skipped.
    pub fn text_fields(&self) -> BTreeMap<String, Vec<String>> {
        let mut fields = BTreeMap::new();
        flatten_into("", &self.source, &mut fields);
        fields
    }

    /// The fields returned with a hit: the requested flattened fields, or the
    /// whole top-level source object when none were requested.
    pub fn select_fields(&self, fields: Option<&[String]>) -> Map<String, Value> {
        match fields {
            None => match &self.source {
                Value::Object(map) => map.clone(),
                other => {
                    let mut map = Map::new();
                    map.insert("_source".to_string(), other.clone());
                    map
                }
            },
            Some(wanted) => {
                let flattened = self.text_fields();
                wanted
                    .iter()
                    .filter_map(|field| {
                        flattened.get(field).map(|values| {
                            let value = if values.len() == 1 {
                                Value::String(values[0].clone())
                            } else {
                                Value::Array(values.iter().cloned().map(Value::String).collect())
                            };
                            (field.clone(), value)
                        })
                    })
                    .collect()
            }
        }
    }
}

fn flatten_into(path: &str, value: &Value, out: &mut BTreeMap<String, Vec<String>>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten_into(&child_path, child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(path, item, out);
            }
        }
        Value::String(text) => out.entry(path.to_string()).or_default().push(text.clone()),
        Value::Bool(_) | Value::Number(_) => out
            .entry(path.to_string())
            .or_default()
            .push(value.to_string()),
    }
}

/// A document together with its write version on the shard.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub document: Document,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRequest {
    pub index: String,
    pub doc_type: String,
    /// Generated when absent.
    pub id: Option<String>,
    pub source: Value,
}

impl IndexRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: "_doc".to_string(),
            id: None,
            source: Value::Object(Map::new()),
        }
    }

    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn source(mut self, source: Value) -> Self {
        self.source = source;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub index: String,
    pub doc_type: String,
    pub id: String,
    pub version: u64,
    /// False when an existing document was replaced.
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    pub index: String,
    pub doc_type: String,
    pub id: String,
}

impl GetRequest {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub index: String,
    pub doc_type: String,
    pub id: String,
    pub found: bool,
    pub version: Option<u64>,
    pub source: Option<Value>,
}

pub type DeleteRequest = GetRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub index: String,
    pub doc_type: String,
    pub id: String,
    pub found: bool,
}
