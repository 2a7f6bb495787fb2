// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! Schema-less document tree used to compare manifests against live objects.
//!
//! A [`Document`] is built from any JSON/YAML-shaped value. Map keys are kept
//! in a `BTreeMap` so iteration order is stable regardless of the order the
//! source emitted them in.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Number, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub enum Document {
    Map(BTreeMap<String, Document>),
    Sequence(Vec<Document>),
    Scalar(Scalar),
}

#[derive(Clone, Debug)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// The kind of a document node, used when reporting mismatches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Map,
    Sequence,
    Scalar,
}

impl Document {
    /// Build a Document from anything that serializes to JSON, such as a typed
    /// Kubernetes object or a `DynamicObject`
    pub fn from_serializable<T>(object: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize,
    {
        serde_json::to_value(object).map(Document::from)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Document::Map(_) => NodeKind::Map,
            Document::Sequence(_) => NodeKind::Sequence,
            Document::Scalar(_) => NodeKind::Scalar,
        }
    }

    /// Look up a key if this node is a map
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Scalar(Scalar::Null))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::String(a), Scalar::String(b)) => a == b,
            (Scalar::Number(a), Scalar::Number(b)) => numbers_equal(a, b),
            _ => false,
        }
    }
}

/// Integers compare exactly; anything involving a float compares by value so
/// `80` and `80.0` are the same number
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Document::Map(map.into_iter().map(|(k, v)| (k, Document::from(v))).collect()),
            Value::Array(items) => Document::Sequence(items.into_iter().map(Document::from).collect()),
            Value::Null => Document::Scalar(Scalar::Null),
            Value::Bool(b) => Document::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Document::Scalar(Scalar::Number(n)),
            Value::String(s) => Document::Scalar(Scalar::String(s)),
        }
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        match document {
            Document::Map(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect::<JsonMap<_, _>>()),
            Document::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Document::Scalar(Scalar::Null) => Value::Null,
            Document::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            Document::Scalar(Scalar::Number(n)) => Value::Number(n),
            Document::Scalar(Scalar::String(s)) => Value::String(s),
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Document::from)
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Value::from(self.clone()).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_tree_from_json() {
        let doc = Document::from(json!({
            "spec": {
                "ports": [{"port": 80}],
                "clusterIP": null,
            }
        }));

        let spec = doc.get("spec").unwrap();
        assert_eq!(spec.kind(), NodeKind::Map);
        assert_eq!(spec.get("ports").unwrap().kind(), NodeKind::Sequence);
        assert!(spec.get("clusterIP").unwrap().is_null());
        assert!(spec.get("missing").is_none());
    }

    #[test]
    fn integer_and_float_of_same_value_are_equal() {
        let int = Document::from(json!(80));
        let float = Document::from(json!(80.0));
        assert_eq!(int, float);
        assert_ne!(Document::from(json!(80)), Document::from(json!(80.5)));
    }

    #[test]
    fn unsigned_and_signed_integers_compare_by_value() {
        let signed = Document::Scalar(Scalar::Number(Number::from(443i64)));
        let unsigned = Document::Scalar(Scalar::Number(Number::from(443u64)));
        assert_eq!(signed, unsigned);
    }

    #[test]
    fn scalars_of_different_types_differ() {
        assert_ne!(Document::from(json!("80")), Document::from(json!(80)));
        assert_ne!(Document::from(json!(false)), Document::from(json!(null)));
        assert_ne!(Document::from(json!("IPv4")), Document::from(json!("ipv4")));
    }

    #[test]
    fn map_key_order_is_irrelevant() {
        let a: Document = serde_json::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        let b: Document = serde_json::from_str(r#"{"b": 2, "a": 1}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn reads_yaml_manifests() {
        let doc: Document = serde_norway::from_str(r#"
spec:
  ipFamilies:
    - IPv4
  ports:
    - name: tcp-80-80
      port: 80
"#).unwrap();

        assert_eq!(
            doc,
            Document::from(json!({
                "spec": {
                    "ipFamilies": ["IPv4"],
                    "ports": [{"name": "tcp-80-80", "port": 80}],
                }
            }))
        );
    }

    #[test]
    fn converts_back_to_json() {
        let value = json!({"spec": {"ports": [80, 443], "enabled": true}});
        let doc = Document::from(value.clone());
        assert_eq!(Value::from(doc.clone()), value);
        assert_eq!(serde_json::to_value(&doc).unwrap(), value);
    }
}
