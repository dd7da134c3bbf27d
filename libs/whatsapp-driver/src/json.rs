//! Lenient access helpers over untyped webhook and payload trees.
//!
//! Webhook bodies are only loosely specified, so every lookup here resolves a
//! missing key, a wrong index or a type mismatch to `Null` instead of failing.
//! Callers choose the default per field through [`Node::text_or_empty`] and
//! friends.

use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// Borrowed cursor into a JSON tree.
#[derive(Clone, Copy, Debug)]
pub struct Node<'a>(&'a Value);

impl<'a> Node<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    /// Object member lookup; anything but an object yields `Null`.
    pub fn get(self, key: &str) -> Node<'a> {
        Node(self.0.get(key).unwrap_or(&NULL))
    }

    /// Array element lookup; anything but an array yields `Null`.
    pub fn at(self, index: usize) -> Node<'a> {
        Node(self.0.get(index).unwrap_or(&NULL))
    }

    pub fn path(self, keys: &[&str]) -> Node<'a> {
        keys.iter().fold(self, |node, key| node.get(key))
    }

    pub fn value(self) -> &'a Value {
        self.0
    }

    pub fn is_present(self) -> bool {
        !self.0.is_null()
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.0.as_str()
    }

    /// First element of a non-empty array.
    pub fn first(self) -> Option<Node<'a>> {
        self.0
            .as_array()
            .and_then(|items| items.first())
            .map(Node)
    }

    /// Scalar rendered as text. Numbers and booleans are stringified because
    /// the provider is not consistent about quoting identifiers.
    pub fn text(self) -> Option<String> {
        match self.0 {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text_or_empty(self) -> String {
        self.text().unwrap_or_default()
    }
}

/// Merges `extra` into `base`.
///
/// Keys present on both sides are resolved per value kind: two arrays are
/// concatenated (base first), two objects are merged recursively, anything else
/// is overwritten by `extra`.
pub fn merge_recursive(base: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (key, incoming) in extra {
        match (base.get_mut(key), incoming) {
            (Some(Value::Array(existing)), Value::Array(items)) => {
                existing.extend(items.iter().cloned());
            }
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                merge_recursive(existing, nested);
            }
            _ => {
                base.insert(key.clone(), incoming.clone());
            }
        }
    }
}
