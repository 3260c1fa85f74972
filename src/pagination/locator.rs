//! Array location inside an arbitrary JSON response.
//!
//! # Search Order
//! 1. The root itself is an array.
//! 2. A field named in `PREFERRED_KEYS` holds an array (or a JSON string encoding one).
//! 3. Any other field of the root object does, in insertion order.
//! 4. The same search runs inside nested objects, up to `MAX_NESTING_DEPTH` levels down.
//!
//! The result records the object keys leading to the array, so the caller can
//! put a replacement back in place without touching the original value.

use serde_json::{Map, Value};

/// Container field names checked before any other key, in order.
pub const PREFERRED_KEYS: [&str; 8] = [
    "data", "items", "records", "rows", "result", "results", "payload", "entries",
];

/// How many object levels below the root the search descends.
pub const MAX_NESTING_DEPTH: usize = 1;

/// How the located array is stored in its parent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// A plain JSON array.
    Native,
    /// A JSON string whose contents parse to an array.
    JsonString,
}

/// An array selected for pagination and the location it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayTarget {
    /// The array items.
    pub data: Vec<Value>,
    /// Object keys from the root down to the field holding the array.
    /// Empty when the root itself is the array.
    pub path: Vec<String>,
    /// Storage form of the array in its field.
    pub encoding: Encoding,
}

impl ArrayTarget {
    fn root(items: &[Value]) -> Self {
        Self {
            data: items.to_vec(),
            path: Vec::new(),
            encoding: Encoding::Native,
        }
    }

    fn field(key: &str, data: Vec<Value>, encoding: Encoding) -> Self {
        Self {
            data,
            path: vec![key.to_string()],
            encoding,
        }
    }

    /// True if the array is the entire response.
    pub fn root_is_array(&self) -> bool {
        self.path.is_empty()
    }

    /// Return a copy of `root` with the located array replaced by `replacement`.
    ///
    /// String-encoded arrays are re-serialized into a string under the same key.
    /// If `root` no longer has the shape the target was located in, it is
    /// returned unchanged.
    pub fn rebuild(&self, root: &Value, replacement: Vec<Value>) -> Value {
        let Some((last, parents)) = self.path.split_last() else {
            return Value::Array(replacement);
        };

        let new_value = match self.encoding {
            Encoding::Native => Value::Array(replacement),
            Encoding::JsonString => {
                let encoded = Value::Array(replacement).to_string();
                Value::String(encoded)
            }
        };

        let mut rebuilt = root.clone();
        let mut cursor = &mut rebuilt;
        for key in parents {
            match cursor.get_mut(key.as_str()) {
                Some(next) => cursor = next,
                None => return root.clone(),
            }
        }

        match cursor.as_object_mut() {
            Some(object) if object.contains_key(last.as_str()) => {
                object.insert(last.clone(), new_value);
                rebuilt
            }
            _ => root.clone(),
        }
    }
}

/// Find the most plausible array to paginate in `root`.
pub fn locate(root: &Value) -> Option<ArrayTarget> {
    locate_at_depth(root, 0)
}

fn locate_at_depth(value: &Value, depth: usize) -> Option<ArrayTarget> {
    let object = match value {
        Value::Array(items) => return Some(ArrayTarget::root(items)),
        Value::Object(object) => object,
        _ => return None,
    };

    let preferred = PREFERRED_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(|value| field_target(key, value)));
    if preferred.is_some() {
        return preferred;
    }

    let any_field = object.iter().find_map(|(key, value)| field_target(key, value));
    if any_field.is_some() {
        return any_field;
    }

    if depth >= MAX_NESTING_DEPTH {
        return None;
    }
    locate_nested(object, depth)
}

fn locate_nested(object: &Map<String, Value>, depth: usize) -> Option<ArrayTarget> {
    object
        .iter()
        .filter(|(_, value)| value.is_object() || value.is_array())
        .find_map(|(key, value)| {
            let mut target = locate_at_depth(value, depth + 1)?;
            target.path.insert(0, key.clone());
            Some(target)
        })
}

/// Test a single field: a native array, or a string holding a JSON array.
fn field_target(key: &str, value: &Value) -> Option<ArrayTarget> {
    match value {
        Value::Array(items) => Some(ArrayTarget::field(key, items.clone(), Encoding::Native)),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => Some(ArrayTarget::field(key, items, Encoding::JsonString)),
            _ => None,
        },
        _ => None,
    }
}
