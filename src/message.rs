//! The message passed through the node.
//!
//! A message is an open mapping from field name to JSON value, owned by the
//! host and mutated in place as it moves through the flow. Field access is
//! path-capable: `"payload"`, `"detail.temperature"`, `"readings[2].value"`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    fields: Map<String, Value>,
}

enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parse `"a.b[0].c"` into segments. `None` for malformed paths.
fn parse_path(path: &str) -> Option<Vec<PathSegment>> {
    if path.is_empty() {
        return None;
    }
    let mut segments = Vec::new();
    for chunk in path.split('.') {
        let (key, mut rest) = match chunk.find('[') {
            Some(pos) => (&chunk[..pos], &chunk[pos..]),
            None => (chunk, ""),
        };
        if key.is_empty() {
            return None;
        }
        segments.push(PathSegment::Key(key.to_string()));
        while let Some(inner) = rest.strip_prefix('[') {
            let close = inner.find(']')?;
            let index: usize = inner[..close].parse().ok()?;
            segments.push(PathSegment::Index(index));
            rest = &inner[close + 1..];
        }
        if !rest.is_empty() {
            return None;
        }
    }
    Some(segments)
}

fn set_in(slot: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };
    match head {
        PathSegment::Key(key) => {
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(map) = slot {
                set_in(map.entry(key.clone()).or_insert(Value::Null), rest, value);
            }
        }
        PathSegment::Index(index) => {
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(items) = slot {
                while items.len() <= *index {
                    items.push(Value::Null);
                }
                set_in(&mut items[*index], rest, value);
            }
        }
    }
}

impl Message {
    pub fn new() -> Self {
        Message { fields: Map::new() }
    }

    /// Build a message from a JSON object. `None` for any other value kind.
    pub fn from_object(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Message { fields }),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Read the value at `path`. `None` when the path is malformed or the
    /// field is absent.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments = parse_path(path)?;
        let mut iter = segments.iter();
        let mut current = match iter.next()? {
            PathSegment::Key(key) => self.fields.get(key)?,
            PathSegment::Index(_) => return None,
        };
        for segment in iter {
            current = match segment {
                PathSegment::Key(key) => current.get(key.as_str())?,
                PathSegment::Index(index) => current.get(*index)?,
            };
        }
        Some(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Write `value` at `path`, creating missing intermediate objects and
    /// padding arrays as needed. A malformed path is a silent no-op.
    pub fn set(&mut self, path: &str, value: Value) {
        let Some(segments) = parse_path(path) else {
            return;
        };
        let PathSegment::Key(first) = &segments[0] else {
            return;
        };
        let slot = self.fields.entry(first.clone()).or_insert(Value::Null);
        set_in(slot, &segments[1..], value);
    }

    /// Remove and return the value at `path`, if present.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let segments = parse_path(path)?;
        let (last, parents) = segments.split_last()?;
        if parents.is_empty() {
            return match last {
                PathSegment::Key(key) => self.fields.remove(key),
                PathSegment::Index(_) => None,
            };
        }
        let PathSegment::Key(first) = &parents[0] else {
            return None;
        };
        let mut current = self.fields.get_mut(first)?;
        for segment in &parents[1..] {
            current = match segment {
                PathSegment::Key(key) => current.get_mut(key.as_str())?,
                PathSegment::Index(index) => current.get_mut(*index)?,
            };
        }
        match last {
            PathSegment::Key(key) => current.as_object_mut()?.remove(key),
            PathSegment::Index(index) => {
                let items = current.as_array_mut()?;
                if *index < items.len() {
                    Some(items.remove(*index))
                } else {
                    None
                }
            }
        }
    }
}

impl From<Map<String, Value>> for Message {
    fn from(fields: Map<String, Value>) -> Self {
        Message { fields }
    }
}
