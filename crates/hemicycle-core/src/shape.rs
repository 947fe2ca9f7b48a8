//! Tolerant accessors over loosely-shaped open-data JSON.
//!
//! Upstream documents serialise a one-element list as the bare element, drop
//! empty containers, and spell some keys differently from one legislative term
//! to the next. Every such site goes through [`Shape`] and [`field`] instead of
//! branching on the JSON type locally.

use serde_json::Value;

/// A JSON slot that may hold nothing, one item, or a list of items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Absent,
    One(&'a Value),
    Many(&'a [Value]),
}

impl<'a> Shape<'a> {
    /// Classify a slot. `null` counts as absent.
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Shape::Absent,
            Some(Value::Array(items)) => Shape::Many(items),
            Some(other) => Shape::One(other),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Shape::Absent)
    }

    /// Normalise to a list. `Many` keeps its order; `null` items are dropped.
    pub fn into_list(self) -> Vec<&'a Value> {
        match self {
            Shape::Absent => Vec::new(),
            Shape::One(item) => vec![item],
            Shape::Many(items) => items.iter().filter(|v| !v.is_null()).collect(),
        }
    }

    /// Only the mapping-shaped items of the slot.
    pub fn objects(self) -> Vec<&'a Value> {
        self.into_list().into_iter().filter(|v| v.is_object()).collect()
    }
}

/// First non-null value found under any of `keys`, tried in order.
///
/// Returns `None` when `value` is not a mapping.
pub fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = value.as_object()?;
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

/// Descend through nested mappings. Every intermediate level must be a
/// mapping, otherwise the walk stops with `None`.
pub fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |node, key| {
        node.as_object()?.get(*key).filter(|v| !v.is_null())
    })
}

/// Like [`path`], but the target itself must also be a mapping.
pub fn object_at<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    path(value, keys).filter(|v| v.is_object())
}

/// Non-empty text. Numbers are rendered, anything else is `None`.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Unsigned integer stored either as a JSON number or a numeric string.
pub fn unsigned(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
