//! The closed value model the walker operates on.
//!
//! Every response payload is expressed as a [`Value`]. Typed structs opt in
//! through [`IntoValue`](crate::IntoValue), usually generated by
//! `#[derive(Entity)]`; foreign values that should travel through untouched
//! are wrapped in [`Opaque`].

use std::{any::Any, fmt, sync::Arc};

use crate::{convert::IntoValue, record::Record};

/// A response value of any supported shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    /// Ordered sequence.
    Sequence(Vec<Value>),
    /// Fixed-size array.
    Array(Box<[Value]>),
    /// Key-ordered mapping with arbitrary keys.
    Mapping(Mapping),
    /// Generic name to value field map, produced when a record is filtered.
    Object(FieldMap),
    /// Typed, identity-bearing record.
    Record(Record),
    /// Undecomposable value, passed through unchanged.
    Opaque(Opaque),
}

impl Value {
    /// Short name of the value's shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Array(_) => "array",
            Self::Mapping(_) => "mapping",
            Self::Object(_) => "object",
            Self::Record(_) => "record",
            Self::Opaque(_) => "opaque value",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FieldMap> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            Self::Array(slots) => Some(slots),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }
}

// =============================================================================
// FieldMap - ordered member view of a record
// =============================================================================

/// Ordered `member -> value` map.
///
/// Insertion order is preserved. Inserting an existing member replaces its
/// value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, Value)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, member: impl Into<String>, value: impl IntoValue) -> Self {
        self.insert(member, value.into_value());
        self
    }

    /// Inserts a member, returning the previous value if it existed.
    pub fn insert(&mut self, member: impl Into<String>, value: Value) -> Option<Value> {
        let member = member.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(name, _)| *name == member) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((member, value));
        None
    }

    /// Splices the members of a record or object into this map.
    ///
    /// Any other value is inserted under `member`. This is how flattened
    /// ancestor members end up in a descendant's field view.
    pub fn flatten(&mut self, member: impl Into<String>, value: Value) {
        let members = match value {
            Value::Record(record) => match record.fields() {
                Ok(fields) => fields,
                Err(_) => {
                    self.insert(member, Value::Record(record));
                    return;
                }
            },
            Value::Object(fields) => fields,
            other => {
                self.insert(member, other);
                return;
            }
        };
        for (name, value) in members {
            self.insert(name, value);
        }
    }

    pub fn get(&self, member: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, member: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == member)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, member: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(name, _)| name == member)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, member: &str) -> bool {
        self.get(member).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Appends without checking for an existing member.
    pub(crate) fn push(&mut self, member: String, value: Value) {
        self.entries.push((member, value));
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (member, value) in iter {
            fields.insert(member, value);
        }
        fields
    }
}

// =============================================================================
// Mapping - key-ordered mapping with arbitrary keys
// =============================================================================

/// Key-ordered mapping. Keys are never redacted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(Value, Value)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl IntoValue, value: impl IntoValue) -> Self {
        self.insert(key.into_value(), value.into_value());
        self
    }

    /// Inserts an entry, returning the previous value if the key existed.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if let Some((_, slot)) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub(crate) fn push(&mut self, key: Value, value: Value) {
        self.entries.push((key, value));
    }
}

impl IntoIterator for Mapping {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(Value, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

// =============================================================================
// Opaque - values the walker cannot decompose
// =============================================================================

/// A foreign value carried through redaction untouched.
///
/// Opaque values compare equal only to clones of themselves.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.inner).cast::<()>() == Arc::as_ptr(&other.inner).cast::<()>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.type_name).finish()
    }
}
