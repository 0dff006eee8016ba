//! Identity-bearing records.
//!
//! A [`Record`] is a shared handle to a typed field view. Cloning the handle
//! does not copy the record: every clone refers to the same node, which is what
//! gives records an identity the walker can track. Records may reference
//! themselves through their own fields. Such cycles keep the node alive until
//! one of the back references is overwritten.

use std::{
    borrow::Cow,
    fmt,
    sync::{Arc, RwLock},
};

use crate::{error::RedactionError, value::FieldMap, value::Value};

/// Runtime type identity of a record.
///
/// Derived entities use their fully qualified path (`my_app::orders::Order`).
/// Hand-built records may use any stable name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordType(Cow<'static, str>);

impl RecordType {
    /// Creates a record type from any owned or static name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Creates a record type from a static name without allocating.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this type lives under the given path prefix.
    ///
    /// The prefix must match whole path segments: `shop` contains
    /// `shop::Order` but not `shopping::Cart`.
    pub fn is_within(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches("::");
        match self.0.strip_prefix(prefix) {
            Some("") => true,
            Some(rest) => rest.starts_with("::"),
            None => false,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a record node, stable for as long as the node is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(usize);

struct RecordNode {
    record_type: RecordType,
    fields: RwLock<FieldMap>,
}

/// Shared handle to a typed record.
#[derive(Clone)]
pub struct Record(Arc<RecordNode>);

impl Record {
    pub fn new(record_type: RecordType, fields: FieldMap) -> Self {
        Self(Arc::new(RecordNode {
            record_type,
            fields: RwLock::new(fields),
        }))
    }

    pub fn record_type(&self) -> &RecordType {
        &self.0.record_type
    }

    pub fn id(&self) -> RecordId {
        RecordId(Arc::as_ptr(&self.0) as usize)
    }

    /// Returns `true` if both handles refer to the same record node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a snapshot of the record's field view.
    ///
    /// Fails only when a writer panicked while holding the record, in which
    /// case the field view is considered undecomposable.
    pub fn fields(&self) -> Result<FieldMap, RedactionError> {
        self.0
            .fields
            .read()
            .map(|fields| fields.clone())
            .map_err(|_| self.poisoned())
    }

    /// Returns a copy of one member's value.
    pub fn get(&self, member: &str) -> Result<Option<Value>, RedactionError> {
        self.0
            .fields
            .read()
            .map(|fields| fields.get(member).cloned())
            .map_err(|_| self.poisoned())
    }

    /// Sets one member, returning the previous value if the member existed.
    pub fn set(
        &self,
        member: impl Into<String>,
        value: impl crate::IntoValue,
    ) -> Result<Option<Value>, RedactionError> {
        let value = value.into_value();
        self.update(|fields| fields.insert(member, value))
    }

    /// Runs `f` with exclusive access to the field view.
    pub fn update<R>(&self, f: impl FnOnce(&mut FieldMap) -> R) -> Result<R, RedactionError> {
        let mut fields = self.0.fields.write().map_err(|_| self.poisoned())?;
        Ok(f(&mut fields))
    }

    pub(crate) fn replace_fields(&self, fields: FieldMap) -> Result<(), RedactionError> {
        self.update(|current| *current = fields)
    }

    fn poisoned(&self) -> RedactionError {
        RedactionError::Poisoned {
            record_type: self.0.record_type.clone(),
        }
    }
}

/// Records compare equal when they are the same node, or when they share a
/// type and their field views compare equal.
///
/// Structural comparison of two distinct cyclic graphs does not terminate.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.record_type() != other.record_type() {
            return false;
        }
        match (self.fields(), other.fields()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}

// Only member names are printed so that cyclic records stay printable.
impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Record");
        debug.field("record_type", &self.record_type().as_str());
        match self.0.fields.read() {
            Ok(fields) => debug.field("members", &fields.names().collect::<Vec<_>>()),
            Err(_) => debug.field("members", &"<poisoned>"),
        };
        debug.finish()
    }
}
