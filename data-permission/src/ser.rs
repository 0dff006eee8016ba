//! `serde::Serialize` for the value model.
//!
//! Records and objects serialize as maps in field view order, sequences and
//! arrays as sequences, opaque values as unit. A record reached again while it
//! is being serialized is a cycle and fails the serializer.

use std::{cell::RefCell, collections::HashSet};

use serde::{
    ser::{Error as _, SerializeMap, SerializeSeq},
    Serialize, Serializer,
};

use crate::{
    record::{Record, RecordId},
    value::{FieldMap, Mapping, Value},
};

thread_local! {
    static IN_PROGRESS: RefCell<HashSet<RecordId>> = RefCell::new(HashSet::new());
}

/// Marks a record as being serialized on this thread until dropped.
struct CycleGuard(RecordId);

impl CycleGuard {
    fn enter(id: RecordId) -> Option<Self> {
        IN_PROGRESS
            .with(|active| active.borrow_mut().insert(id))
            .then_some(Self(id))
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        IN_PROGRESS.with(|active| {
            active.borrow_mut().remove(&self.0);
        });
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::Opaque(_) => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::UInt(value) => serializer.serialize_u64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
            Self::Sequence(items) => serialize_items(items, serializer),
            Self::Array(slots) => serialize_items(slots, serializer),
            Self::Mapping(mapping) => mapping.serialize(serializer),
            Self::Object(fields) => fields.serialize(serializer),
            Self::Record(record) => record.serialize(serializer),
        }
    }
}

fn serialize_items<S: Serializer>(items: &[Value], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (member, value) in self.iter() {
            map.serialize_entry(member, value)?;
        }
        map.end()
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(_guard) = CycleGuard::enter(self.id()) else {
            return Err(S::Error::custom(format_args!(
                "record {} references itself",
                self.record_type()
            )));
        };
        let fields = self.fields().map_err(S::Error::custom)?;
        fields.serialize(serializer)
    }
}
