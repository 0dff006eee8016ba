//! Per-record filtering.

use slog::warn;

use super::{walker::GraphWalker, FaultPolicy, VisitedSet};
use crate::{
    record::Record,
    value::{FieldMap, Value},
};

/// Outcome of redacting one record.
#[derive(Clone, Debug, PartialEq)]
pub enum Redacted {
    /// Nothing was dropped. The record's members were redacted in place.
    Unchanged(Record),
    /// At least one member was dropped. The survivors, in field view order.
    Filtered(FieldMap),
}

impl Redacted {
    pub fn into_value(self) -> Value {
        match self {
            Self::Unchanged(record) => Value::Record(record),
            Self::Filtered(fields) => Value::Object(fields),
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, Self::Filtered(_))
    }
}

pub(super) fn redact_record(
    walker: &GraphWalker<'_>,
    record: &Record,
    visited: &mut VisitedSet,
    depth: usize,
) -> Redacted {
    if !visited.insert(record) {
        return Redacted::Unchanged(record.clone());
    }

    let registry = walker.registry();
    let record_type = record.record_type();
    if registry.is_ignored(record_type) {
        return Redacted::Unchanged(record.clone());
    }

    let fields = match record.fields() {
        Ok(fields) => fields,
        Err(err) => {
            warn!(walker.log(), "record skipped"; "record_type" => %record_type, "error" => %err);
            return Redacted::Unchanged(record.clone());
        }
    };

    let allowed = registry
        .resolve(record_type)
        .and_then(|entity| walker.grants().get(entity.name()));

    let mut kept = FieldMap::with_capacity(fields.len());
    let mut dropped = false;
    for (member, value) in fields {
        if registry.is_member_ignored(record_type, &member) {
            kept.push(member, value);
            continue;
        }

        let value = match walker.walk(&value, visited, depth + 1) {
            Ok(redacted) => redacted,
            Err(err) => {
                warn!(walker.log(), "member redaction fault";
                    "record_type" => %record_type,
                    "member" => %member,
                    "error" => %err,
                    "fault_policy" => ?walker.policy());
                match walker.policy() {
                    FaultPolicy::FailOpen => {
                        kept.push(member, value);
                        continue;
                    }
                    FaultPolicy::Strict => {
                        dropped = true;
                        continue;
                    }
                }
            }
        };

        let denied = allowed.is_some_and(|allowed| {
            registry
                .field_declaration(record_type, &member)
                .is_some_and(|name| !allowed.contains(name))
        });
        if denied {
            dropped = true;
        } else {
            kept.push(member, value);
        }
    }

    if dropped {
        return Redacted::Filtered(kept);
    }
    if let Err(err) = record.replace_fields(kept) {
        warn!(walker.log(), "redacted members not written back";
            "record_type" => %record_type, "error" => %err);
    }
    Redacted::Unchanged(record.clone())
}
