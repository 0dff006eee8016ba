//! Shape dispatch over the value graph.
//!
//! The walker rebuilds containers in place of the originals, preserving order
//! and length, and hands every record it meets to the redactor. It owns the
//! per-call options: grants, fault policy, depth bound and logger.

use std::collections::HashMap;

use slog::{o, warn, Logger};

use super::{
    redactor::{self, Redacted},
    FaultPolicy, DEFAULT_MAX_DEPTH,
};
use crate::{
    error::RedactionError,
    grant::Grants,
    record::{Record, RecordId},
    registry::EntityRegistry,
    value::{FieldMap, Mapping, Value},
};

/// Record identities already processed during one top-level call.
///
/// Holds a handle to every visited record so an identity can not be reused by
/// a new allocation while the call is running.
#[derive(Debug, Default)]
pub struct VisitedSet {
    records: HashMap<RecordId, Record>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `record` as visited. Returns `false` if it already was.
    pub fn insert(&mut self, record: &Record) -> bool {
        if self.records.contains_key(&record.id()) {
            return false;
        }
        self.records.insert(record.id(), record.clone());
        true
    }

    pub fn contains(&self, record: &Record) -> bool {
        self.records.contains_key(&record.id())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Recursive redaction over [`Value`] graphs.
///
/// ```
/// use data_permission::{EntityRegistry, Grants, GraphWalker, Value, VisitedSet};
///
/// let registry = EntityRegistry::builder().build();
/// let grants = Grants::new();
/// let walker = GraphWalker::new(&registry, &grants);
/// let out = walker.redact(&Value::Int(7), &mut VisitedSet::new());
/// assert_eq!(out, Value::Int(7));
/// ```
pub struct GraphWalker<'a> {
    registry: &'a EntityRegistry,
    grants: &'a Grants,
    fault_policy: FaultPolicy,
    max_depth: usize,
    logger: Logger,
}

impl<'a> GraphWalker<'a> {
    pub fn new(registry: &'a EntityRegistry, grants: &'a Grants) -> Self {
        Self {
            registry,
            grants,
            fault_policy: FaultPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            logger: Logger::root(slog::Discard, o!()),
        }
    }

    #[must_use]
    pub fn fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }

    /// Maximum container and record nesting. Anything nested deeper is a fault.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Redacts `value`, threading `visited` through every nested record.
    ///
    /// Never fails. A fault is handled at the node that raised it: under
    /// [`FaultPolicy::FailOpen`] that node keeps its original value, under
    /// [`FaultPolicy::Strict`] it becomes `Value::Null`. Siblings are redacted
    /// either way.
    pub fn redact(&self, value: &Value, visited: &mut VisitedSet) -> Value {
        self.redact_node(value, visited, 0)
    }

    /// Redacts a single record.
    pub fn redact_record(&self, record: &Record, visited: &mut VisitedSet) -> Redacted {
        redactor::redact_record(self, record, visited, 0)
    }

    pub(crate) fn registry(&self) -> &EntityRegistry {
        self.registry
    }

    pub(crate) fn grants(&self) -> &Grants {
        self.grants
    }

    pub(crate) fn policy(&self) -> FaultPolicy {
        self.fault_policy
    }

    pub(crate) fn log(&self) -> &Logger {
        &self.logger
    }

    pub(crate) fn walk(
        &self,
        value: &Value,
        visited: &mut VisitedSet,
        depth: usize,
    ) -> Result<Value, RedactionError> {
        if depth > self.max_depth {
            return Err(RedactionError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        let next = depth + 1;
        Ok(match value {
            Value::Sequence(items) => Value::Sequence(
                items
                    .iter()
                    .map(|item| self.redact_node(item, visited, next))
                    .collect(),
            ),
            Value::Array(slots) => Value::Array(
                slots
                    .iter()
                    .map(|slot| self.redact_node(slot, visited, next))
                    .collect(),
            ),
            Value::Mapping(mapping) => {
                let mut out = Mapping::new();
                for (key, item) in mapping.iter() {
                    out.push(key.clone(), self.redact_node(item, visited, next));
                }
                Value::Mapping(out)
            }
            Value::Object(fields) => {
                let mut out = FieldMap::with_capacity(fields.len());
                for (member, item) in fields.iter() {
                    out.push(member.to_owned(), self.redact_node(item, visited, next));
                }
                Value::Object(out)
            }
            Value::Record(record) => {
                redactor::redact_record(self, record, visited, depth).into_value()
            }
            Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::UInt(_)
            | Value::Float(_)
            | Value::String(_)
            | Value::Opaque(_) => value.clone(),
        })
    }

    /// Walks one container slot or the root, settling a fault on the spot.
    fn redact_node(&self, value: &Value, visited: &mut VisitedSet, depth: usize) -> Value {
        match self.walk(value, visited, depth) {
            Ok(redacted) => redacted,
            Err(err) => {
                warn!(self.logger, "redaction fault";
                    "depth" => depth, "error" => %err, "fault_policy" => ?self.fault_policy);
                match self.fault_policy {
                    FaultPolicy::FailOpen => value.clone(),
                    FaultPolicy::Strict => Value::Null,
                }
            }
        }
    }
}
