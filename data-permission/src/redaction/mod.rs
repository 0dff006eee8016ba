//! Graph traversal and redaction.
//!
//! - **`walker`**: shape dispatch over the value graph (`GraphWalker`, `VisitedSet`)
//! - **`redactor`**: per-record filtering against the registry and grants (`Redacted`)
//!
//! The single-call entrypoint is [`redact`].

mod redactor;
mod walker;

use serde::{Deserialize, Serialize};

pub use redactor::Redacted;
pub use walker::{GraphWalker, VisitedSet};

use crate::{grant::Grants, registry::EntityRegistry, value::Value};

/// Nesting depth past which a node is treated as faulty.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// What happens to a node whose redaction faulted.
///
/// Only the faulting node is affected; its siblings are redacted as usual.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Keep the node's pre-redaction value.
    #[default]
    FailOpen,
    /// Drop a faulting record member. Any other faulting node, the root
    /// included, becomes `Null` so containers keep their length.
    Strict,
}

/// Redacts `value` for a caller holding `grants`, with default options.
pub fn redact(value: &Value, registry: &EntityRegistry, grants: &Grants) -> Value {
    GraphWalker::new(registry, grants).redact(value, &mut VisitedSet::new())
}
