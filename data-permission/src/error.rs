//! Error taxonomy.
//!
//! None of these errors cross the public redaction entrypoints. They are
//! either logged and retained for inspection (configuration, discovery) or
//! caught at the node that raised them (redaction, interception).

use crate::record::RecordType;

/// Invalid settings detected at setup. The interceptor stays disabled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("target type must not be empty when redaction is enabled")]
    MissingTargetType,

    #[error("target field must not be empty when redaction is enabled")]
    MissingTargetField,

    #[error("max depth must be at least 1")]
    ZeroDepth,

    #[error("discovery scope is set but contains no path prefix")]
    EmptyScope,
}

/// A declaration that was skipped while building the entity registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("record type {record_type} declares an empty entity name")]
    EmptyEntityName { record_type: RecordType },

    #[error("member `{member}` of {record_type} declares an empty field name")]
    EmptyFieldName {
        record_type: RecordType,
        member: String,
    },

    #[error(
        "record type {record_type} is already registered as entity `{existing}`, \
         ignoring conflicting entity `{conflicting}`"
    )]
    ConflictingEntity {
        record_type: RecordType,
        existing: String,
        conflicting: String,
    },

    #[error("record type {record_type} is its own ancestor")]
    AncestorCycle { record_type: RecordType },
}

/// A fault while redacting one node of the graph.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RedactionError {
    #[error("graph nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error("record {record_type} is poisoned and cannot be read")]
    Poisoned { record_type: RecordType },
}

/// Reasons the interceptor left a response untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InterceptError {
    #[error("response is a {found}, expected a record of type {expected}")]
    TargetMismatch { expected: String, found: String },

    #[error("response record {record_type} has no field `{field}`")]
    MissingField {
        record_type: RecordType,
        field: String,
    },

    #[error("response record {record_type} is poisoned and cannot be written")]
    Poisoned { record_type: RecordType },
}
