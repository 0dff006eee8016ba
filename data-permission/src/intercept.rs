//! Response interception.
//!
//! The [`Interceptor`] sits on the outbound path of a service. For each
//! response it checks the settings, the call's ignore marker and the response
//! shape, then redacts the payload held in the configured member of the
//! response wrapper and writes it back.
//!
//! Interception never fails the call: every problem leaves the response as it
//! was and is logged.

use std::sync::Arc;

use slog::{debug, error, o, warn, Logger};

use crate::{
    config::Settings,
    error::{InterceptError, RedactionError},
    provider::{CallContext, PermissionProvider},
    redaction::{GraphWalker, VisitedSet},
    registry::EntityRegistry,
    value::Value,
};

pub struct Interceptor<P> {
    settings: Settings,
    registry: Arc<EntityRegistry>,
    provider: P,
    logger: Logger,
    active: bool,
}

impl<P: PermissionProvider> Interceptor<P> {
    pub fn new(settings: Settings, registry: impl Into<Arc<EntityRegistry>>, provider: P) -> Self {
        Self::with_logger(
            settings,
            registry,
            provider,
            Logger::root(slog::Discard, o!()),
        )
    }

    /// Creates an interceptor that logs to `logger`.
    ///
    /// Invalid settings are logged here, once, and leave the interceptor
    /// inactive.
    pub fn with_logger(
        settings: Settings,
        registry: impl Into<Arc<EntityRegistry>>,
        provider: P,
        logger: Logger,
    ) -> Self {
        let active = match settings.validate() {
            Ok(()) => settings.enabled,
            Err(err) => {
                error!(logger, "data permission disabled by invalid settings"; "error" => %err);
                false
            }
        };
        Self {
            settings,
            registry: registry.into(),
            provider,
            logger,
            active,
        }
    }

    /// Returns `true` if settings are enabled and valid.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Redacts the payload of `response` for the caller behind `call`.
    ///
    /// The response wrapper is the same record afterwards; only its target
    /// member is replaced.
    pub fn intercept(&self, call: &CallContext, response: Value) -> Value {
        if !self.active {
            return response;
        }
        if call.is_ignored() {
            debug!(self.logger, "response carries the ignore marker";
                "handler" => call.handler_name());
            return response;
        }
        match self.redact_payload(call, &response) {
            Ok(()) => {}
            Err(err @ InterceptError::TargetMismatch { .. }) => {
                debug!(self.logger, "response left untouched";
                    "handler" => call.handler_name(), "reason" => %err);
            }
            Err(err) => {
                warn!(self.logger, "response left untouched";
                    "handler" => call.handler_name(), "reason" => %err);
            }
        }
        response
    }

    fn redact_payload(&self, call: &CallContext, response: &Value) -> Result<(), InterceptError> {
        let record = match response {
            Value::Record(record) if record.record_type().as_str() == self.settings.target_type => {
                record
            }
            Value::Record(record) => {
                return Err(self.mismatch(record.record_type().to_string()));
            }
            other => return Err(self.mismatch(other.kind().to_string())),
        };
        let poisoned = |_: RedactionError| InterceptError::Poisoned {
            record_type: record.record_type().clone(),
        };

        let field = self.settings.target_field.as_str();
        let payload = record
            .get(field)
            .map_err(poisoned)?
            .ok_or_else(|| InterceptError::MissingField {
                record_type: record.record_type().clone(),
                field: field.to_string(),
            })?;

        let grants = self.provider.current_grants(call);
        let redacted = GraphWalker::new(&self.registry, &grants)
            .fault_policy(self.settings.fault_policy)
            .max_depth(self.settings.max_depth)
            .logger(self.logger.clone())
            .redact(&payload, &mut VisitedSet::new());

        record.set(field, redacted).map_err(poisoned)?;
        Ok(())
    }

    fn mismatch(&self, found: String) -> InterceptError {
        InterceptError::TargetMismatch {
            expected: self.settings.target_type.clone(),
            found,
        }
    }
}
