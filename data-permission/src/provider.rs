//! The permission provider contract.
//!
//! The engine does not know who a caller is. It asks a [`PermissionProvider`]
//! for the grants attached to the current [`CallContext`] and treats an empty
//! answer as "no restriction".

use std::{collections::BTreeMap, sync::Arc};

use crate::grant::{EntityGrant, Grants};

/// What the interceptor knows about the call whose response it is filtering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallContext {
    handler: Option<String>,
    principal: Option<String>,
    ignored: bool,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the operation that produced the response.
    #[must_use]
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Identifies the permission holder making the call.
    #[must_use]
    pub fn principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// Attaches the ignore marker: the response of this call is never redacted.
    #[must_use]
    pub fn ignore_permission(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn handler_name(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    pub fn principal_id(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// Supplies permission grants.
pub trait PermissionProvider: Send + Sync {
    /// Every permission holder and the entity grants attached to it.
    ///
    /// Used for administration, never on the redaction path.
    fn permission_mapping(&self) -> BTreeMap<String, Vec<EntityGrant>> {
        BTreeMap::new()
    }

    /// Grants of the caller behind `call`.
    fn current_grants(&self, _call: &CallContext) -> Grants {
        Grants::new()
    }
}

impl<P: PermissionProvider + ?Sized> PermissionProvider for &P {
    fn permission_mapping(&self) -> BTreeMap<String, Vec<EntityGrant>> {
        (**self).permission_mapping()
    }

    fn current_grants(&self, call: &CallContext) -> Grants {
        (**self).current_grants(call)
    }
}

impl<P: PermissionProvider + ?Sized> PermissionProvider for Arc<P> {
    fn permission_mapping(&self) -> BTreeMap<String, Vec<EntityGrant>> {
        (**self).permission_mapping()
    }

    fn current_grants(&self, call: &CallContext) -> Grants {
        (**self).current_grants(call)
    }
}

impl<P: PermissionProvider + ?Sized> PermissionProvider for Box<P> {
    fn permission_mapping(&self) -> BTreeMap<String, Vec<EntityGrant>> {
        (**self).permission_mapping()
    }

    fn current_grants(&self, call: &CallContext) -> Grants {
        (**self).current_grants(call)
    }
}

/// Provider backed by a fixed holder to grants mapping.
///
/// The call's principal selects the holder. Calls without a principal, or with
/// an unknown one, get no grants and are therefore unrestricted.
#[derive(Clone, Debug, Default)]
pub struct StaticPermissionProvider {
    mapping: BTreeMap<String, Vec<EntityGrant>>,
}

impl StaticPermissionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn grant(mut self, holder: impl Into<String>, grant: EntityGrant) -> Self {
        self.mapping.entry(holder.into()).or_default().push(grant);
        self
    }
}

impl From<BTreeMap<String, Vec<EntityGrant>>> for StaticPermissionProvider {
    fn from(mapping: BTreeMap<String, Vec<EntityGrant>>) -> Self {
        Self { mapping }
    }
}

impl PermissionProvider for StaticPermissionProvider {
    fn permission_mapping(&self) -> BTreeMap<String, Vec<EntityGrant>> {
        self.mapping.clone()
    }

    fn current_grants(&self, call: &CallContext) -> Grants {
        call.principal_id()
            .and_then(|principal| self.mapping.get(principal))
            .map(|grants| grants.iter().cloned().collect())
            .unwrap_or_default()
    }
}
