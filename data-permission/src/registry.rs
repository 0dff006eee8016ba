//! The entity registry.
//!
//! Built once at composition time from an explicit list of declarations, then
//! read concurrently without locking. Per entity name it holds the union of the
//! permission field names declared by every record type carrying that entity,
//! ancestors included. Per record type it holds the resolved member to
//! permission-name mapping the redactor filters with.
//!
//! Registration never fails as a whole: a bad declaration is skipped, logged
//! and kept in [`EntityRegistry::discovery_errors`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use slog::{debug, info, o, warn, Logger};

use crate::{
    config::Settings,
    declaration::{Declaration, DeclarationParts, Entity},
    error::DiscoveryError,
    record::RecordType,
};

/// A named entity and the permission field names controlled under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDeclaration {
    name: String,
    fields: BTreeSet<String>,
}

impl EntityDeclaration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }
}

/// Resolved view of one record type, ancestors merged in.
#[derive(Clone, Debug, Default)]
struct ResolvedType {
    entity: Option<String>,
    fields: HashMap<String, String>,
    ignored_members: HashSet<String>,
}

/// Immutable registry of entity and field declarations.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<String, EntityDeclaration>,
    types: HashMap<RecordType, ResolvedType>,
    ignored_types: HashSet<RecordType>,
    discovery_errors: Vec<DiscoveryError>,
}

impl EntityRegistry {
    pub fn builder() -> EntityRegistryBuilder {
        EntityRegistryBuilder::new()
    }

    /// Returns the entity declared by the exact record type.
    ///
    /// Ancestors contribute field declarations, never the entity name.
    pub fn resolve(&self, record_type: &RecordType) -> Option<&EntityDeclaration> {
        let name = self.types.get(record_type)?.entity.as_deref()?;
        self.entities.get(name)
    }

    /// Permission field name declared for `member`, ancestors included.
    pub fn field_declaration(&self, record_type: &RecordType, member: &str) -> Option<&str> {
        self.types
            .get(record_type)?
            .fields
            .get(member)
            .map(String::as_str)
    }

    pub fn is_field_declared(&self, record_type: &RecordType, member: &str) -> bool {
        self.field_declaration(record_type, member).is_some()
    }

    /// Returns `true` if the record type carries the ignore marker.
    pub fn is_ignored(&self, record_type: &RecordType) -> bool {
        self.ignored_types.contains(record_type)
    }

    /// Returns `true` if the member carries the ignore marker.
    pub fn is_member_ignored(&self, record_type: &RecordType, member: &str) -> bool {
        self.types
            .get(record_type)
            .is_some_and(|resolved| resolved.ignored_members.contains(member))
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDeclaration> {
        self.entities.get(name)
    }

    /// Entities in name order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityDeclaration> {
        self.entities.values()
    }

    /// Declarations skipped while the registry was built.
    pub fn discovery_errors(&self) -> &[DiscoveryError] {
        &self.discovery_errors
    }
}

#[derive(Debug, Default)]
struct TypeEntry {
    entity: Option<String>,
    fields: BTreeMap<String, String>,
    ignored_members: BTreeSet<String>,
    parents: Vec<RecordType>,
}

/// Collects declarations and resolves them into an [`EntityRegistry`].
pub struct EntityRegistryBuilder {
    logger: Logger,
    scope: Option<Vec<String>>,
    types: BTreeMap<RecordType, TypeEntry>,
    ignored_types: HashSet<RecordType>,
    errors: Vec<DiscoveryError>,
}

impl Default for EntityRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistryBuilder {
    pub fn new() -> Self {
        Self {
            logger: Logger::root(slog::Discard, o!()),
            scope: None,
            types: BTreeMap::new(),
            ignored_types: HashSet::new(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Restricts discovery to record types under the given path prefixes.
    ///
    /// Ancestors pulled in by an accepted declaration are always registered.
    #[must_use]
    pub fn scope<I>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.scope = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// Applies the discovery scope of `settings`, if it names one.
    #[must_use]
    pub fn settings(self, settings: &Settings) -> Self {
        match settings.scope() {
            Some(prefixes) => self.scope(prefixes),
            None => self,
        }
    }

    /// Registers a declaration and, transitively, its ancestors.
    #[must_use]
    pub fn register(mut self, declaration: Declaration) -> Self {
        self.register_declaration(declaration, true);
        self
    }

    /// Registers the declaration generated for `T`.
    #[must_use]
    pub fn register_type<T: Entity>(self) -> Self {
        self.register(T::declaration())
    }

    /// Registers `record_type` under `entity` with the given
    /// `(member, permission name)` pairs and ignored members.
    #[must_use]
    pub fn register_entity<F, M, N, I>(
        self,
        entity: impl Into<String>,
        record_type: RecordType,
        fields: F,
        ignored_members: I,
    ) -> Self
    where
        F: IntoIterator<Item = (M, N)>,
        M: Into<String>,
        N: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut declaration = Declaration::new(record_type).entity(entity);
        for (member, name) in fields {
            declaration = declaration.field(member, name);
        }
        for member in ignored_members {
            declaration = declaration.ignore_member(member);
        }
        self.register(declaration)
    }

    fn in_scope(&self, record_type: &RecordType) -> bool {
        self.scope.as_ref().map_or(true, |prefixes| {
            prefixes.iter().any(|prefix| record_type.is_within(prefix))
        })
    }

    fn skip(&mut self, error: DiscoveryError) {
        warn!(self.logger, "skipping entity declaration"; "error" => %error);
        self.errors.push(error);
    }

    fn register_declaration(&mut self, declaration: Declaration, scoped: bool) {
        let DeclarationParts {
            record_type,
            entity,
            fields,
            ignored_members,
            ignored,
            ancestors,
        } = declaration.into_parts();

        if ignored {
            debug!(self.logger, "record type carries the ignore marker"; "record_type" => %record_type);
            self.ignored_types.insert(record_type);
            return;
        }
        if scoped && !self.in_scope(&record_type) {
            debug!(self.logger, "record type outside discovery scope"; "record_type" => %record_type);
            return;
        }
        if entity.as_deref().is_some_and(|name| name.trim().is_empty()) {
            self.skip(DiscoveryError::EmptyEntityName { record_type });
            return;
        }
        let existing = self
            .types
            .get(&record_type)
            .and_then(|entry| entry.entity.clone());
        if let (Some(existing), Some(conflicting)) = (existing, entity.as_ref()) {
            if existing != *conflicting {
                let error = DiscoveryError::ConflictingEntity {
                    record_type,
                    existing,
                    conflicting: conflicting.clone(),
                };
                self.skip(error);
                return;
            }
        }

        let parents: Vec<RecordType> = ancestors
            .iter()
            .map(|ancestor| ancestor.record_type().clone())
            .collect();
        for ancestor in ancestors {
            self.register_declaration(ancestor, false);
        }

        let mut accepted = Vec::with_capacity(fields.len());
        for field in fields {
            if field.name().trim().is_empty() {
                self.skip(DiscoveryError::EmptyFieldName {
                    record_type: record_type.clone(),
                    member: field.member().to_string(),
                });
            } else if !ignored_members.iter().any(|member| member == field.member()) {
                accepted.push(field);
            }
        }

        let entry = self.types.entry(record_type).or_default();
        if entry.entity.is_none() {
            entry.entity = entity;
        }
        for field in accepted {
            let (member, name) = field.into_parts();
            entry.fields.insert(member, name);
        }
        entry.ignored_members.extend(ignored_members);
        for parent in parents {
            if !entry.parents.contains(&parent) {
                entry.parents.push(parent);
            }
        }
    }

    /// Merges ancestor declarations into `resolved`, ancestors first so that
    /// inherited declarations cannot be overridden.
    fn collect(
        &self,
        record_type: &RecordType,
        stack: &mut Vec<RecordType>,
        resolved: &mut ResolvedType,
        errors: &mut Vec<DiscoveryError>,
    ) {
        if stack.contains(record_type) {
            let error = DiscoveryError::AncestorCycle {
                record_type: record_type.clone(),
            };
            if !errors.contains(&error) {
                errors.push(error);
            }
            return;
        }
        let Some(entry) = self.types.get(record_type) else {
            return;
        };
        stack.push(record_type.clone());
        for parent in &entry.parents {
            self.collect(parent, stack, resolved, errors);
        }
        stack.pop();
        for (member, name) in &entry.fields {
            resolved
                .fields
                .entry(member.clone())
                .or_insert_with(|| name.clone());
        }
        resolved
            .ignored_members
            .extend(entry.ignored_members.iter().cloned());
    }

    pub fn build(mut self) -> EntityRegistry {
        let mut cycles = Vec::new();
        let mut types = HashMap::with_capacity(self.types.len());
        let mut entities: BTreeMap<String, EntityDeclaration> = BTreeMap::new();

        for (record_type, entry) in &self.types {
            let mut resolved = ResolvedType {
                entity: entry.entity.clone(),
                ..ResolvedType::default()
            };
            self.collect(record_type, &mut Vec::new(), &mut resolved, &mut cycles);
            if let Some(name) = &resolved.entity {
                entities
                    .entry(name.clone())
                    .or_insert_with(|| EntityDeclaration {
                        name: name.clone(),
                        fields: BTreeSet::new(),
                    })
                    .fields
                    .extend(resolved.fields.values().cloned());
            }
            types.insert(record_type.clone(), resolved);
        }
        for error in cycles {
            self.skip(error);
        }

        info!(self.logger, "entity registry built";
            "entities" => entities.len(),
            "record_types" => types.len(),
            "ignored_types" => self.ignored_types.len(),
            "skipped" => self.errors.len());

        EntityRegistry {
            entities,
            types,
            ignored_types: self.ignored_types,
            discovery_errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_MEMBERS: [&str; 0] = [];

    fn order_type() -> RecordType {
        RecordType::new("shop::Order")
    }

    #[test]
    fn same_entity_name_unions_fields() {
        let registry = EntityRegistry::builder()
            .register_entity("Order", order_type(), [("amount", "amount")], NO_MEMBERS)
            .register_entity(
                "Order",
                RecordType::new("shop::OrderSummary"),
                [("customer_name", "customerName")],
                NO_MEMBERS,
            )
            .build();

        let entity = registry.entity("Order").unwrap();
        assert_eq!(
            entity.fields().iter().map(String::as_str).collect::<Vec<_>>(),
            ["amount", "customerName"]
        );
        assert!(registry.discovery_errors().is_empty());
    }

    #[test]
    fn repeated_registration_of_one_type_merges() {
        let registry = EntityRegistry::builder()
            .register_entity("Order", order_type(), [("amount", "amount")], NO_MEMBERS)
            .register_entity("Order", order_type(), [("id", "id")], NO_MEMBERS)
            .build();

        assert!(registry.is_field_declared(&order_type(), "amount"));
        assert!(registry.is_field_declared(&order_type(), "id"));
    }

    #[test]
    fn ancestors_contribute_fields_not_entity() {
        let audit = Declaration::new(RecordType::new("shop::Audit"))
            .entity("Audit")
            .field("created_by", "creator");
        let registry = EntityRegistry::builder()
            .register(
                Declaration::new(order_type())
                    .entity("Order")
                    .field("amount", "amount")
                    .extends(audit),
            )
            .build();

        assert_eq!(
            registry.field_declaration(&order_type(), "created_by"),
            Some("creator")
        );
        assert_eq!(registry.resolve(&order_type()).unwrap().name(), "Order");
        assert!(registry.entity("Order").unwrap().contains("creator"));
        assert_eq!(
            registry.resolve(&RecordType::new("shop::Audit")).unwrap().name(),
            "Audit"
        );
    }

    #[test]
    fn inheritance_is_transitive_and_not_overridable() {
        let root = Declaration::new(RecordType::new("shop::Root")).field("owner", "owner");
        let middle = Declaration::new(RecordType::new("shop::Middle"))
            .field("region", "region")
            .extends(root);
        let registry = EntityRegistry::builder()
            .register(
                Declaration::new(order_type())
                    .entity("Order")
                    .field("owner", "renamed")
                    .extends(middle),
            )
            .build();

        assert_eq!(
            registry.field_declaration(&order_type(), "owner"),
            Some("owner")
        );
        assert!(registry.is_field_declared(&order_type(), "region"));
    }

    #[test]
    fn ignored_type_is_skipped_and_marked() {
        let registry = EntityRegistry::builder()
            .register(
                Declaration::new(order_type())
                    .entity("Order")
                    .field("amount", "amount")
                    .ignored(),
            )
            .build();

        assert!(registry.resolve(&order_type()).is_none());
        assert!(registry.entity("Order").is_none());
        assert!(registry.is_ignored(&order_type()));
    }

    #[test]
    fn ignored_member_is_not_declared() {
        let registry = EntityRegistry::builder()
            .register(
                Declaration::new(order_type())
                    .entity("Order")
                    .field("amount", "amount")
                    .ignore_member("amount"),
            )
            .build();

        assert!(!registry.is_field_declared(&order_type(), "amount"));
        assert!(registry.is_member_ignored(&order_type(), "amount"));
    }

    #[test]
    fn bad_declarations_are_skipped_not_fatal() {
        let registry = EntityRegistry::builder()
            .register_entity(" ", RecordType::new("shop::Blank"), [("a", "a")], NO_MEMBERS)
            .register_entity("Order", order_type(), [("amount", "amount"), ("id", "")], NO_MEMBERS)
            .register_entity("Invoice", order_type(), [("total", "total")], NO_MEMBERS)
            .build();

        assert_eq!(registry.discovery_errors().len(), 3);
        assert!(matches!(
            registry.discovery_errors()[0],
            DiscoveryError::EmptyEntityName { .. }
        ));
        assert!(matches!(
            registry.discovery_errors()[1],
            DiscoveryError::EmptyFieldName { .. }
        ));
        assert!(matches!(
            registry.discovery_errors()[2],
            DiscoveryError::ConflictingEntity { .. }
        ));
        assert_eq!(registry.resolve(&order_type()).unwrap().name(), "Order");
        assert!(registry.is_field_declared(&order_type(), "amount"));
        assert!(!registry.is_field_declared(&order_type(), "total"));
        assert!(registry.entity("Invoice").is_none());
    }

    #[test]
    fn ancestor_cycle_is_reported_once() {
        let a = RecordType::new("shop::A");
        let b = RecordType::new("shop::B");
        let registry = EntityRegistry::builder()
            .register(
                Declaration::new(a.clone())
                    .entity("A")
                    .field("x", "x")
                    .extends(Declaration::new(b.clone()).field("y", "y")),
            )
            .register(Declaration::new(b).extends(Declaration::new(a.clone())))
            .build();

        assert!(registry
            .discovery_errors()
            .iter()
            .all(|error| matches!(error, DiscoveryError::AncestorCycle { .. })));
        assert!(!registry.discovery_errors().is_empty());
        assert!(registry.is_field_declared(&a, "y"));
    }

    #[test]
    fn scope_filters_top_level_declarations() {
        let registry = EntityRegistry::builder()
            .scope(["billing", "shop::orders"])
            .register_entity(
                "Order",
                RecordType::new("shop::orders::Order"),
                [("amount", "amount")],
                NO_MEMBERS,
            )
            .register_entity(
                "Cart",
                RecordType::new("shop::carts::Cart"),
                [("items", "items")],
                NO_MEMBERS,
            )
            .build();

        assert!(registry.entity("Order").is_some());
        assert!(registry.entity("Cart").is_none());
    }

    #[test]
    fn settings_scope_drives_discovery() {
        let settings: Settings =
            serde_json::from_str(r#"{"discovery_scope": " shop::orders , billing"}"#).unwrap();
        let registry = EntityRegistry::builder()
            .settings(&settings)
            .register_entity(
                "Order",
                RecordType::new("shop::orders::Order"),
                [("amount", "amount")],
                NO_MEMBERS,
            )
            .register_entity(
                "Invoice",
                RecordType::new("billing::Invoice"),
                [("total", "total")],
                NO_MEMBERS,
            )
            .register_entity(
                "Cart",
                RecordType::new("shop::carts::Cart"),
                [("items", "items")],
                NO_MEMBERS,
            )
            .build();

        assert_eq!(
            registry.entities().map(EntityDeclaration::name).collect::<Vec<_>>(),
            ["Invoice", "Order"]
        );
    }

    #[test]
    fn settings_without_scope_accept_everything() {
        let registry = EntityRegistry::builder()
            .settings(&Settings::default())
            .register_entity(
                "Cart",
                RecordType::new("shop::carts::Cart"),
                [("items", "items")],
                NO_MEMBERS,
            )
            .build();
        assert!(registry.entity("Cart").is_some());
    }
}
