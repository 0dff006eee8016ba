//! Per-call permission grants.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// The fields of one entity a permission holder may see.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGrant {
    entity: String,
    #[serde(default)]
    fields: BTreeSet<String>,
}

impl EntityGrant {
    pub fn new<I>(entity: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            entity: entity.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }
}

/// Entity name to allowed permission field names, for one call.
///
/// An entity without an entry is unrestricted. An entity with an entry is
/// filtered strictly against it, so an empty set hides every declared field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grants {
    entries: HashMap<String, BTreeSet<String>>,
}

impl Grants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn allow<I>(mut self, entity: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.insert(EntityGrant::new(entity, fields));
        self
    }

    /// Adds a grant. Grants for an entity already present are unioned.
    pub fn insert(&mut self, grant: EntityGrant) {
        self.entries
            .entry(grant.entity)
            .or_default()
            .extend(grant.fields);
    }

    /// Allowed fields for `entity`, or `None` if the entity is unrestricted.
    pub fn get(&self, entity: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(entity)
    }

    pub fn restricts(&self, entity: &str) -> bool {
        self.entries.contains_key(entity)
    }

    /// Returns `true` if `field` of `entity` may be shown.
    pub fn permits(&self, entity: &str, field: &str) -> bool {
        self.get(entity).map_or(true, |allowed| allowed.contains(field))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<EntityGrant> for Grants {
    fn from_iter<I: IntoIterator<Item = EntityGrant>>(iter: I) -> Self {
        let mut grants = Self::new();
        grants.extend(iter);
        grants
    }
}

impl Extend<EntityGrant> for Grants {
    fn extend<I: IntoIterator<Item = EntityGrant>>(&mut self, iter: I) {
        for grant in iter {
            self.insert(grant);
        }
    }
}
