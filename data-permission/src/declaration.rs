//! Declarations: the registration units the entity registry is built from.
//!
//! A [`Declaration`] describes one record type: the entity it belongs to, the
//! members under permission control, the members excluded from redaction, and
//! the declarations of the types it flattens in (its ancestors). Declarations
//! are normally produced by `#[derive(Entity)]`, but can be written by hand for
//! records built at runtime.

use crate::{convert::IntoValue, record::RecordType};

/// A struct with a generated record type and declaration.
///
/// Implemented by `#[derive(Entity)]`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Entity`",
    label = "this type has no entity declaration",
    note = "use `#[derive(Entity)]` on the type definition"
)]
pub trait Entity: IntoValue {
    /// Runtime type identity of records produced by this type.
    fn record_type() -> RecordType;

    /// Declaration registered for this type, including flattened ancestors.
    fn declaration() -> Declaration;
}

/// Marks one member of a record type as subject to allow-list filtering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDeclaration {
    member: String,
    name: String,
}

impl FieldDeclaration {
    /// `member` is the name in the record's field view, `name` the permission
    /// field name matched against grants.
    pub fn new(member: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            name: name.into(),
        }
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(self) -> (String, String) {
        (self.member, self.name)
    }
}

/// Everything the registry needs to know about one record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    record_type: RecordType,
    entity: Option<String>,
    fields: Vec<FieldDeclaration>,
    ignored_members: Vec<String>,
    ignored: bool,
    ancestors: Vec<Declaration>,
}

impl Declaration {
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            entity: None,
            fields: Vec::new(),
            ignored_members: Vec::new(),
            ignored: false,
            ancestors: Vec::new(),
        }
    }

    /// Attaches an entity name to the record type.
    #[must_use]
    pub fn entity(mut self, name: impl Into<String>) -> Self {
        self.entity = Some(name.into());
        self
    }

    /// Declares `member` as the permission field `name`.
    #[must_use]
    pub fn field(mut self, member: impl Into<String>, name: impl Into<String>) -> Self {
        self.fields.push(FieldDeclaration::new(member, name));
        self
    }

    /// Excludes `member` from discovery and redaction.
    #[must_use]
    pub fn ignore_member(mut self, member: impl Into<String>) -> Self {
        self.ignored_members.push(member.into());
        self
    }

    /// Excludes the whole record type from discovery and redaction.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Adds an ancestor whose field declarations are inherited.
    #[must_use]
    pub fn extends(mut self, ancestor: Declaration) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    pub fn entity_name(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn fields(&self) -> &[FieldDeclaration] {
        &self.fields
    }

    pub fn ignored_members(&self) -> &[String] {
        &self.ignored_members
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn ancestors(&self) -> &[Declaration] {
        &self.ancestors
    }

    pub(crate) fn into_parts(self) -> DeclarationParts {
        DeclarationParts {
            record_type: self.record_type,
            entity: self.entity,
            fields: self.fields,
            ignored_members: self.ignored_members,
            ignored: self.ignored,
            ancestors: self.ancestors,
        }
    }
}

pub(crate) struct DeclarationParts {
    pub(crate) record_type: RecordType,
    pub(crate) entity: Option<String>,
    pub(crate) fields: Vec<FieldDeclaration>,
    pub(crate) ignored_members: Vec<String>,
    pub(crate) ignored: bool,
    pub(crate) ancestors: Vec<Declaration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_everything() {
        let base = Declaration::new(RecordType::new("shop::Audit")).field("created_by", "creator");
        let declaration = Declaration::new(RecordType::new("shop::Order"))
            .entity("Order")
            .field("amount", "amount")
            .field("customer_name", "customerName")
            .ignore_member("internal")
            .extends(base.clone());

        assert_eq!(declaration.entity_name(), Some("Order"));
        assert_eq!(declaration.fields().len(), 2);
        assert_eq!(declaration.fields()[1].member(), "customer_name");
        assert_eq!(declaration.fields()[1].name(), "customerName");
        assert_eq!(declaration.ignored_members(), ["internal"]);
        assert_eq!(declaration.ancestors(), [base]);
        assert!(!declaration.is_ignored());
    }
}
