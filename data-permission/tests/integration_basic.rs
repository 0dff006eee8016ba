//! End-to-end tests for the public redaction API.
//!
//! These tests exercise the integration of:
//! - `Entity` derive declarations and field views,
//! - registry construction from derived declarations, and
//! - grant-driven filtering through the `redact` entrypoint.

use std::{collections::BTreeMap, marker::PhantomData};

use data_permission::{
    redact, Entity, EntityRegistry, FieldMap, Grants, IntoValue, Record, RecordType, Value,
};

#[derive(Clone, Entity)]
#[permission(entity = "Order")]
struct Order {
    #[permission(field)]
    amount: u64,
    #[permission(field = "customerName")]
    customer_name: String,
    id: u64,
}

fn order(id: u64) -> Order {
    Order {
        amount: 100,
        customer_name: "Alice".into(),
        id,
    }
}

fn registry() -> EntityRegistry {
    EntityRegistry::builder().register_type::<Order>().build()
}

fn names(value: &Value) -> Vec<&str> {
    match value {
        Value::Object(fields) => fields.names().collect(),
        Value::Record(_) => panic!("expected a filtered object, got an unchanged record"),
        other => panic!("expected an object, got {other:?}"),
    }
}

#[test]
fn test_derived_record_type_uses_module_path() {
    assert_eq!(
        Order::record_type(),
        RecordType::new(concat!(module_path!(), "::Order"))
    );
}

#[test]
fn test_derived_field_view_keeps_member_order() {
    let value = order(7).into_value();
    let record = value.as_record().unwrap();
    let fields = record.fields().unwrap();
    assert_eq!(
        fields.names().collect::<Vec<_>>(),
        ["amount", "customer_name", "id"]
    );
    assert_eq!(fields.get("customer_name"), Some(&Value::String("Alice".into())));
}

#[test]
fn test_derived_declaration_registers_entity() {
    let registry = registry();
    let entity = registry.resolve(&Order::record_type()).unwrap();
    assert_eq!(entity.name(), "Order");
    assert!(entity.contains("amount"));
    assert!(entity.contains("customerName"));
    assert!(!registry.is_field_declared(&Order::record_type(), "id"));
    assert_eq!(
        registry.field_declaration(&Order::record_type(), "customer_name"),
        Some("customerName")
    );
}

#[test]
fn test_redact_drops_fields_outside_grant() {
    let grants = Grants::new().allow("Order", ["amount"]);
    let out = redact(&order(7).into_value(), &registry(), &grants);
    assert_eq!(names(&out), ["amount", "id"]);
}

#[test]
fn test_redact_keeps_granted_fields() {
    let grants = Grants::new().allow("Order", ["amount", "customerName"]);
    let out = redact(&order(7).into_value(), &registry(), &grants);
    assert!(matches!(out, Value::Record(_)));
}

#[test]
fn test_redact_with_empty_grant_keeps_only_undeclared() {
    let grants = Grants::new().allow("Order", Vec::<String>::new());
    let out = redact(&order(7).into_value(), &registry(), &grants);
    assert_eq!(names(&out), ["id"]);
}

#[test]
fn test_nested_containers_are_walked() {
    let mut by_region = BTreeMap::new();
    by_region.insert("north", vec![order(1), order(2)]);
    by_region.insert("south", vec![order(3)]);

    let grants = Grants::new().allow("Order", ["customerName"]);
    let out = redact(&by_region.into_value(), &registry(), &grants);

    let mapping = out.as_mapping().unwrap();
    let north = mapping.get(&"north".into_value()).unwrap();
    for item in north.as_sequence().unwrap() {
        assert_eq!(names(item), ["customer_name", "id"]);
    }
}

#[test]
fn test_option_and_array_members() {
    #[derive(Entity)]
    struct Batch {
        first: Option<Order>,
        missing: Option<Order>,
        pair: [Order; 2],
    }

    let batch = Batch {
        first: Some(order(1)),
        missing: None,
        pair: [order(2), order(3)],
    };
    let grants = Grants::new().allow("Order", ["amount"]);
    let out = redact(&batch.into_value(), &registry(), &grants);

    let record = out.as_record().unwrap();
    assert_eq!(names(&record.get("first").unwrap().unwrap()), ["amount", "id"]);
    assert_eq!(record.get("missing").unwrap(), Some(Value::Null));
    let Some(Value::Array(pair)) = record.get("pair").unwrap() else {
        panic!("expected the array to keep its shape");
    };
    assert_eq!(pair.len(), 2);
    assert_eq!(names(&pair[1]), ["amount", "id"]);
}

#[test]
fn test_tuple_struct_members_are_indexed() {
    #[derive(Entity)]
    #[permission(entity = "Pair")]
    struct Pair(#[permission(field = "left")] String, String);

    let registry = EntityRegistry::builder().register_type::<Pair>().build();
    let grants = Grants::new().allow("Pair", Vec::<String>::new());
    let out = redact(
        &Pair("a".into(), "b".into()).into_value(),
        &registry,
        &grants,
    );
    assert_eq!(names(&out), ["1"]);
}

#[test]
fn test_phantom_members_are_not_in_the_field_view() {
    #[derive(Entity)]
    struct TypedId<T> {
        id: u64,
        _marker: PhantomData<T>,
    }

    struct NotAValue;

    let value = TypedId::<NotAValue> {
        id: 3,
        _marker: PhantomData,
    }
    .into_value();
    let fields = value.as_record().unwrap().fields().unwrap();
    assert_eq!(fields.names().collect::<Vec<_>>(), ["id"]);
}

#[test]
fn test_hand_built_records_follow_the_same_rules() {
    let registry = EntityRegistry::builder()
        .register_entity(
            "Customer",
            RecordType::new("crm::Customer"),
            [("email", "email")],
            Vec::<String>::new(),
        )
        .build();
    let customer = Record::new(
        RecordType::new("crm::Customer"),
        FieldMap::new().with("name", "Bob").with("email", "bob@example.com"),
    );
    let grants = Grants::new().allow("Customer", ["name"]);
    let out = redact(&Value::Record(customer), &registry, &grants);
    assert_eq!(names(&out), ["name"]);
}
