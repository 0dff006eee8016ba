//! Field view conversions.
//!
//! [`IntoValue`] is the explicit opt-in a type gives the walker: it turns a
//! typed value into the closed [`Value`] model. `#[derive(Entity)]` generates it
//! for structs; this module covers the standard library types that appear as
//! struct members.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
};

use crate::{
    record::Record,
    value::{FieldMap, Mapping, Opaque, Value},
};

/// Converts a typed value into the walker's value model.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be converted into a redactable `Value`",
    label = "this type has no field view",
    note = "derive `Entity` on structs that should take part in redaction",
    note = "wrap foreign values in `Opaque` to carry them through unchanged"
)]
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for Record {
    fn into_value(self) -> Value {
        Value::Record(self)
    }
}

impl IntoValue for FieldMap {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl IntoValue for Mapping {
    fn into_value(self) -> Value {
        Value::Mapping(self)
    }
}

impl IntoValue for Opaque {
    fn into_value(self) -> Value {
        Value::Opaque(self)
    }
}

macro_rules! impl_into_value_via {
    ($variant:ident as $target:ty: $($ty:ty),+) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(<$target>::from(self))
                }
            }
        )+
    };
}

impl_into_value_via!(Int as i64: i8, i16, i32, i64);
impl_into_value_via!(UInt as u64: u8, u16, u32, u64);
impl_into_value_via!(Float as f64: f32, f64);
impl_into_value_via!(String as String: String, &str, char, Box<str>);

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for isize {
    #[allow(clippy::cast_precision_loss)]
    fn into_value(self) -> Value {
        i64::try_from(self).map_or(Value::Float(self as f64), Value::Int)
    }
}

impl IntoValue for usize {
    #[allow(clippy::cast_precision_loss)]
    fn into_value(self) -> Value {
        u64::try_from(self).map_or(Value::Float(self as f64), Value::UInt)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl IntoValue for Cow<'_, str> {
    fn into_value(self) -> Value {
        Value::String(self.into_owned())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: IntoValue> IntoValue for Box<T> {
    fn into_value(self) -> Value {
        (*self).into_value()
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Sequence(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for VecDeque<T> {
    fn into_value(self) -> Value {
        Value::Sequence(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue, const N: usize> IntoValue for [T; N] {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for Box<[T]> {
    fn into_value(self) -> Value {
        Value::Array(
            self.into_vec()
                .into_iter()
                .map(IntoValue::into_value)
                .collect(),
        )
    }
}

impl<T: IntoValue> IntoValue for BTreeSet<T> {
    fn into_value(self) -> Value {
        Value::Sequence(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue, S> IntoValue for HashSet<T, S> {
    fn into_value(self) -> Value {
        Value::Sequence(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for BTreeMap<K, V> {
    fn into_value(self) -> Value {
        let mut mapping = Mapping::new();
        for (key, value) in self {
            mapping.push(key.into_value(), value.into_value());
        }
        Value::Mapping(mapping)
    }
}

/// Iteration order of the source map is kept; it is whatever the hasher gives.
impl<K: IntoValue, V: IntoValue, S> IntoValue for HashMap<K, V, S> {
    fn into_value(self) -> Value {
        let mut mapping = Mapping::new();
        for (key, value) in self {
            mapping.push(key.into_value(), value.into_value());
        }
        Value::Mapping(mapping)
    }
}
