use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    duration::Duration,
    resource::{Attribute, Elem, Schema, StateError, Validator, ValueType},
};

impl Attribute for String {
    fn schema() -> Schema {
        Schema::string()
    }

    fn flatten(&self) -> Option<Value> {
        Some(Value::String(self.clone()))
    }

    fn expand(value: &Value, validator: Validator) -> Result<Self, StateError> {
        match value {
            Value::String(value) => Ok(value.clone()),
            other => Err(validator.error_unexpected_type(ValueType::String, other)),
        }
    }
}

impl Attribute for bool {
    fn schema() -> Schema {
        Schema::boolean()
    }

    fn flatten(&self) -> Option<Value> {
        Some(Value::Bool(*self))
    }

    fn expand(value: &Value, validator: Validator) -> Result<Self, StateError> {
        match value {
            Value::Bool(value) => Ok(*value),
            other => Err(validator.error_unexpected_type(ValueType::Bool, other)),
        }
    }
}

macro_rules! integer_attribute {
    ($($ty:ty),+) => {
        $(
            impl Attribute for $ty {
                fn schema() -> Schema {
                    Schema::integer()
                }

                fn flatten(&self) -> Option<Value> {
                    Some(Value::from(*self))
                }

                fn expand(value: &Value, validator: Validator) -> Result<Self, StateError> {
                    let Value::Number(number) = value else {
                        return Err(validator.error_unexpected_type(ValueType::Int, value));
                    };
                    if let Some(signed) = number.as_i64() {
                        <$ty>::try_from(signed)
                            .map_err(|_| validator.error_out_of_range(signed, stringify!($ty)))
                    } else if let Some(unsigned) = number.as_u64() {
                        <$ty>::try_from(unsigned)
                            .map_err(|_| validator.error_out_of_range(unsigned, stringify!($ty)))
                    } else {
                        Err(validator.error_unexpected_type(ValueType::Int, value))
                    }
                }
            }
        )+
    };
}

integer_attribute!(i32, i64, u32);

/// Durations are stored in their canonical string form, see [`Duration`]'s `Display` implementation.
impl Attribute for Duration {
    fn schema() -> Schema {
        Schema::string()
    }

    fn flatten(&self) -> Option<Value> {
        Some(Value::String(self.to_string()))
    }

    fn expand(value: &Value, validator: Validator) -> Result<Self, StateError> {
        let raw = String::expand(value, validator)?;
        raw.parse()
            .map_err(|err| validator.error_invalid_duration(err))
    }
}

impl<T: Attribute> Attribute for Option<T> {
    const OPTIONAL: bool = true;

    fn schema() -> Schema {
        T::schema()
    }

    fn elem() -> Elem {
        T::elem()
    }

    fn is_absent(value: &Value) -> bool {
        T::is_absent(value)
    }

    fn flatten(&self) -> Option<Value> {
        self.as_ref().and_then(T::flatten)
    }

    fn expand(value: &Value, validator: Validator) -> Result<Self, StateError> {
        if T::is_absent(value) {
            Ok(None)
        } else {
            T::expand(value, validator).map(Some)
        }
    }

    fn expand_missing(_validator: Validator) -> Result<Self, StateError> {
        Ok(None)
    }
}

impl<T: Attribute> Attribute for Vec<T> {
    const OPTIONAL: bool = true;

    fn schema() -> Schema {
        Schema::list(T::elem())
    }

    fn flatten(&self) -> Option<Value> {
        Some(Value::Array(self.iter().map(T::flatten_elem).collect()))
    }

    fn expand(value: &Value, validator: Validator) -> Result<Self, StateError> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| T::expand_elem(item, validator.field(&index)))
                .collect(),
            other => Err(validator.error_unexpected_type(ValueType::List, other)),
        }
    }

    fn expand_missing(_validator: Validator) -> Result<Self, StateError> {
        Ok(Vec::new())
    }
}

impl<V: Attribute> Attribute for BTreeMap<String, V> {
    const OPTIONAL: bool = true;

    fn schema() -> Schema {
        Schema::map(V::elem())
    }

    fn flatten(&self) -> Option<Value> {
        Some(Value::Object(
            self.iter()
                .map(|(key, value)| (key.clone(), value.flatten_elem()))
                .collect(),
        ))
    }

    fn expand(value: &Value, validator: Validator) -> Result<Self, StateError> {
        match value {
            Value::Object(entries) => entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), V::expand_elem(item, validator.field(key))?)))
                .collect(),
            other => Err(validator.error_unexpected_type(ValueType::Map, other)),
        }
    }

    fn expand_missing(_validator: Validator) -> Result<Self, StateError> {
        Ok(BTreeMap::new())
    }
}

/// Implements [`Attribute`] for enums that are stored by their string name.
///
/// The type must implement [`Display`](std::fmt::Display), [`FromStr`](std::str::FromStr) and
/// [`strum::VariantNames`], which is usually done with the corresponding strum derives.
macro_rules! string_attribute {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::resource::Attribute for $ty {
                fn schema() -> $crate::resource::Schema {
                    $crate::resource::Schema::string()
                }

                fn flatten(&self) -> ::core::option::Option<$crate::resource::Value> {
                    ::core::option::Option::Some($crate::resource::Value::String(self.to_string()))
                }

                fn expand(
                    value: &$crate::resource::Value,
                    validator: $crate::resource::Validator,
                ) -> ::core::result::Result<Self, $crate::resource::StateError> {
                    let raw = <String as $crate::resource::Attribute>::expand(value, validator)?;
                    raw.parse::<Self>().map_err(|_| {
                        validator.error_unknown_variant(
                            &raw,
                            <$ty as ::strum::VariantNames>::VARIANTS,
                        )
                    })
                }
            }
        )+
    };
}

pub(crate) use string_attribute;

/// Implements [`Attribute`] for types with a hand-written [`Block`](crate::resource::Block)
/// implementation, storing them as singleton nested blocks like `#[derive(Block)]` does.
macro_rules! block_attribute {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::resource::Attribute for $ty {
                fn schema() -> $crate::resource::Schema {
                    $crate::resource::block_schema::<Self>()
                }

                fn elem() -> $crate::resource::Elem {
                    $crate::resource::Elem::Resource(
                        <Self as $crate::resource::Block>::resource(),
                    )
                }

                fn is_absent(value: &$crate::resource::Value) -> bool {
                    $crate::resource::is_absent_block(value)
                }

                fn flatten(&self) -> ::core::option::Option<$crate::resource::Value> {
                    ::core::option::Option::Some($crate::resource::flatten_singleton(self))
                }

                fn flatten_elem(&self) -> $crate::resource::Value {
                    $crate::resource::Value::Object($crate::resource::Block::flatten_block(self))
                }

                fn expand(
                    value: &$crate::resource::Value,
                    validator: $crate::resource::Validator,
                ) -> ::core::result::Result<Self, $crate::resource::StateError> {
                    $crate::resource::expand_singleton(value, validator)
                }

                fn expand_elem(
                    value: &$crate::resource::Value,
                    validator: $crate::resource::Validator,
                ) -> ::core::result::Result<Self, $crate::resource::StateError> {
                    $crate::resource::expand_object(value, validator)
                }
            }
        )+
    };
}

pub(crate) use block_attribute;
