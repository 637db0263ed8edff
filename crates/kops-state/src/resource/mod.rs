//! The host tool's resource model.
//!
//! State is a tree of maps: every resource is a [`StateMap`] of attributes, nested blocks are
//! lists of maps, and singleton nested blocks are lists holding exactly one map. A
//! [`ResourceSchema`] declares which attributes a map may hold.
//!
//! Typed records are converted with two traits:
//!
//! - [`Attribute`] converts a single value (a string, an optional integer, a list of blocks, ...)
//!   to and from a [`Value`].
//! - [`Block`] converts a record with named attributes to and from a [`StateMap`]. It is usually
//!   derived with [`#[derive(Block)]`](`derive@Block`), which also implements [`Attribute`] so
//!   that blocks can be nested in other blocks.
//!
//! ```
//! use kops_state::resource::{Block, Validator};
//!
//! #[derive(Block, Debug, Default, PartialEq)]
//! struct Bastion {
//!     bastion_public_name: String,
//!     idle_timeout_seconds: Option<i64>,
//! }
//!
//! let bastion = Bastion {
//!     bastion_public_name: "bastion.example.com".to_owned(),
//!     idle_timeout_seconds: None,
//! };
//! let map = bastion.flatten_block();
//! assert!(!map.contains_key("idle_timeout_seconds"));
//!
//! let expanded = Bastion::expand_block(&map, Validator::root()).unwrap();
//! assert_eq!(expanded, bastion);
//! ```
pub use kops_state_derive::Block;
pub use serde_json::Value;

mod attribute;
mod schema;
mod validation;

pub(crate) use attribute::{block_attribute, string_attribute};
pub use schema::*;
pub use validation::*;

/// A single resource (or nested block) in the host tool's state.
pub type StateMap = serde_json::Map<String, Value>;

/// A value that can be stored as an attribute in a [`StateMap`].
pub trait Attribute: Sized {
    /// Whether the attribute may be left out of a state map.
    ///
    /// [`Option`]s, lists and maps are optional, everything else is required unless the field is
    /// marked with `#[state(default)]`.
    const OPTIONAL: bool = false;

    /// The schema of the attribute. Required/optional flags are set by the containing block.
    fn schema() -> Schema;

    /// The element schema used when `Self` is stored in a list or a map.
    fn elem() -> Elem {
        Elem::Schema(Box::new(Self::schema()))
    }

    /// Whether `value` means "not set".
    fn is_absent(value: &Value) -> bool {
        value.is_null()
    }

    /// Converts `self` into a state value. `None` leaves the attribute out of the map.
    fn flatten(&self) -> Option<Value>;

    /// Converts `self` into a list or map element.
    fn flatten_elem(&self) -> Value {
        self.flatten().unwrap_or(Value::Null)
    }

    fn expand(value: &Value, validator: Validator) -> Result<Self, StateError>;

    fn expand_elem(value: &Value, validator: Validator) -> Result<Self, StateError> {
        Self::expand(value, validator)
    }

    /// Called when the attribute is absent from the state map.
    fn expand_missing(validator: Validator) -> Result<Self, StateError> {
        Err(validator.error_required())
    }
}

/// A record that is stored as a nested block (a [`StateMap`]).
pub trait Block: Sized {
    fn resource() -> ResourceSchema;

    fn flatten_block(&self) -> StateMap;

    fn expand_block(map: &StateMap, validator: Validator) -> Result<Self, StateError>;
}

/// The schema of a field of type `T`, as declared by `#[derive(Block)]`.
pub fn field_schema<T: Attribute>(
    defaulted: bool,
    computed: bool,
    description: Option<&str>,
) -> Schema {
    let schema = T::schema();
    let schema = if defaulted || T::OPTIONAL {
        schema.optional()
    } else {
        schema.required()
    };
    let schema = if computed { schema.computed() } else { schema };
    schema.describe(description)
}

/// Writes `attribute` under `key`, unless it flattens to nothing.
pub fn flatten_field<T: Attribute>(map: &mut StateMap, key: &str, attribute: &T) {
    if let Some(value) = attribute.flatten() {
        map.insert(key.to_owned(), value);
    }
}

/// Reads the attribute `key` from `map`.
pub fn expand_field<T: Attribute>(
    map: &StateMap,
    key: &'static str,
    validator: &Validator,
) -> Result<T, StateError> {
    let validator = validator.field(&key);
    match map.get(key) {
        Some(value) if !T::is_absent(value) => T::expand(value, validator),
        _ => T::expand_missing(validator),
    }
}

/// Reads the attribute `key` from `map`, falling back to [`Default::default`] if it is absent.
pub fn expand_field_or_default<T: Attribute + Default>(
    map: &StateMap,
    key: &'static str,
    validator: &Validator,
) -> Result<T, StateError> {
    let validator = validator.field(&key);
    match map.get(key) {
        Some(value) if !T::is_absent(value) => T::expand(value, validator),
        _ => Ok(T::default()),
    }
}

pub fn block_schema<T: Block>() -> Schema {
    Schema::block(T::resource())
}

/// A block is absent if it is `null` or an empty list.
pub fn is_absent_block(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Flattens `block` into a singleton nested block, a list holding a single map.
pub fn flatten_singleton<T: Block>(block: &T) -> Value {
    Value::Array(vec![Value::Object(block.flatten_block())])
}

/// Expands a singleton nested block, a list holding exactly one map.
pub fn expand_singleton<T: Block>(value: &Value, validator: Validator) -> Result<T, StateError> {
    match value {
        Value::Array(items) => match items.as_slice() {
            [] => Err(validator.error_required()),
            [item] => expand_object(item, validator.field(&0)),
            _ => Err(validator.error_too_many_items(1, items.len())),
        },
        other => Err(validator.error_unexpected_type(ValueType::List, other)),
    }
}

/// Expands a single map into a block.
pub fn expand_object<T: Block>(value: &Value, validator: Validator) -> Result<T, StateError> {
    match value {
        Value::Object(map) => T::expand_block(map, validator),
        other => Err(validator.error_unexpected_type(ValueType::Map, other)),
    }
}

/// Flattens a singleton block into the host tool's "ordered sequence containing exactly one map".
pub fn flatten_one<T: Block>(block: &T) -> Vec<StateMap> {
    vec![block.flatten_block()]
}

/// Flattens repeated blocks, one map per element, in input order.
pub fn flatten_many<T: Block>(blocks: &[T]) -> Vec<StateMap> {
    blocks.iter().map(Block::flatten_block).collect()
}

/// Expands the maps produced by [`flatten_one`].
pub fn expand_one<T: Block>(maps: &[StateMap], validator: Validator) -> Result<T, StateError> {
    match maps {
        [] => Err(validator.error_required()),
        [map] => T::expand_block(map, validator.field(&0)),
        _ => Err(validator.error_too_many_items(1, maps.len())),
    }
}

/// Expands the maps produced by [`flatten_many`].
pub fn expand_many<T: Block>(maps: &[StateMap], validator: Validator) -> Result<Vec<T>, StateError> {
    maps.iter()
        .enumerate()
        .map(|(index, map)| T::expand_block(map, validator.field(&index)))
        .collect()
}

/// Builds a [`StateMap`] from key/value pairs, mostly useful in tests.
pub fn state_map<K, I>(entries: I) -> StateMap
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value))
        .collect()
}
