use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::resource::{StateError, StateMap, Validator};

/// The value types understood by the host tool's resource model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueType {
    Bool,
    Int,
    String,
    List,
    Map,
}

/// Describes a single attribute of a resource: its type, whether it has to be
/// set, and what its elements look like.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub value_type: ValueType,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<Elem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The element of a list or map attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Elem {
    /// Every element is a plain value.
    Schema(Box<Schema>),

    /// Every element is a nested block with its own attributes.
    Resource(ResourceSchema),
}

/// The attributes of a (nested) block, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResourceSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub fields: IndexMap<String, Schema>,
}

impl Schema {
    const fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            required: false,
            optional: false,
            computed: false,
            max_items: None,
            elem: None,
            description: None,
        }
    }

    pub const fn boolean() -> Self {
        Self::new(ValueType::Bool)
    }

    pub const fn integer() -> Self {
        Self::new(ValueType::Int)
    }

    pub const fn string() -> Self {
        Self::new(ValueType::String)
    }

    pub fn list(elem: Elem) -> Self {
        Self {
            elem: Some(elem),
            ..Self::new(ValueType::List)
        }
    }

    pub fn map(elem: Elem) -> Self {
        Self {
            elem: Some(elem),
            ..Self::new(ValueType::Map)
        }
    }

    /// A singleton nested block: a list holding at most one element of `resource`.
    pub fn block(resource: ResourceSchema) -> Self {
        Self::list(Elem::Resource(resource)).max_items(1)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn describe(mut self, description: Option<&str>) -> Self {
        if let Some(description) = description {
            self.description = Some(description.to_owned());
        }
        self
    }

    /// Returns the nested resource if this attribute is a list or map of blocks.
    pub fn resource(&self) -> Option<&ResourceSchema> {
        match &self.elem {
            Some(Elem::Resource(resource)) => Some(resource),
            _ => None,
        }
    }

    fn validate_value(&self, value: &Value, validator: &Validator) -> Result<(), StateError> {
        match (self.value_type, value) {
            (ValueType::Bool, Value::Bool(_)) | (ValueType::String, Value::String(_)) => Ok(()),
            (ValueType::Int, Value::Number(number)) if number.is_i64() || number.is_u64() => {
                Ok(())
            }
            (ValueType::List, Value::Array(items)) => {
                if let Some(max_items) = self.max_items {
                    if items.len() > max_items {
                        return Err(validator.error_too_many_items(max_items, items.len()));
                    }
                }
                if self.required && items.is_empty() {
                    return Err(validator.error_required());
                }
                items.iter().enumerate().try_for_each(|(index, item)| {
                    self.validate_elem(item, &validator.field(&index))
                })
            }
            (ValueType::Map, Value::Object(entries)) => entries
                .iter()
                .try_for_each(|(key, item)| self.validate_elem(item, &validator.field(key))),
            (expected, found) => Err(validator.error_unexpected_type(expected, found)),
        }
    }

    fn validate_elem(&self, item: &Value, validator: &Validator) -> Result<(), StateError> {
        match (&self.elem, item) {
            (None, _) => Ok(()),
            (Some(Elem::Schema(schema)), item) => schema.validate_value(item, validator),
            (Some(Elem::Resource(resource)), Value::Object(map)) => {
                resource.validate_map(map, validator)
            }
            (Some(Elem::Resource(_)), item) => {
                Err(validator.error_unexpected_type(ValueType::Map, item))
            }
        }
    }
}

impl ResourceSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the attribute `key`.
    pub fn field(mut self, key: &str, schema: Schema) -> Self {
        self.fields.insert(key.to_owned(), schema);
        self
    }

    pub fn describe(mut self, description: Option<&str>) -> Self {
        if let Some(description) = description {
            self.description = Some(description.to_owned());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.fields.get(key)
    }

    /// Checks that `map` has the shape this schema declares.
    ///
    /// Every key of `map` must be declared, every required attribute must be
    /// present (and, for lists, non-empty), every value must have the declared
    /// type, and singleton blocks may hold at most one element. Nested blocks are
    /// checked recursively. `null` counts as absent.
    pub fn validate(&self, map: &StateMap) -> Result<(), StateError> {
        self.validate_map(map, &Validator::root())
    }

    fn validate_map(&self, map: &StateMap, validator: &Validator) -> Result<(), StateError> {
        if let Some(unknown) = map.keys().find(|key| !self.fields.contains_key(*key)) {
            return Err(validator.field(unknown).error_unknown_field());
        }

        for (key, schema) in &self.fields {
            let validator = validator.field(key);
            match map.get(key) {
                None | Some(Value::Null) => {
                    if schema.required {
                        return Err(validator.error_required());
                    }
                }
                Some(value) => schema.validate_value(value, &validator)?,
            }
        }

        Ok(())
    }
}
