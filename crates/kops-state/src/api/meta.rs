use k8s_openapi::{
    apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time},
    jiff::Timestamp,
};

use crate::{
    resource::{
        Block, ResourceSchema, StateError, StateMap, Validator, Value, block_attribute,
        expand_field,
    },
    schema::{schema_string_computed, schema_string_required},
};

const NAME: &str = "name";
const CREATION_TIMESTAMP: &str = "creation_timestamp";

/// Only the name and the creation timestamp are kept in state, every other metadata field is
/// managed by the cluster manager.
impl Block for ObjectMeta {
    fn resource() -> ResourceSchema {
        ResourceSchema::new()
            .field(NAME, schema_string_required())
            .field(CREATION_TIMESTAMP, schema_string_computed())
    }

    fn flatten_block(&self) -> StateMap {
        let mut map = StateMap::new();
        map.insert(
            NAME.to_owned(),
            Value::String(self.name.clone().unwrap_or_default()),
        );
        if let Some(Time(timestamp)) = &self.creation_timestamp {
            map.insert(
                CREATION_TIMESTAMP.to_owned(),
                Value::String(timestamp.to_string()),
            );
        }
        map
    }

    fn expand_block(map: &StateMap, validator: Validator) -> Result<Self, StateError> {
        let name: String = expand_field(map, NAME, &validator)?;
        let creation_timestamp: Option<String> =
            expand_field(map, CREATION_TIMESTAMP, &validator)?;

        let creation_timestamp = creation_timestamp
            .map(|raw| {
                raw.parse::<Timestamp>().map(Time).map_err(|err| {
                    validator
                        .field(&CREATION_TIMESTAMP)
                        .error_invalid_timestamp(err)
                })
            })
            .transpose()?;

        Ok(Self {
            name: Some(name),
            creation_timestamp,
            ..Self::default()
        })
    }
}

block_attribute!(ObjectMeta);
