//! Reading and writing kops manifests.
//!
//! Enums with data, like [`Networking`](crate::api::Networking), are written as a YAML map
//! containing one entry in which the key identifies the variant name, for example
//! `networking: {calico: {}}`.
use std::io::Write;

use serde::{Serialize, de::DeserializeOwned};
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to deserialize YAML"))]
    DeserializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML document separator"))]
    WriteDocumentSeparator { source: std::io::Error },
}

/// Serializes the given data structure as an explicit YAML document and writes it to a [`Write`].
///
/// ```
/// use kops_state::{
///     api::{CalicoNetworkingSpec, Networking},
///     yaml,
/// };
///
/// let mut buf = Vec::new();
/// yaml::serialize_to_explicit_document(&mut buf, &Networking::Calico(CalicoNetworkingSpec::default()))
///     .unwrap();
///
/// assert_eq!(std::str::from_utf8(&buf).unwrap(), "---\ncalico: {}\n");
/// ```
pub fn serialize_to_explicit_document<T, W>(mut writer: W, value: &T) -> Result<()>
where
    T: Serialize,
    W: Write,
{
    writer
        .write_all(b"---\n")
        .context(WriteDocumentSeparatorSnafu)?;
    let mut serializer = serde_yaml::Serializer::new(writer);
    serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)
        .context(SerializeYamlSnafu)?;
    Ok(())
}

/// Deserializes a single YAML document, reading enums in the singleton map form.
pub fn deserialize<T: DeserializeOwned>(input: &str) -> Result<T> {
    let deserializer = serde_yaml::Deserializer::from_str(input);
    serde_yaml::with::singleton_map_recursive::deserialize(deserializer)
        .context(DeserializeYamlSnafu)
}
