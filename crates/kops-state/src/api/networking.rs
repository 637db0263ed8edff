use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::{
    resource::{
        Block, ResourceSchema, StateError, StateMap, Validator, Value, block_attribute,
        expand_field, string_attribute,
    },
    schema::schema_string_required,
};

const NAME: &str = "name";

/// The pod networking implementation of a cluster.
///
/// Exactly one provider is selected. In manifests it is written as a map with a single key, for
/// example `networking: {calico: {crossSubnet: true}}`, and manifests naming more than one
/// provider are rejected.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Networking {
    Classic(ClassicNetworkingSpec),
    Kubenet(KubenetNetworkingSpec),
    External(ExternalNetworkingSpec),
    Cni(CniNetworkingSpec),
    Kopeio(KopeioNetworkingSpec),
    Weave(WeaveNetworkingSpec),
    Flannel(FlannelNetworkingSpec),
    Calico(CalicoNetworkingSpec),
    Canal(CanalNetworkingSpec),
    Kuberouter(KuberouterNetworkingSpec),
    Romana(RomanaNetworkingSpec),
    AmazonVpc(AmazonVpcNetworkingSpec),
    Cilium(CiliumNetworkingSpec),
}

impl Default for Networking {
    fn default() -> Self {
        Self::Kubenet(KubenetNetworkingSpec::default())
    }
}

/// The name of a [`Networking`] provider, as stored in state.
#[derive(Clone, Copy, Debug, Display, EnumString, VariantNames, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum NetworkingProvider {
    Classic,
    Kubenet,
    External,
    Cni,
    Kopeio,
    Weave,
    Flannel,
    Calico,
    Canal,
    Kuberouter,
    Romana,
    AmazonVpc,
    Cilium,
}

string_attribute!(NetworkingProvider);

impl Networking {
    pub fn provider(&self) -> NetworkingProvider {
        match self {
            Self::Classic(_) => NetworkingProvider::Classic,
            Self::Kubenet(_) => NetworkingProvider::Kubenet,
            Self::External(_) => NetworkingProvider::External,
            Self::Cni(_) => NetworkingProvider::Cni,
            Self::Kopeio(_) => NetworkingProvider::Kopeio,
            Self::Weave(_) => NetworkingProvider::Weave,
            Self::Flannel(_) => NetworkingProvider::Flannel,
            Self::Calico(_) => NetworkingProvider::Calico,
            Self::Canal(_) => NetworkingProvider::Canal,
            Self::Kuberouter(_) => NetworkingProvider::Kuberouter,
            Self::Romana(_) => NetworkingProvider::Romana,
            Self::AmazonVpc(_) => NetworkingProvider::AmazonVpc,
            Self::Cilium(_) => NetworkingProvider::Cilium,
        }
    }
}

impl From<NetworkingProvider> for Networking {
    /// Selects `provider` with its default settings.
    fn from(provider: NetworkingProvider) -> Self {
        match provider {
            NetworkingProvider::Classic => Self::Classic(Default::default()),
            NetworkingProvider::Kubenet => Self::Kubenet(Default::default()),
            NetworkingProvider::External => Self::External(Default::default()),
            NetworkingProvider::Cni => Self::Cni(Default::default()),
            NetworkingProvider::Kopeio => Self::Kopeio(Default::default()),
            NetworkingProvider::Weave => Self::Weave(Default::default()),
            NetworkingProvider::Flannel => Self::Flannel(Default::default()),
            NetworkingProvider::Calico => Self::Calico(Default::default()),
            NetworkingProvider::Canal => Self::Canal(Default::default()),
            NetworkingProvider::Kuberouter => Self::Kuberouter(Default::default()),
            NetworkingProvider::Romana => Self::Romana(Default::default()),
            NetworkingProvider::AmazonVpc => Self::AmazonVpc(Default::default()),
            NetworkingProvider::Cilium => Self::Cilium(Default::default()),
        }
    }
}

/// State only records which provider is selected. Provider settings are not part of state and
/// expand to their defaults.
impl Block for Networking {
    fn resource() -> ResourceSchema {
        ResourceSchema::new()
            .field(NAME, schema_string_required())
            .describe(Some("The pod networking implementation of the cluster"))
    }

    fn flatten_block(&self) -> StateMap {
        StateMap::from_iter([(NAME.to_owned(), Value::String(self.provider().to_string()))])
    }

    fn expand_block(map: &StateMap, validator: Validator) -> Result<Self, StateError> {
        let provider: NetworkingProvider = expand_field(map, NAME, &validator)?;
        Ok(provider.into())
    }
}

block_attribute!(Networking);

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct ClassicNetworkingSpec {}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct KubenetNetworkingSpec {}

/// Networking is set up by an external tool after the cluster is created.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct ExternalNetworkingSpec {}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CniNetworkingSpec {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub uses_secondary_ip: bool,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct KopeioNetworkingSpec {}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaveNetworkingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_limit: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_masq_local: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlannelNetworkingSpec {
    /// The flannel backend, `udp` or `vxlan`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub backend: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalicoNetworkingSpec {
    /// Only encapsulate traffic between subnets.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cross_subnet: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log_severity_screen: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<i32>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub prometheus_metrics_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus_metrics_port: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanalNetworkingSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_endpoint_to_host_action: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disable_flannel_forward_rules: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log_severity_sys: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct KuberouterNetworkingSpec {}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RomanaNetworkingSpec {
    #[serde(
        default,
        rename = "daemonServiceIP",
        skip_serializing_if = "String::is_empty"
    )]
    pub daemon_service_ip: String,

    #[serde(
        default,
        rename = "etcdServiceIP",
        skip_serializing_if = "String::is_empty"
    )]
    pub etcd_service_ip: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmazonVpcNetworkingSpec {
    /// The container image of the VPC CNI plugin.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_name: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CiliumNetworkingSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tunnel: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ipam: bool,
}
