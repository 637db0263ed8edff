use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::{
    api::{EtcdClusterSpec, Kind, Networking},
    resource::{Block, string_attribute},
};

/// A kops cluster.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub metadata: ObjectMeta,
    pub spec: ClusterSpec,
}

impl Kind for Cluster {
    const KIND: &'static str = "Cluster";
}

/// The desired state of a cluster.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// The release channel used for default versions and images.
    #[serde(default)]
    #[state(default)]
    pub channel: String,

    /// The cloud the cluster runs on, for example `aws` or `gce`.
    #[serde(default)]
    pub cloud_provider: String,

    /// The DNS domain of services inside the cluster.
    #[serde(default, rename = "clusterDNSDomain")]
    #[state(default, rename = "cluster_dnsdomain")]
    pub cluster_dns_domain: String,

    /// The path where the cluster's configuration is stored.
    #[serde(default)]
    #[state(default)]
    pub config_base: String,

    #[serde(default)]
    #[state(default)]
    pub config_store: String,

    /// The DNS hosted zone used for the cluster's records.
    #[serde(default, rename = "dnsZone")]
    #[state(default, rename = "dnszone")]
    pub dns_zone: String,

    #[serde(default)]
    #[state(default)]
    pub key_store: String,

    /// The Kubernetes version to run.
    #[serde(default)]
    pub kubernetes_version: String,

    #[serde(default)]
    #[state(default)]
    pub master_internal_name: String,

    #[serde(default)]
    #[state(default)]
    pub master_public_name: String,

    /// The CIDR of the cluster's network.
    #[serde(default, rename = "networkCIDR")]
    #[state(default)]
    pub network_cidr: String,

    /// The id of an existing network to deploy into.
    #[serde(default, rename = "networkID")]
    #[state(default)]
    pub network_id: String,

    #[serde(default, rename = "nonMasqueradeCIDR")]
    #[state(default)]
    pub non_masquerade_cidr: String,

    /// The cloud project the cluster belongs to (GCE only).
    #[serde(default)]
    #[state(default)]
    pub project: String,

    #[serde(default)]
    #[state(default)]
    pub secret_store: String,

    #[serde(default, rename = "serviceClusterIPRange")]
    #[state(default, rename = "service_cluster_iprange")]
    pub service_cluster_ip_range: String,

    /// The name of an existing SSH key pair used for all instances.
    #[serde(default)]
    #[state(default, rename = "sshkey_name")]
    pub ssh_key_name: String,

    #[serde(default)]
    pub networking: Networking,

    #[serde(default)]
    #[state(rename = "subnet")]
    pub subnets: Vec<ClusterSubnetSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<TopologySpec>,

    /// CIDRs allowed to connect to instances over SSH.
    #[serde(default)]
    pub ssh_access: Vec<String>,

    /// CIDRs allowed to connect to the Kubernetes API.
    #[serde(default)]
    pub kubernetes_api_access: Vec<String>,

    /// Additional IAM policies per role, as JSON documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_policies: Option<BTreeMap<String, String>>,

    #[serde(default)]
    #[state(rename = "etcd_cluster")]
    pub etcd_clusters: Vec<EtcdClusterSpec>,
}

/// A subnet that instances of the cluster are placed in.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSubnetSpec {
    pub name: String,

    #[serde(default)]
    #[state(default)]
    pub cidr: String,

    #[serde(default)]
    #[state(default)]
    pub zone: String,

    #[serde(rename = "type")]
    pub r#type: SubnetType,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    EnumString,
    JsonSchema,
    VariantNames,
    PartialEq,
    Eq,
    Serialize,
)]
pub enum SubnetType {
    #[default]
    Public,
    Private,
    Utility,
}

/// Where masters and nodes are placed and how they are reached.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySpec {
    /// `public` or `private`.
    pub masters: String,

    /// `public` or `private`.
    pub nodes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bastion: Option<BastionSpec>,

    pub dns: DnsSpec,
}

/// A bastion host used to reach instances in private subnets.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BastionSpec {
    pub bastion_public_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_seconds: Option<i64>,
}

#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct DnsSpec {
    pub r#type: DnsType,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    EnumString,
    JsonSchema,
    VariantNames,
    PartialEq,
    Eq,
    Serialize,
)]
pub enum DnsType {
    #[default]
    Public,
    Private,
}

string_attribute!(SubnetType, DnsType);

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;
    use crate::{
        resource::{StateProblem, Validator, Value},
        yaml,
    };

    fn topology() -> TopologySpec {
        TopologySpec {
            masters: "private".to_owned(),
            nodes: "private".to_owned(),
            bastion: None,
            dns: DnsSpec {
                r#type: DnsType::Private,
            },
        }
    }

    #[test]
    fn topology_without_bastion() {
        assert_eq!(
            Value::Object(topology().flatten_block()),
            json!({
                "masters": "private",
                "nodes": "private",
                "dns": [{"type": "Private"}],
            })
        );
    }

    #[test]
    fn bastion_without_idle_timeout() {
        let topology = TopologySpec {
            bastion: Some(BastionSpec {
                bastion_public_name: "bastion.example.com".to_owned(),
                idle_timeout_seconds: None,
            }),
            ..topology()
        };
        let map = topology.flatten_block();
        assert_eq!(
            map["bastion"],
            json!([{"bastion_public_name": "bastion.example.com"}])
        );
        assert_eq!(
            TopologySpec::expand_block(&map, Validator::root()).unwrap(),
            topology
        );
    }

    #[test]
    fn subnet_type_must_be_known() {
        let map = json!({"name": "utility-eu-west-1a", "type": "Shared"});
        let err = ClusterSubnetSpec::expand_block(map.as_object().unwrap(), Validator::root())
            .unwrap_err();
        assert_eq!(err.path(), "type");
        assert_eq!(
            err.problem().to_string(),
            "unknown value \"Shared\", expected one of: Public, Private, Utility"
        );
        assert!(matches!(
            err.problem(),
            StateProblem::UnknownVariant { .. }
        ));
    }

    #[test]
    fn spec_state_keys() {
        let resource = ClusterSpec::resource();
        for key in [
            "cluster_dnsdomain",
            "dnszone",
            "service_cluster_iprange",
            "sshkey_name",
            "subnet",
            "etcd_cluster",
        ] {
            assert!(resource.get(key).is_some(), "{key} is not declared");
        }
        assert!(resource.get("cloud_provider").unwrap().required);
        assert!(resource.get("channel").unwrap().optional);
        assert_eq!(resource.get("networking").unwrap().max_items, Some(1));
    }

    #[test]
    fn read_manifest() {
        let cluster: Cluster = yaml::deserialize(indoc! {"
            metadata:
              name: example.k8s.local
            spec:
              cloudProvider: aws
              kubernetesVersion: 1.12.7
              networkCIDR: 172.20.0.0/16
              nonMasqueradeCIDR: 100.64.0.0/10
              networking:
                weave:
                  mtu: 8912
              subnets:
              - name: eu-west-1a
                cidr: 172.20.32.0/19
                zone: eu-west-1a
                type: Private
              topology:
                masters: private
                nodes: private
                dns:
                  type: Public
        "})
        .unwrap();

        assert_eq!(cluster.metadata.name.as_deref(), Some("example.k8s.local"));
        assert_eq!(cluster.spec.network_cidr, "172.20.0.0/16");
        assert_eq!(cluster.spec.subnets[0].r#type, SubnetType::Private);
        assert!(matches!(cluster.spec.networking, Networking::Weave(_)));
        assert_eq!(cluster.spec.additional_policies, None);
    }
}
