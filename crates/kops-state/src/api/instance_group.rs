use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::{
    api::{FileAssetSpec, HookSpec, Kind, KubeletConfigSpec, UserData},
    resource::{Block, string_attribute},
};

/// A kops instance group.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroup {
    pub metadata: ObjectMeta,
    pub spec: InstanceGroupSpec,
}

impl Kind for InstanceGroup {
    const KIND: &'static str = "InstanceGroup";
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
pub enum InstanceGroupRole {
    Master,
    #[default]
    Node,
    Bastion,
}

string_attribute!(InstanceGroupRole);

/// The desired state of an instance group.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroupSpec {
    pub role: InstanceGroupRole,

    /// The instance type, for example `t3.medium`.
    #[serde(default)]
    #[state(default)]
    pub machine_type: String,

    /// The machine image.
    #[serde(default)]
    #[state(default)]
    pub image: String,

    /// The names of the cluster subnets the instances are placed in.
    #[serde(default)]
    pub subnets: Vec<String>,

    #[serde(default)]
    pub zones: Vec<String>,

    /// The size of the root volume in GB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_volume_size: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_volume_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_volume_iops: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_volume_optimization: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,

    /// Tags added to the cloud resources of the instance group.
    #[serde(default)]
    pub cloud_labels: BTreeMap<String, String>,

    /// Labels added to the Kubernetes nodes.
    #[serde(default)]
    pub node_labels: BTreeMap<String, String>,

    #[serde(default)]
    pub additional_security_groups: Vec<String>,

    /// Extra cloud-init parts. Filled in by the cluster manager if left empty.
    #[serde(default)]
    #[state(computed)]
    pub additional_user_data: Vec<UserData>,

    #[serde(default, rename = "associatePublicIp", skip_serializing_if = "Option::is_none")]
    pub associate_public_ip: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_instance_monitoring: Option<bool>,

    /// Load balancers the instances are registered with.
    #[serde(default)]
    #[state(rename = "external_load_balancer")]
    pub external_load_balancers: Vec<LoadBalancer>,

    #[serde(default)]
    #[state(rename = "file_asset")]
    pub file_assets: Vec<FileAssetSpec>,

    #[serde(default)]
    #[state(rename = "hook")]
    pub hooks: Vec<HookSpec>,

    /// Overrides the cluster wide kubelet configuration for this instance group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubelet: Option<KubeletConfigSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam: Option<IamProfileSpec>,
}

/// An existing load balancer, referenced by its name or by the ARN of its target group.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer_name: Option<String>,

    #[serde(default, rename = "targetGroupArn", skip_serializing_if = "Option::is_none")]
    pub target_group_arn: Option<String>,
}

/// An existing IAM instance profile used instead of the one the cluster manager creates.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IamProfileSpec {
    /// The ARN of the instance profile.
    pub profile: String,
}
