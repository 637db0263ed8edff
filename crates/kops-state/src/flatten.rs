//! Converts API objects into state.
//!
//! Singleton blocks flatten to a list holding exactly one map, repeated blocks to one map per
//! element in their original order. Unset optional fields are left out of the maps. Flattening
//! never fails.
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::instrument;

use crate::{
    api::{
        Cluster, ClusterSpec, ClusterSubnetSpec, EtcdClusterSpec, ExecContainerAction,
        FileAssetSpec, HookSpec, IamProfileSpec, InstanceGroup, InstanceGroupSpec,
        KubeletConfigSpec, LoadBalancer, Networking, TopologySpec, UserData,
    },
    resource::{Block, StateMap, flatten_many, flatten_one},
};

/// Flattens a cluster into the state of a cluster resource.
#[instrument(level = "debug", skip_all, fields(cluster = cluster.metadata.name.as_deref()))]
pub fn flatten_cluster(cluster: &Cluster) -> StateMap {
    let state = cluster.flatten_block();
    tracing::debug!(
        subnets = cluster.spec.subnets.len(),
        etcd_clusters = cluster.spec.etcd_clusters.len(),
        "flattened cluster"
    );
    state
}

/// Flattens an instance group into the state of an instance group resource.
#[instrument(level = "debug", skip_all, fields(instance_group = instance_group.metadata.name.as_deref()))]
pub fn flatten_instance_group(instance_group: &InstanceGroup) -> StateMap {
    let state = instance_group.flatten_block();
    tracing::debug!(
        role = %instance_group.spec.role,
        hooks = instance_group.spec.hooks.len(),
        "flattened instance group"
    );
    state
}

pub fn flatten_object_meta(metadata: &ObjectMeta) -> Vec<StateMap> {
    flatten_one(metadata)
}

pub fn flatten_cluster_spec(spec: &ClusterSpec) -> Vec<StateMap> {
    flatten_one(spec)
}

/// Flattens the selected provider to `[{"name": <provider>}]`.
pub fn flatten_networking_spec(networking: &Networking) -> Vec<StateMap> {
    flatten_one(networking)
}

pub fn flatten_cluster_subnets(subnets: &[ClusterSubnetSpec]) -> Vec<StateMap> {
    flatten_many(subnets)
}

pub fn flatten_cluster_topology(topology: &TopologySpec) -> Vec<StateMap> {
    flatten_one(topology)
}

pub fn flatten_etcd_cluster_specs(etcd_clusters: &[EtcdClusterSpec]) -> Vec<StateMap> {
    flatten_many(etcd_clusters)
}

pub fn flatten_instance_group_spec(spec: &InstanceGroupSpec) -> Vec<StateMap> {
    flatten_one(spec)
}

pub fn flatten_kubelet_spec(kubelet: &KubeletConfigSpec) -> Vec<StateMap> {
    flatten_one(kubelet)
}

pub fn flatten_hooks(hooks: &[HookSpec]) -> Vec<StateMap> {
    flatten_many(hooks)
}

pub fn flatten_exec_container(action: &ExecContainerAction) -> Vec<StateMap> {
    flatten_one(action)
}

pub fn flatten_additional_user_data(user_data: &[UserData]) -> Vec<StateMap> {
    flatten_many(user_data)
}

pub fn flatten_external_load_balancers(load_balancers: &[LoadBalancer]) -> Vec<StateMap> {
    flatten_many(load_balancers)
}

pub fn flatten_file_assets(file_assets: &[FileAssetSpec]) -> Vec<StateMap> {
    flatten_many(file_assets)
}

pub fn flatten_iam_profile_spec(iam: &IamProfileSpec) -> Vec<StateMap> {
    flatten_one(iam)
}
