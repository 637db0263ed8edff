//! Converts state back into API objects, the inverse of [`flatten`](crate::flatten).
//!
//! Absent optional fields expand to `None`, absent lists and maps to empty collections and empty
//! optional singleton blocks to `None`. A missing required field, a value of the wrong type or an
//! unknown enum value is reported as a [`StateError`] naming the offending attribute.
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::instrument;

use crate::{
    api::{
        Cluster, ClusterSpec, ClusterSubnetSpec, EtcdClusterSpec, ExecContainerAction,
        FileAssetSpec, HookSpec, IamProfileSpec, InstanceGroup, InstanceGroupSpec,
        KubeletConfigSpec, LoadBalancer, Networking, TopologySpec, UserData,
    },
    resource::{Block, StateError, StateMap, Validator, expand_many, expand_one},
};

/// Expands the state of a cluster resource.
#[instrument(level = "debug", skip_all)]
pub fn expand_cluster(state: &StateMap) -> Result<Cluster, StateError> {
    let cluster = Cluster::expand_block(state, Validator::root())?;
    tracing::debug!(
        cluster = cluster.metadata.name.as_deref(),
        networking = %cluster.spec.networking.provider(),
        "expanded cluster"
    );
    Ok(cluster)
}

/// Expands the state of an instance group resource.
#[instrument(level = "debug", skip_all)]
pub fn expand_instance_group(state: &StateMap) -> Result<InstanceGroup, StateError> {
    let instance_group = InstanceGroup::expand_block(state, Validator::root())?;
    tracing::debug!(
        instance_group = instance_group.metadata.name.as_deref(),
        role = %instance_group.spec.role,
        "expanded instance group"
    );
    Ok(instance_group)
}

pub fn expand_object_meta(state: &[StateMap]) -> Result<ObjectMeta, StateError> {
    expand_one(state, Validator::root())
}

pub fn expand_cluster_spec(state: &[StateMap]) -> Result<ClusterSpec, StateError> {
    expand_one(state, Validator::root())
}

/// Selects the provider named by the block, with its default settings.
pub fn expand_networking_spec(state: &[StateMap]) -> Result<Networking, StateError> {
    expand_one(state, Validator::root())
}

pub fn expand_cluster_subnets(state: &[StateMap]) -> Result<Vec<ClusterSubnetSpec>, StateError> {
    expand_many(state, Validator::root())
}

pub fn expand_cluster_topology(state: &[StateMap]) -> Result<TopologySpec, StateError> {
    expand_one(state, Validator::root())
}

pub fn expand_etcd_cluster_specs(
    state: &[StateMap],
) -> Result<Vec<EtcdClusterSpec>, StateError> {
    expand_many(state, Validator::root())
}

pub fn expand_instance_group_spec(state: &[StateMap]) -> Result<InstanceGroupSpec, StateError> {
    expand_one(state, Validator::root())
}

pub fn expand_kubelet_spec(state: &[StateMap]) -> Result<KubeletConfigSpec, StateError> {
    expand_one(state, Validator::root())
}

pub fn expand_hooks(state: &[StateMap]) -> Result<Vec<HookSpec>, StateError> {
    expand_many(state, Validator::root())
}

pub fn expand_exec_container(state: &[StateMap]) -> Result<ExecContainerAction, StateError> {
    expand_one(state, Validator::root())
}

pub fn expand_additional_user_data(state: &[StateMap]) -> Result<Vec<UserData>, StateError> {
    expand_many(state, Validator::root())
}

pub fn expand_external_load_balancers(
    state: &[StateMap],
) -> Result<Vec<LoadBalancer>, StateError> {
    expand_many(state, Validator::root())
}

pub fn expand_file_assets(state: &[StateMap]) -> Result<Vec<FileAssetSpec>, StateError> {
    expand_many(state, Validator::root())
}

pub fn expand_iam_profile_spec(state: &[StateMap]) -> Result<IamProfileSpec, StateError> {
    expand_one(state, Validator::root())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        api::{CalicoNetworkingSpec, NetworkingProvider},
        flatten::{flatten_etcd_cluster_specs, flatten_networking_spec},
        resource::{StateProblem, state_map},
    };

    fn maps(value: Value) -> Vec<StateMap> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => map,
                    other => panic!("expected a map, got {other}"),
                })
                .collect(),
            other => panic!("expected a list, got {other}"),
        }
    }

    #[test]
    fn etcd_round_trip() {
        let state = maps(json!([
            {
                "name": "main",
                "etcd_member": [
                    {"name": "a", "instance_group": "master-1", "volume_size": 20},
                    {"name": "b", "instance_group": "master-2", "encrypted_volume": true},
                ],
                "enable_etcd_tls": true,
                "enable_tls_auth": false,
                "version": "3.2.24",
                "heartbeat_interval": "250ms",
                "image": "",
            },
            {
                "name": "events",
                "etcd_member": [],
                "enable_etcd_tls": false,
                "enable_tls_auth": false,
                "version": "",
                "image": "",
                "manager": [{"image": "kopeio/etcd-manager:3.0.20190516"}],
            },
        ]));

        let etcd_clusters = expand_etcd_cluster_specs(&state).unwrap();
        assert_eq!(etcd_clusters[0].members[1].encrypted_volume, Some(true));
        assert_eq!(etcd_clusters[0].leader_election_timeout, None);
        assert_eq!(flatten_etcd_cluster_specs(&etcd_clusters), state);
    }

    #[test]
    fn missing_instance_group() {
        let state = maps(json!([{"name": "main", "etcd_member": [{"name": "a"}]}]));
        let err = expand_etcd_cluster_specs(&state).unwrap_err();
        assert_eq!(err.path(), "0.etcd_member.0.instance_group");
        assert!(matches!(err.problem(), StateProblem::FieldRequired));
    }

    #[rstest]
    #[case("calico", NetworkingProvider::Calico)]
    #[case("amazonvpc", NetworkingProvider::AmazonVpc)]
    #[case("external", NetworkingProvider::External)]
    fn networking(#[case] name: &str, #[case] provider: NetworkingProvider) {
        let state = vec![state_map([("name", json!(name))])];
        let networking = expand_networking_spec(&state).unwrap();
        assert_eq!(networking.provider(), provider);
        assert_eq!(flatten_networking_spec(&networking), state);
    }

    #[test]
    fn networking_settings_are_defaulted() {
        let state = vec![state_map([("name", json!("calico"))])];
        assert_eq!(
            expand_networking_spec(&state).unwrap(),
            Networking::Calico(CalicoNetworkingSpec::default())
        );
    }

    #[test]
    fn singleton_needs_exactly_one_map() {
        let err = expand_iam_profile_spec(&[]).unwrap_err();
        assert!(matches!(err.problem(), StateProblem::FieldRequired));

        let state = maps(json!([{"profile": "a"}, {"profile": "b"}]));
        let err = expand_iam_profile_spec(&state).unwrap_err();
        assert!(matches!(
            err.problem(),
            StateProblem::TooManyItems { max: 1, found: 2 }
        ));
    }

    #[test]
    fn load_balancers() {
        let state = maps(json!([
            {"load_balancer_name": "ingress"},
            {"target_group_arn": "arn:aws:elasticloadbalancing:eu-west-1:123456789012:targetgroup/api/1"},
        ]));
        let load_balancers = expand_external_load_balancers(&state).unwrap();
        assert_eq!(load_balancers[0].load_balancer_name.as_deref(), Some("ingress"));
        assert_eq!(load_balancers[0].target_group_arn, None);
        assert_eq!(load_balancers[1].load_balancer_name, None);
    }

    #[test]
    fn hooks_and_containers() {
        let state = maps(json!([{
            "name": "fix-dns.service",
            "roles": ["Master", "Node"],
            "exec_container": [{"image": "busybox", "command": ["true"]}],
        }]));
        let hooks = expand_hooks(&state).unwrap();
        assert_eq!(hooks.len(), 1);
        assert!(!hooks[0].disabled);
        assert_eq!(hooks[0].roles.len(), 2);

        let action = expand_exec_container(&maps(json!([{"image": "busybox"}]))).unwrap();
        assert!(action.command.is_empty());
        assert!(action.environment.is_empty());
    }

    #[test]
    fn kubelet_and_spec() {
        let kubelet = expand_kubelet_spec(&maps(json!([{
            "max_pods": 110,
            "eviction_pressure_transition_period": "5m0s",
        }])))
        .unwrap();
        assert_eq!(kubelet.max_pods, Some(110));
        assert_eq!(
            kubelet
                .eviction_pressure_transition_period
                .map(|period| period.as_secs()),
            Some(300)
        );

        let spec = expand_instance_group_spec(&maps(json!([{
            "role": "Master",
            "kubelet": [{"anonymous_auth": false}],
        }])))
        .unwrap();
        assert_eq!(
            spec.kubelet.and_then(|kubelet| kubelet.anonymous_auth),
            Some(false)
        );
    }

    #[test]
    fn user_data_and_file_assets() {
        let user_data = expand_additional_user_data(&maps(json!([
            {"name": "a.sh", "type": "text/x-shellscript", "content": "echo a"},
        ])))
        .unwrap();
        assert_eq!(user_data[0].r#type, "text/x-shellscript");

        let err = expand_file_assets(&maps(json!([{"name": "motd", "path": "/etc/motd"}])))
            .unwrap_err();
        assert_eq!(err.path(), "0.content");
    }

    #[test]
    fn cluster_blocks() {
        let metadata = expand_object_meta(&maps(json!([{"name": "example.k8s.local"}]))).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("example.k8s.local"));

        let topology = expand_cluster_topology(&maps(json!([{
            "masters": "public",
            "nodes": "public",
            "dns": [{"type": "Public"}],
        }])))
        .unwrap();
        assert_eq!(topology.bastion, None);

        let subnets = expand_cluster_subnets(&maps(json!([
            {"name": "eu-west-1a", "type": "Public"},
            {"name": "eu-west-1b", "type": "Private", "cidr": "172.20.64.0/19"},
        ])))
        .unwrap();
        assert_eq!(subnets[1].cidr, "172.20.64.0/19");
        assert_eq!(subnets[0].zone, "");

        let spec = expand_cluster_spec(&maps(json!([{
            "cloud_provider": "aws",
            "kubernetes_version": "1.12.7",
            "networking": [{"name": "kubenet"}],
        }])))
        .unwrap();
        assert_eq!(spec.networking, Networking::default());
        assert!(spec.topology.is_none());
    }
}
