use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{duration::Duration, resource::Block};

/// Settings of the kubelet running on every instance of an instance group.
///
/// Every setting is optional. Unset settings are left out of both manifests and state, which
/// leaves the choice to the cluster manager.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KubeletConfigSpec {
    /// The address of the API server the kubelet connects to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_servers: Option<String>,

    /// Allow anonymous requests to the kubelet's server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymous_auth: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_mode: Option<String>,

    /// The kubeconfig used to request a client certificate (TLS bootstrapping).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_kubeconfig: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ca_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_cert_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_private_key_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_kubeconfig: Option<bool>,

    /// The verbosity of the kubelet's logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<i32>,

    /// The directory with static pod manifests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_manifest_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname_override: Option<String>,

    /// The image of the pause container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_infra_container_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seccomp_profile_root: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_privileged: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_debugging_handlers: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_node: Option<bool>,

    /// How often the node status is posted to the API server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_status_update_frequency: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_domain: Option<String>,

    /// The IP address of the cluster DNS service.
    #[serde(rename = "clusterDNS", skip_serializing_if = "Option::is_none")]
    pub cluster_dns: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_plugin_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubelet_cgroups: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_cgroups: Option<String>,

    /// The read-only port of the kubelet. `0` disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_cgroups: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgroup_root: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure_cbr0: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hairpin_mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub babysit_daemons: Option<bool>,

    /// The maximum number of pods on a node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pods: Option<i32>,

    #[serde(rename = "nvidiaGPUs", skip_serializing_if = "Option::is_none")]
    pub nvidia_gpus: Option<i32>,

    #[serde(rename = "podCIDR", skip_serializing_if = "Option::is_none")]
    pub pod_cidr: Option<String>,

    /// The resolver configuration used as the basis for pods' DNS settings.
    #[serde(rename = "resolvConf", skip_serializing_if = "Option::is_none")]
    pub resolver_config: Option<String>,

    #[serde(rename = "reconcileCIDR", skip_serializing_if = "Option::is_none")]
    pub reconcile_cidr: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_schedulable: Option<bool>,

    /// Pull one image at a time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialize_image_pulls: Option<bool>,

    /// Labels added to the node when it registers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub node_labels: BTreeMap<String, String>,

    #[serde(rename = "nonMasqueradeCIDR", skip_serializing_if = "Option::is_none")]
    pub non_masquerade_cidr: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_custom_metrics: Option<bool>,

    #[serde(rename = "networkPluginMTU", skip_serializing_if = "Option::is_none")]
    pub network_plugin_mtu: Option<i32>,

    /// Disk usage after which image garbage collection always runs.
    #[serde(rename = "imageGCHighThresholdPercent", skip_serializing_if = "Option::is_none")]
    pub image_gc_high_threshold_percent: Option<i32>,

    /// Disk usage below which image garbage collection never runs.
    #[serde(rename = "imageGCLowThresholdPercent", skip_serializing_if = "Option::is_none")]
    pub image_gc_low_threshold_percent: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_progress_deadline: Option<Duration>,

    /// Hard eviction thresholds, for example `memory.available<100Mi`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eviction_hard: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eviction_soft: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eviction_soft_grace_period: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eviction_pressure_transition_period: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eviction_max_pod_grace_period: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eviction_minimum_reclaim: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_plugin_directory: Option<String>,

    /// Taints added to the node when it registers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_gates: BTreeMap<String, String>,

    /// Resources reserved for Kubernetes system daemons.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub kube_reserved: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kube_reserved_cgroup: Option<String>,

    /// Resources reserved for operating system daemons.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub system_reserved: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_reserved_cgroup: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_node_allocatable: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_request_timeout: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_stats_agg_period: Option<Duration>,

    /// Fail to start if swap is enabled on the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_swap_on: Option<bool>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub experimental_allowed_unsafe_sysctls: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming_connection_idle_timeout: Option<Duration>,

    #[serde(rename = "dockerDisableSharedPID", skip_serializing_if = "Option::is_none")]
    pub docker_disable_shared_pid: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_token_webhook: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_token_webhook_cache_ttl: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;
    use crate::{
        resource::{StateProblem, Validator, Value},
        yaml,
    };

    #[test]
    fn empty_kubelet() {
        let map = KubeletConfigSpec::default().flatten_block();
        assert_eq!(
            Value::Object(map.clone()),
            json!({
                "node_labels": {},
                "taints": [],
                "feature_gates": {},
                "kube_reserved": {},
                "system_reserved": {},
                "experimental_allowed_unsafe_sysctls": [],
            })
        );
        assert_eq!(
            KubeletConfigSpec::expand_block(&map, Validator::root()).unwrap(),
            KubeletConfigSpec::default()
        );
    }

    #[test]
    fn every_setting_is_optional() {
        let resource = KubeletConfigSpec::resource();
        assert_eq!(resource.fields.len(), 67);
        assert!(resource.fields.values().all(|schema| schema.optional));
    }

    #[test]
    fn manifest_names() {
        let kubelet: KubeletConfigSpec = yaml::deserialize(indoc! {"
            clusterDNS: 100.64.0.10
            podCIDR: 100.96.0.0/11
            resolvConf: /etc/resolv.conf
            networkPluginMTU: 9001
            imageGCHighThresholdPercent: 85
            dockerDisableSharedPID: true
            maxPods: 110
            runtimeRequestTimeout: 10m
        "})
        .unwrap();

        let map = kubelet.flatten_block();
        assert_eq!(map["cluster_dns"], json!("100.64.0.10"));
        assert_eq!(map["pod_cidr"], json!("100.96.0.0/11"));
        assert_eq!(map["resolver_config"], json!("/etc/resolv.conf"));
        assert_eq!(map["network_plugin_mtu"], json!(9001));
        assert_eq!(map["image_gc_high_threshold_percent"], json!(85));
        assert_eq!(map["docker_disable_shared_pid"], json!(true));
        assert_eq!(map["max_pods"], json!(110));
        assert_eq!(map["runtime_request_timeout"], json!("10m0s"));
        assert!(!map.contains_key("anonymous_auth"));
    }

    #[test]
    fn invalid_duration() {
        let map = json!({"volume_stats_agg_period": "1 minute"});
        let err = KubeletConfigSpec::expand_block(map.as_object().unwrap(), Validator::root())
            .unwrap_err();
        assert_eq!(err.path(), "volume_stats_agg_period");
        assert!(matches!(
            err.problem(),
            StateProblem::InvalidDuration { .. }
        ));
    }
}
