use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{duration::Duration, resource::Block};

/// An etcd cluster backing the Kubernetes control plane, usually `main` and `events`.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdClusterSpec {
    pub name: String,

    #[serde(default, rename = "etcdMembers")]
    #[state(rename = "etcd_member")]
    pub members: Vec<EtcdMemberSpec>,

    /// Use TLS between etcd peers and clients.
    #[serde(default, rename = "enableEtcdTLS")]
    #[state(default)]
    pub enable_etcd_tls: bool,

    /// Require client certificates.
    #[serde(default, rename = "enableTLSAuth")]
    #[state(default)]
    pub enable_tls_auth: bool,

    #[serde(default)]
    #[state(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_election_timeout: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat_interval: Option<Duration>,

    #[serde(default)]
    #[state(default)]
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups: Option<EtcdBackupSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<EtcdManagerSpec>,
}

/// A single etcd member, running on an instance group's machines.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdMemberSpec {
    pub name: String,

    /// The instance group the member runs on.
    pub instance_group: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_iops: Option<i32>,

    /// The size of the data volume in GB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_volume: Option<bool>,
}

/// Periodic backups of an etcd cluster.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdBackupSpec {
    /// Where backups are written to, for example an S3 path.
    pub backup_store: String,

    pub image: String,
}

/// The etcd-manager sidecar that manages the etcd cluster.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdManagerSpec {
    pub image: String,
}
