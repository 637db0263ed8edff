use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{api::InstanceGroupRole, resource::Block};

/// A systemd unit run on the instances of an instance group.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpec {
    pub name: String,

    #[serde(default)]
    #[state(default)]
    pub disabled: bool,

    /// The raw systemd unit, used instead of `exec_container`.
    #[serde(default)]
    #[state(default)]
    pub manifest: String,

    /// Units that have to start after this hook.
    #[serde(default)]
    pub before: Vec<String>,

    /// Units that have to be running before this hook starts.
    #[serde(default)]
    pub requires: Vec<String>,

    /// The roles the hook is applied to. Empty means every role.
    #[serde(default)]
    pub roles: Vec<InstanceGroupRole>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_container: Option<ExecContainerAction>,
}

/// Runs a container as the hook's action.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecContainerAction {
    pub image: String,

    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

/// An additional cloud-init part added to the instances' user data.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub name: String,

    /// The MIME type of the part, for example `text/x-shellscript`.
    pub r#type: String,

    pub content: String,
}

/// A file written to the instances of an instance group.
#[derive(Block, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAssetSpec {
    pub name: String,

    /// The absolute path of the file on the instance.
    pub path: String,

    pub content: String,

    /// `content` is base64 encoded.
    #[serde(default)]
    #[state(default)]
    pub is_base64: bool,

    /// The roles the file is written for. Empty means every role.
    #[serde(default)]
    pub roles: Vec<InstanceGroupRole>,
}
