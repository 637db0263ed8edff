//! Schema declarations of every configuration block.
//!
//! Each `schema_*` function returns the attribute schema the block is declared with inside its
//! parent block. The declarations are generated from the API types, so they always describe what
//! [`flatten`](crate::flatten) produces and what [`expand`](crate::expand) accepts.
use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::{
    api::{
        Cluster, ClusterSpec, ClusterSubnetSpec, EtcdClusterSpec, EtcdMemberSpec,
        ExecContainerAction, FileAssetSpec, HookSpec, IamProfileSpec, InstanceGroup,
        InstanceGroupSpec, KubeletConfigSpec, LoadBalancer, Networking, TopologySpec, UserData,
    },
    resource::{Attribute, Block, ResourceSchema, Schema, field_schema},
};

fn nested<T: Attribute>() -> Schema {
    field_schema::<T>(false, false, None)
}

pub fn schema_string_required() -> Schema {
    Schema::string().required()
}

pub fn schema_string_optional() -> Schema {
    Schema::string().optional()
}

/// An optional string that is filled in by the cluster manager when it is not set.
pub fn schema_string_computed() -> Schema {
    Schema::string().optional().computed()
}

pub fn schema_int_optional() -> Schema {
    Schema::integer().optional()
}

pub fn schema_bool_optional() -> Schema {
    Schema::boolean().optional()
}

pub fn schema_string_list_optional() -> Schema {
    nested::<Vec<String>>()
}

pub fn schema_string_map_optional() -> Schema {
    nested::<BTreeMap<String, String>>()
}

pub fn resource_cluster() -> ResourceSchema {
    Cluster::resource()
}

pub fn resource_instance_group() -> ResourceSchema {
    InstanceGroup::resource()
}

pub fn schema_object_meta() -> Schema {
    nested::<ObjectMeta>()
}

pub fn schema_cluster_spec() -> Schema {
    nested::<ClusterSpec>()
}

/// A required singleton block with the `name` of the selected provider.
pub fn schema_networking_spec() -> Schema {
    nested::<Networking>()
}

pub fn schema_cluster_subnet() -> Schema {
    nested::<Vec<ClusterSubnetSpec>>()
}

pub fn schema_cluster_topology() -> Schema {
    nested::<Option<TopologySpec>>()
}

pub fn schema_etcd_cluster() -> Schema {
    nested::<Vec<EtcdClusterSpec>>()
}

pub fn schema_etcd_member() -> Schema {
    nested::<Vec<EtcdMemberSpec>>()
}

pub fn schema_instance_group_spec() -> Schema {
    nested::<InstanceGroupSpec>()
}

pub fn schema_kubelet_spec() -> Schema {
    nested::<Option<KubeletConfigSpec>>()
}

pub fn schema_hook() -> Schema {
    nested::<Vec<HookSpec>>()
}

pub fn schema_exec_container() -> Schema {
    nested::<Option<ExecContainerAction>>()
}

/// Additional user data is computed: the cluster manager fills it in when it is left empty.
pub fn schema_user_data() -> Schema {
    field_schema::<Vec<UserData>>(false, true, None)
}

pub fn schema_iam_profile_spec() -> Schema {
    nested::<Option<IamProfileSpec>>()
}

pub fn schema_load_balancer() -> Schema {
    nested::<Vec<LoadBalancer>>()
}

pub fn schema_file_asset() -> Schema {
    nested::<Vec<FileAssetSpec>>()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::resource::{Elem, ValueType};

    /// The schema `parent` declares for `key`, without its description.
    fn declared(parent: &ResourceSchema, key: &str) -> Schema {
        let mut schema = parent.get(key).cloned().unwrap();
        schema.description = None;
        schema
    }

    #[rstest]
    #[case(resource_cluster(), "metadata", schema_object_meta())]
    #[case(resource_cluster(), "spec", schema_cluster_spec())]
    #[case(resource_instance_group(), "spec", schema_instance_group_spec())]
    #[case(ClusterSpec::resource(), "networking", schema_networking_spec())]
    #[case(ClusterSpec::resource(), "subnet", schema_cluster_subnet())]
    #[case(ClusterSpec::resource(), "topology", schema_cluster_topology())]
    #[case(ClusterSpec::resource(), "etcd_cluster", schema_etcd_cluster())]
    #[case(ClusterSpec::resource(), "ssh_access", schema_string_list_optional())]
    #[case(ClusterSpec::resource(), "additional_policies", schema_string_map_optional())]
    #[case(EtcdClusterSpec::resource(), "etcd_member", schema_etcd_member())]
    #[case(InstanceGroupSpec::resource(), "kubelet", schema_kubelet_spec())]
    #[case(InstanceGroupSpec::resource(), "hook", schema_hook())]
    #[case(InstanceGroupSpec::resource(), "additional_user_data", schema_user_data())]
    #[case(InstanceGroupSpec::resource(), "iam", schema_iam_profile_spec())]
    #[case(InstanceGroupSpec::resource(), "external_load_balancer", schema_load_balancer())]
    #[case(InstanceGroupSpec::resource(), "file_asset", schema_file_asset())]
    #[case(InstanceGroupSpec::resource(), "min_size", schema_int_optional())]
    #[case(InstanceGroupSpec::resource(), "associate_public_ip", schema_bool_optional())]
    #[case(HookSpec::resource(), "exec_container", schema_exec_container())]
    #[case(KubeletConfigSpec::resource(), "feature_gates", schema_string_map_optional())]
    #[case(KubeletConfigSpec::resource(), "api_servers", schema_string_optional())]
    #[case(ExecContainerAction::resource(), "image", schema_string_required())]
    fn declared_in_parent(
        #[case] parent: ResourceSchema,
        #[case] key: &str,
        #[case] expected: Schema,
    ) {
        assert_eq!(declared(&parent, key), expected);
    }

    #[test]
    fn user_data() {
        assert_eq!(
            serde_json::to_value(schema_user_data()).unwrap(),
            json!({
                "type": "list",
                "optional": true,
                "computed": true,
                "elem": {
                    "resource": {
                        "description": "An additional cloud-init part added to the instances' user data.",
                        "fields": {
                            "name": {"type": "string", "required": true},
                            "type": {
                                "type": "string",
                                "required": true,
                                "description": "The MIME type of the part, for example `text/x-shellscript`.",
                            },
                            "content": {"type": "string", "required": true},
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn iam_profile() {
        let schema = schema_iam_profile_spec();
        assert_eq!(schema.value_type, ValueType::List);
        assert!(schema.optional);
        assert_eq!(schema.max_items, Some(1));

        let Some(Elem::Resource(resource)) = &schema.elem else {
            panic!("iam profile must be a nested block");
        };
        assert_eq!(resource.fields.keys().collect::<Vec<_>>(), ["profile"]);
        assert!(resource.get("profile").unwrap().required);
    }

    #[test]
    fn singleton_blocks() {
        for schema in [
            schema_object_meta(),
            schema_cluster_spec(),
            schema_networking_spec(),
            schema_cluster_topology(),
            schema_instance_group_spec(),
            schema_kubelet_spec(),
            schema_exec_container(),
        ] {
            assert_eq!(schema.max_items, Some(1));
        }
        for schema in [
            schema_cluster_subnet(),
            schema_etcd_cluster(),
            schema_etcd_member(),
            schema_hook(),
            schema_load_balancer(),
            schema_file_asset(),
        ] {
            assert_eq!(schema.max_items, None);
            assert!(schema.optional);
        }
    }

    #[test]
    fn object_meta() {
        let Some(Elem::Resource(meta)) = schema_object_meta().elem else {
            panic!("metadata must be a nested block");
        };
        assert_eq!(meta.get("name"), Some(&schema_string_required()));
        assert_eq!(
            meta.get("creation_timestamp"),
            Some(&schema_string_computed())
        );
    }
}
