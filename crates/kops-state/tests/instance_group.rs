use indoc::indoc;
use kops_state::{
    api::{InstanceGroup, InstanceGroupRole, Manifest},
    expand::expand_instance_group,
    flatten::{flatten_hooks, flatten_instance_group},
    resource::{StateMap, StateProblem},
    schema::resource_instance_group,
    yaml,
};
use serde_json::json;

const INSTANCE_GROUP: &str = indoc! {"
    apiVersion: kops.k8s.io/v1alpha2
    kind: InstanceGroup
    metadata:
      name: master-eu-west-1a
    spec:
      role: Master
      image: kope.io/k8s-1.12-debian-stretch-amd64-hvm-ebs-2019-05-13
      machineType: m5.large
      minSize: 1
      maxSize: 1
      rootVolumeSize: 64
      rootVolumeOptimization: true
      subnets:
      - eu-west-1a
      cloudLabels:
        team: infra
      nodeLabels:
        kops.k8s.io/instancegroup: master-eu-west-1a
      additionalSecurityGroups:
      - sg-0123456789abcdef0
      additionalUserData:
      - name: ntp.sh
        type: text/x-shellscript
        content: |
          #!/bin/sh
          systemctl restart chronyd
      associatePublicIp: false
      externalLoadBalancers:
      - loadBalancerName: api-internal
      - targetGroupArn: arn:aws:elasticloadbalancing:eu-west-1:123456789012:targetgroup/api/6d0ecf831eec9f09
      fileAssets:
      - name: audit-policy
        path: /srv/kubernetes/audit.yaml
        roles:
        - Master
        content: |
          apiVersion: audit.k8s.io/v1
          kind: Policy
      hooks:
      - name: disable-transparent-hugepages.service
        before:
        - docker.service
        roles:
        - Master
        - Node
        execContainer:
          image: busybox
          command:
          - sh
          - -c
          - echo never > /sys/kernel/mm/transparent_hugepage/enabled
      - name: update-ca.service
        manifest: |
          Type=oneshot
          ExecStart=/usr/sbin/update-ca-certificates
      kubelet:
        anonymousAuth: false
        maxPods: 50
        evictionHard: memory.available<250Mi
        featureGates:
          ExpandPersistentVolumes: \"true\"
        streamingConnectionIdleTimeout: 30m
      iam:
        profile: arn:aws:iam::123456789012:instance-profile/masters
"};

fn instance_group() -> InstanceGroup {
    let manifest: Manifest<InstanceGroup> = yaml::deserialize(INSTANCE_GROUP).unwrap();
    manifest.into_object().unwrap()
}

#[test]
fn flatten_manifest() {
    let state = flatten_instance_group(&instance_group());
    let spec = &state["spec"][0];

    assert_eq!(spec["role"], json!("Master"));
    assert_eq!(spec["root_volume_size"], json!(64));
    assert_eq!(spec["associate_public_ip"], json!(false));
    assert!(spec.get("root_volume_iops").is_none());
    assert!(spec.get("detailed_instance_monitoring").is_none());
    assert_eq!(spec["cloud_labels"], json!({"team": "infra"}));
    assert_eq!(
        spec["external_load_balancer"],
        json!([
            {"load_balancer_name": "api-internal"},
            {"target_group_arn": "arn:aws:elasticloadbalancing:eu-west-1:123456789012:targetgroup/api/6d0ecf831eec9f09"},
        ])
    );
    assert_eq!(spec["file_asset"][0]["roles"], json!(["Master"]));
    assert_eq!(spec["file_asset"][0]["is_base64"], json!(false));
    assert_eq!(
        spec["iam"],
        json!([{"profile": "arn:aws:iam::123456789012:instance-profile/masters"}])
    );

    let hooks = spec["hook"].as_array().unwrap();
    assert_eq!(hooks.len(), 2);
    assert_eq!(hooks[0]["exec_container"][0]["image"], json!("busybox"));
    assert!(hooks[1].get("exec_container").is_none());

    let kubelet = &spec["kubelet"][0];
    assert_eq!(kubelet["anonymous_auth"], json!(false));
    assert_eq!(kubelet["max_pods"], json!(50));
    assert_eq!(kubelet["streaming_connection_idle_timeout"], json!("30m0s"));
    assert_eq!(kubelet["feature_gates"], json!({"ExpandPersistentVolumes": "true"}));
    assert!(kubelet.get("log_level").is_none());
}

#[test]
fn flatten_output_matches_schema() {
    let state = flatten_instance_group(&instance_group());
    resource_instance_group().validate(&state).unwrap();

    let minimal = flatten_instance_group(&InstanceGroup::default());
    resource_instance_group().validate(&minimal).unwrap();
}

#[test]
fn round_trip() {
    let original = instance_group();
    let state = flatten_instance_group(&original);
    let expanded = expand_instance_group(&state).unwrap();

    assert_eq!(expanded, original);
    assert_eq!(flatten_instance_group(&expanded), state);
}

#[test]
fn hooks_in_order() {
    let hooks = flatten_hooks(&instance_group().spec.hooks);
    let names = hooks
        .iter()
        .map(|hook| hook["name"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        ["disable-transparent-hugepages.service", "update-ca.service"]
    );
}

#[test]
fn expand_reports_path() {
    let state: StateMap = serde_json::from_value(json!({
        "metadata": [{"name": "nodes"}],
        "spec": [{
            "role": "Node",
            "hook": [
                {"name": "a.service"},
                {"name": "b.service", "roles": ["Node", "Gateway"]},
            ],
        }],
    }))
    .unwrap();

    let err = expand_instance_group(&state).unwrap_err();
    assert_eq!(err.path(), "spec.0.hook.1.roles.1");
    assert!(matches!(
        err.problem(),
        StateProblem::UnknownVariant { .. }
    ));
    assert_eq!(
        err.problem().to_string(),
        "unknown value \"Gateway\", expected one of: Master, Node, Bastion"
    );
}

#[test]
fn expand_defaults() {
    let state: StateMap = serde_json::from_value(json!({
        "metadata": [{"name": "bastions"}],
        "spec": [{"role": "Bastion", "kubelet": []}],
    }))
    .unwrap();

    let instance_group = expand_instance_group(&state).unwrap();
    assert_eq!(instance_group.spec.role, InstanceGroupRole::Bastion);
    assert_eq!(instance_group.spec.kubelet, None);
    assert_eq!(instance_group.spec.min_size, None);
    assert!(instance_group.spec.hooks.is_empty());
    assert!(instance_group.spec.machine_type.is_empty());
}
