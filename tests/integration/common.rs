//! Shared fixtures: a release and deployment modeled on a database /
//! api-server topology with static and dynamic networks.

use deplink::deployment::DeploymentTopology;
use deplink::release::ReleaseMetadata;

/// Release metadata used by every scenario.
pub fn releases_yaml() -> &'static str {
    r#"
- name: bosh-release
  jobs:
    - name: database
      provides:
        - name: db
          type: db
          properties: [a, b, c, nested.one, nested.two, nested.three, test]
          defaults:
            a: default_a
            c: default_c
            nested:
              one: default_nested.one
              two: default_nested.two
    - name: backup_database
      provides:
        - name: backup_db
          type: db
    - name: mongo_db
      provides:
        - name: read_only_db
          type: db
    - name: api_server
      consumes:
        - name: db
          type: db
        - name: backup_db
          type: db
    - name: api_server_with_optional_db_link
      consumes:
        - name: db
          type: db
          optional: true
"#
}

/// The happy-path deployment: an api server consuming a two-instance
/// mysql provider (dynamic default network) and a one-instance postgres
/// backup provider (static network).
pub fn scenario_topology_yaml() -> &'static str {
    r#"
name: simple
instance_groups:
  - name: my_api
    azs: [z1]
    networks:
      - name: default
        type: static
    instances:
      - id: api-uuid-0
        index: 0
        az: z1
        static_ips:
          default: 192.168.1.2
    jobs:
      - name: api_server
        consumes:
          db:
            from: db
          backup_db:
            from: backup_db
  - name: mysql
    azs: [z1]
    networks:
      - name: default
        type: static
      - name: dynamic-network
        type: dynamic
        default: true
        az: z1
    instances:
      - id: mysql-uuid-0
        index: 0
        az: z1
        static_ips:
          default: 192.168.1.10
      - id: mysql-uuid-1
        index: 1
        az: z1
        static_ips:
          default: 192.168.1.11
    jobs:
      - name: database
  - name: postgres
    azs: [z1]
    networks:
      - name: default
        type: static
    instances:
      - id: postgres-uuid-0
        index: 0
        az: z1
        static_ips:
          default: 192.168.1.12
    jobs:
      - name: backup_database
"#
}

pub fn releases() -> Vec<ReleaseMetadata> {
    serde_yaml::from_str(releases_yaml()).expect("release fixture parses")
}

pub fn scenario_topology() -> DeploymentTopology {
    serde_yaml::from_str(scenario_topology_yaml()).expect("topology fixture parses")
}

pub fn topology(yaml: &str) -> DeploymentTopology {
    serde_yaml::from_str(yaml).expect("topology parses")
}
