//! End-to-end resolution scenarios over the public API.

use deplink::core::{ErrorKind, ResolveWarning};
use deplink::resolver::{ConsumerId, LinkResolver, Outcome, Resolution};

use super::common::{releases, scenario_topology, topology};

fn resolve_ok(topo: &deplink::deployment::DeploymentTopology) -> Resolution {
    match LinkResolver::new().resolve(topo, &releases()).expect("valid input") {
        Outcome::Resolved(resolution) => resolution,
        Outcome::Failed(report) => panic!("unexpected failure:\n{report}"),
    }
}

fn resolve_failed(
    topo: &deplink::deployment::DeploymentTopology,
) -> deplink::diagnostics::FailureReport {
    match LinkResolver::new().resolve(topo, &releases()).expect("valid input") {
        Outcome::Resolved(_) => panic!("expected failure"),
        Outcome::Failed(report) => report,
    }
}

fn consumer(group: &str, job: &str, link: &str) -> ConsumerId {
    ConsumerId {
        instance_group: group.to_string(),
        job: job.to_string(),
        link_name: link.to_string(),
    }
}

#[test]
fn renders_link_data_for_static_and_dynamic_providers() {
    let resolution = resolve_ok(&scenario_topology());

    // Main db: mysql's default network is dynamic, so addresses are DNS names.
    let main = &resolution.links[&consumer("my_api", "api_server", "db")];
    assert_eq!(main.instances.len(), 2);
    assert_eq!(main.instances[0].id.as_deref(), Some("mysql-uuid-0"));
    assert_eq!(main.instances[0].name, "mysql");
    assert_eq!(main.instances[0].index, 0);
    assert_eq!(main.instances[0].address, "mysql-uuid-0.mysql.dynamic-network.simple.bosh");
    assert_eq!(main.instances[1].address, "mysql-uuid-1.mysql.dynamic-network.simple.bosh");

    // Backup db: postgres has a single static network, so addresses are IPs.
    let backup = &resolution.links[&consumer("my_api", "api_server", "backup_db")];
    assert_eq!(backup.instances.len(), 1);
    assert_eq!(backup.instances[0].name, "postgres");
    assert_eq!(backup.instances[0].index, 0);
    assert_eq!(backup.instances[0].az.as_deref(), Some("z1"));
    assert_eq!(backup.instances[0].address, "192.168.1.12");
}

#[test]
fn provider_defaults_merge_into_resolved_properties() {
    let mut topo = scenario_topology();
    // Supply one nested key; the other two retain their spec defaults.
    topo.instance_groups[1].jobs[0].properties =
        serde_json::json!({"b": "value_b", "nested": {"three": "bar"}});

    let resolution = resolve_ok(&topo);
    let properties = &resolution.links[&consumer("my_api", "api_server", "db")].properties;
    assert_eq!(properties["a"], "default_a");
    assert_eq!(properties["b"], "value_b");
    assert_eq!(properties["c"], "default_c");
    assert_eq!(
        properties["nested"],
        serde_json::json!({
            "one": "default_nested.one",
            "two": "default_nested.two",
            "three": "bar"
        })
    );
}

#[test]
fn resolution_is_deterministic_across_runs() {
    let topo = scenario_topology();
    let first = resolve_ok(&topo);
    let second = resolve_ok(&topo);
    let first_json = serde_json::to_string(&first.render_context()).unwrap();
    let second_json = serde_json::to_string(&second.render_context()).unwrap();
    assert_eq!(first_json, second_json);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn two_implicit_providers_of_same_type_reject_the_deployment() {
    let topo = topology(
        r#"
name: simple
instance_groups:
  - name: my_api
    networks: [{name: default, type: static}]
    instances:
      - {id: api-0, index: 0, static_ips: {default: 192.168.1.2}}
    jobs:
      - name: api_server
  - name: mysql
    networks: [{name: default, type: static}]
    instances:
      - {id: mysql-0, index: 0, static_ips: {default: 192.168.1.10}}
    jobs:
      - name: database
  - name: postgres
    networks: [{name: default, type: static}]
    instances:
      - {id: postgres-0, index: 0, static_ips: {default: 192.168.1.12}}
    jobs:
      - name: backup_database
"#,
    );
    let report = resolve_failed(&topo);
    assert!(report.errors.iter().any(|e| e.kind() == ErrorKind::AmbiguousProvider));
    assert!(report.to_string().starts_with(
        "Failed to resolve links from deployment 'simple'. See errors below:"
    ));
}

#[test]
fn aliased_provider_resolves_via_alias_and_not_bare_name() {
    let base = r#"
name: simple
instance_groups:
  - name: aliased_postgres
    networks: [{name: default, type: static}]
    instances:
      - {id: pg-0, index: 0, az: z1, static_ips: {default: 192.168.1.12}}
    jobs:
      - name: backup_database
        provides:
          backup_db:
            as: link_alias
  - name: my_api
    networks: [{name: default, type: static}]
    instances:
      - {id: api-0, index: 0, static_ips: {default: 192.168.1.2}}
    jobs:
      - name: api_server
        consumes:
          db:
            from: link_alias
          backup_db:
            from: FROM_REF
"#;

    // Via the alias both consumers resolve.
    let resolution = resolve_ok(&topology(&base.replace("FROM_REF", "link_alias")));
    let backup = &resolution.links[&consumer("my_api", "api_server", "backup_db")];
    assert_eq!(backup.instances[0].address, "192.168.1.12");

    // Via the bare declared name the reference finds nothing.
    let report = resolve_failed(&topology(&base.replace("FROM_REF", "backup_db")));
    assert!(report.to_string().contains(
        "Can't resolve link 'backup_db' with type 'db' for job 'api_server' in instance group 'my_api' in deployment 'simple'"
    ));
}

#[test]
fn optional_consumer_with_no_provider_resolves_to_nothing() {
    let topo = topology(
        r#"
name: simple
instance_groups:
  - name: lonely
    networks: [{name: default, type: static}]
    instances:
      - {id: lonely-0, index: 0, static_ips: {default: 192.168.1.2}}
    jobs:
      - name: api_server_with_optional_db_link
"#,
    );
    let resolution = resolve_ok(&topo);
    assert!(resolution.links.is_empty());
    assert!(resolution.warnings.is_empty());
}

#[test]
fn recreated_instance_changes_only_its_own_record() {
    let topo = scenario_topology();
    let before = resolve_ok(&topo);

    let mut recreated = topo.clone();
    recreated.instance_groups[1].instances[1].id = "mysql-uuid-1-new".to_string();
    let after = resolve_ok(&recreated);

    let id = consumer("my_api", "api_server", "db");
    let (before_main, after_main) = (&before.links[&id], &after.links[&id]);
    assert_eq!(before_main.instances.len(), after_main.instances.len());
    assert_eq!(before_main.instances[0], after_main.instances[0]);
    assert_eq!(after_main.instances[1].id.as_deref(), Some("mysql-uuid-1-new"));
    assert_eq!(
        after_main.instances[1].address,
        "mysql-uuid-1-new.mysql.dynamic-network.simple.bosh"
    );
    assert_eq!(before_main.instances[1].index, after_main.instances[1].index);

    // The untouched backup link is byte-identical.
    let backup = consumer("my_api", "api_server", "backup_db");
    assert_eq!(before.links[&backup], after.links[&backup]);
}

#[test]
fn unknown_manifest_references_warn_but_do_not_fail() {
    let mut topo = scenario_topology();
    topo.instance_groups[0].jobs[0]
        .consumes
        .insert("link_that_does_not_exist".to_string(), Default::default());

    let resolution = resolve_ok(&topo);
    // Other links on the same job still resolve.
    assert!(resolution.links.contains_key(&consumer("my_api", "api_server", "db")));
    assert_eq!(
        resolution.warnings,
        vec![ResolveWarning::UnknownConsumer {
            job: "api_server".to_string(),
            name: "link_that_does_not_exist".to_string(),
        }]
    );
    assert_eq!(
        deplink::diagnostics::warning_report(&resolution.warnings).unwrap(),
        "Manifest defines unknown consumers:\n  - Job 'api_server' does not define link consumer 'link_that_does_not_exist' in the release spec"
    );
}

#[test]
fn all_failures_are_aggregated_into_one_report() {
    // Both api_server consumers reference names nothing exports, and a
    // custom definition conflicts on another job; one report carries all.
    let topo = topology(
        r#"
name: simple
instance_groups:
  - name: my_api
    networks: [{name: default, type: static}]
    instances:
      - {id: api-0, index: 0, static_ips: {default: 192.168.1.2}}
    jobs:
      - name: api_server
        consumes:
          db:
            from: main_db
          backup_db:
            from: standby_db
  - name: mongo
    networks: [{name: default, type: static}]
    instances:
      - {id: mongo-0, index: 0, static_ips: {default: 192.168.1.13}}
    jobs:
      - name: mongo_db
        custom_provider_definitions:
          - name: read_only_db
            type: smurf
"#,
    );
    let report = resolve_failed(&topo);
    let text = report.to_string();
    assert!(text.contains("- Can't resolve link 'db' with type 'db' for job 'api_server'"));
    assert!(text.contains("- Can't resolve link 'backup_db' with type 'db' for job 'api_server'"));
    assert!(text.contains(
        "- Custom provider 'read_only_db' in job 'mongo_db' in instance group 'mongo' is already defined in release 'bosh-release'"
    ));
    assert_eq!(report.errors.len(), 3);
}
