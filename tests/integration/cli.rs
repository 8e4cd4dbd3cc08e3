//! End-to-end tests of the `deplink` binary.

use assert_cmd::Command;
use predicates::prelude::*;

use super::common::{releases_yaml, scenario_topology_yaml};

fn write_fixtures(dir: &tempfile::TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let deployment = dir.path().join("deployment.yml");
    let releases = dir.path().join("releases.yml");
    std::fs::write(&deployment, scenario_topology_yaml()).unwrap();
    std::fs::write(&releases, releases_yaml()).unwrap();
    (deployment, releases)
}

#[test]
fn resolves_and_prints_json_context() {
    let dir = tempfile::tempdir().unwrap();
    let (deployment, releases) = write_fixtures(&dir);

    Command::cargo_bin("deplink")
        .unwrap()
        .arg(&deployment)
        .arg(&releases)
        .assert()
        .success()
        .stdout(predicate::str::contains("mysql-uuid-0.mysql.dynamic-network.simple.bosh"))
        .stdout(predicate::str::contains("192.168.1.12"));
}

#[test]
fn summary_format_lists_consumers() {
    let dir = tempfile::tempdir().unwrap();
    let (deployment, releases) = write_fixtures(&dir);

    Command::cargo_bin("deplink")
        .unwrap()
        .arg(&deployment)
        .arg(&releases)
        .args(["--format", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("my_api/api_server/db -> type 'db', 2 instance(s)"))
        .stdout(predicate::str::contains(
            "my_api/api_server/backup_db -> type 'db', 1 instance(s)",
        ));
}

#[test]
fn custom_dns_suffix_changes_dynamic_addresses() {
    let dir = tempfile::tempdir().unwrap();
    let (deployment, releases) = write_fixtures(&dir);

    Command::cargo_bin("deplink")
        .unwrap()
        .arg(&deployment)
        .arg(&releases)
        .args(["--dns-suffix", "internal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mysql-uuid-0.mysql.dynamic-network.simple.internal"));
}

#[test]
fn unresolvable_deployment_exits_nonzero_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let deployment = dir.path().join("deployment.yml");
    let releases = dir.path().join("releases.yml");
    // api_server's consumers have no provider anywhere.
    std::fs::write(
        &deployment,
        r#"
name: simple
instance_groups:
  - name: my_api
    networks: [{name: default, type: static}]
    instances:
      - {id: api-0, index: 0, static_ips: {default: 192.168.1.2}}
    jobs:
      - name: api_server
"#,
    )
    .unwrap();
    std::fs::write(&releases, releases_yaml()).unwrap();

    Command::cargo_bin("deplink")
        .unwrap()
        .arg(&deployment)
        .arg(&releases)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to resolve links from deployment 'simple'. See errors below:",
        ))
        .stderr(predicate::str::contains(
            "- Can't resolve link 'db' with type 'db' for job 'api_server' in instance group 'my_api' in deployment 'simple'",
        ))
        .stderr(predicate::str::contains("- Can't resolve link 'backup_db'"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn missing_input_file_reports_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let releases = dir.path().join("releases.yml");
    std::fs::write(&releases, releases_yaml()).unwrap();

    Command::cargo_bin("deplink")
        .unwrap()
        .arg(dir.path().join("nope.yml"))
        .arg(&releases)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load deployment topology"));
}
