//! End-to-end tests for the `monconf` binary

mod common;

use common::TestEnv;
use predicates::prelude::*;

const BACKENDS: &str = "\
; Managed by monconf
[localdb]
type = ido
resource = icinga_ido ; main database

[livestatus]
type = livestatus
socket = /var/run/icinga2/cmd/livestatus
";

#[test]
fn test_list_without_files() {
    let env = TestEnv::new();
    env.monconf()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backends ("))
        .stdout(predicate::str::contains("Instances ("))
        .stdout(predicate::str::contains("(none configured)"));
}

#[test]
fn test_create_then_list() {
    let env = TestEnv::new();
    env.monconf()
        .args(["backend", "create", "ido", "--set", "type=ido", "--set", "resource=icinga_ido"])
        .assert()
        .success()
        .stdout("Backend \"ido\" created successfully.\n");

    assert_eq!(env.read("backends.ini"), "[ido]\ntype = ido\nresource = icinga_ido\n");

    env.monconf()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("  ido\n    type = ido\n    resource = icinga_ido\n"));
}

#[test]
fn test_create_duplicate_fails_and_shows_current_file() {
    let env = TestEnv::new();
    env.write("backends.ini", BACKENDS);

    env.monconf()
        .args(["backend", "create", "localdb", "--set", "type=ido"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Could not save configuration: section \"localdb\" already exists",
        ))
        .stderr(predicate::str::contains("The file currently contains:"))
        .stderr(predicate::str::contains("Error:").not());

    assert_eq!(env.read("backends.ini"), BACKENDS);
}

#[test]
fn test_edit_keeps_unrelated_lines() {
    let env = TestEnv::new();
    env.write("backends.ini", BACKENDS);

    env.monconf()
        .args([
            "backend",
            "edit",
            "livestatus",
            "--set",
            "socket=/run/livestatus",
            "--set",
            "disabled=1",
        ])
        .assert()
        .success()
        .stdout("Backend \"livestatus\" successfully modified.\n");

    assert_eq!(
        env.read("backends.ini"),
        BACKENDS.replace(
            "socket = /var/run/icinga2/cmd/livestatus\n",
            "socket = /run/livestatus\ndisabled = 1\n",
        )
    );
}

#[test]
fn test_rename_keeps_position() {
    let env = TestEnv::new();
    env.write("backends.ini", BACKENDS);

    env.monconf()
        .args(["backend", "edit", "localdb", "--rename", "primary"])
        .assert()
        .success()
        .stdout("Backend \"localdb\" successfully modified.\n");

    assert_eq!(
        env.read("backends.ini"),
        BACKENDS.replace("[localdb]", "[primary]")
    );
}

#[test]
fn test_edit_unknown_entity() {
    let env = TestEnv::new();
    env.write("backends.ini", BACKENDS);

    env.monconf()
        .args(["backend", "edit", "nope", "--set", "type=ido"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: Cannot edit \"nope\". Backend not found.",
        ));

    assert_eq!(env.read("backends.ini"), BACKENDS);
}

#[test]
fn test_remove_instance() {
    let env = TestEnv::new();
    env.write(
        "instances.ini",
        "[icinga]\ntransport = local\npath = /var/run/icinga2/cmd/icinga2.cmd\n\n[satellite]\ntransport = remote\nhost = 10.0.0.7\n",
    );

    env.monconf()
        .args(["instance", "remove", "satellite", "--yes"])
        .assert()
        .success()
        .stdout("Instance \"satellite\" successfully removed.\n");

    assert_eq!(
        env.read("instances.ini"),
        "[icinga]\ntransport = local\npath = /var/run/icinga2/cmd/icinga2.cmd\n"
    );

    env.monconf()
        .args(["instance", "remove", "satellite", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Cannot remove \"satellite\". Instance not found.",
        ));
}

#[test]
fn test_show_entity() {
    let env = TestEnv::new();
    env.write("backends.ini", BACKENDS);

    env.monconf()
        .args(["backend", "show", "localdb"])
        .assert()
        .success()
        .stdout("localdb\n  type = ido\n  resource = icinga_ido\n");
}

#[test]
fn test_json_listing_reports_broken_file() {
    let env = TestEnv::new();
    env.write("backends.ini", "type = ido\n");
    env.write("instances.ini", "[icinga]\ntransport = local\n");

    let output = env.monconf().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let error = listing["backends"]["error"].as_str().unwrap();
    assert!(error.contains("line 1: entry outside of any section"));
    assert_eq!(listing["instances"]["icinga"]["transport"], "local");
}

#[test]
fn test_security_settings() {
    let env = TestEnv::new();

    env.monconf()
        .arg("security")
        .assert()
        .success()
        .stdout("No security settings configured.\n");

    env.monconf()
        .args(["security", "--set", "protected_customvars=*pw*,*pass*"])
        .assert()
        .success()
        .stdout("Security settings successfully saved.\n");
    assert_eq!(
        env.read("config.ini"),
        "[security]\nprotected_customvars = *pw*,*pass*\n"
    );

    env.monconf()
        .args(["security", "--unset", "protected_customvars"])
        .assert()
        .success();
    assert_eq!(env.read("config.ini"), "[security]\n");
}

#[test]
fn test_security_unset_on_missing_section() {
    let env = TestEnv::new();

    env.monconf()
        .args(["security", "--unset", "protected_customvars"])
        .assert()
        .success()
        .stdout("No security settings configured.\n");
    assert!(!env.file("config.ini").exists());
}

#[test]
fn test_failed_write_shows_intended_content() {
    let env = TestEnv::new();
    let missing = env.config_dir.path().join("not-there");

    env.monconf()
        .args(["instance", "create", "icinga", "--set", "transport=local"])
        .env("MONCONF_CONFIG_DIR", &missing)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Could not save configuration: cannot write"))
        .stderr(predicate::str::contains(format!(
            "Target file: {}",
            missing.join("instances.ini").display()
        )))
        .stderr(predicate::str::contains(
            "Apply the following configuration manually:\n----\n[icinga]\ntransport = local\n----\n",
        ));

    assert!(!missing.exists());
}

#[test]
fn test_settings_pick_file_names() {
    let env = TestEnv::new();

    env.monconf()
        .args(["settings", "set", "files.backends", "datasources.ini"])
        .assert()
        .success();

    env.monconf()
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backends = \"datasources.ini\""));

    env.monconf()
        .args(["backend", "create", "ido", "--set", "type=ido"])
        .assert()
        .success();
    assert_eq!(env.read("datasources.ini"), "[ido]\ntype = ido\n");
    assert!(!env.file("backends.ini").exists());

    env.monconf()
        .args(["settings", "set", "colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown setting 'colour'"));
}
