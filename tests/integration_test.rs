// Integration tests for the harborctl command-line surface

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use std::fs;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("harborctl");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("project"))
        .stdout(predicates::str::contains("repo"))
        .stdout(predicates::str::contains("artifact"))
        .stdout(predicates::str::contains("registry"))
        .stdout(predicates::str::contains("print"));
}

#[test]
fn test_global_output_flags_exist() {
    let mut cmd = cargo_bin_cmd!("harborctl");
    cmd.args(["project", "list", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("--max-depth"))
        .stdout(predicates::str::contains("--compact"))
        .stdout(predicates::str::contains("--sort-keys"))
        .stdout(predicates::str::contains("--no-overwrite"));
}

#[test]
fn test_configure_then_config_show_masks_secret() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let mut configure = cargo_bin_cmd!("harborctl");
    configure
        .current_dir(dir.path())
        .env("HARBORCTL_CONFIG_DIR", &config_dir)
        .args([
            "configure",
            "--url",
            "https://harbor.example.test",
            "--username",
            "admin",
            "--secret",
            "hunter2",
        ]);
    configure
        .assert()
        .success()
        .stdout(predicates::str::contains("Saved configuration"));

    let mut show = cargo_bin_cmd!("harborctl");
    show.current_dir(dir.path())
        .env("HARBORCTL_CONFIG_DIR", &config_dir)
        .arg("config-show");
    show.assert()
        .success()
        .stdout(predicates::str::contains("harbor.example.test"))
        .stdout(predicates::str::contains("*****"))
        .stdout(predicates::str::contains("hunter2").not());
}

#[test]
fn test_print_renders_saved_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let envelope = dir.path().join("project.json");
    fs::write(
        &envelope,
        r#"{"version":"1.0.0","type":"Project","module":"harborctl.models","data":{"name":"library","repo_count":3}}"#,
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("harborctl");
    cmd.current_dir(dir.path())
        .env("HARBORCTL_CONFIG_DIR", &config_dir)
        .args(["print", envelope.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Project"))
        .stdout(predicates::str::contains("library"));
}

#[test]
fn test_api_commands_require_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let mut cmd = cargo_bin_cmd!("harborctl");
    cmd.current_dir(dir.path())
        .env("HARBORCTL_CONFIG_DIR", &config_dir)
        .args(["project", "list"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("credentials are required"));
}
