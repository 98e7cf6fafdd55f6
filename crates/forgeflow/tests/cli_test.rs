#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("forge").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--push"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--debug"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("docker-compose"));
}

/// 設定ファイルが無ければ何もせず終了コード1
#[test]
fn test_missing_config_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("forge").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("-c")
        .arg("nope.cfg")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nope.cfg"));
}

/// 壊れたJSON設定も終了コード1
#[test]
fn test_malformed_config_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("dockerbuild.cfg"), "{ not json").unwrap();

    let mut cmd = Command::cargo_bin("forge").unwrap();
    cmd.current_dir(temp_dir.path()).assert().failure().code(1);
}

/// 必須サービスキーが欠けた設定も終了コード1
#[test]
fn test_missing_service_key_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("dockerbuild.cfg"),
        r#"{
            "globals": [{
                "registry": "r",
                "insecure_registry": false,
                "tag_preamble": "t",
                "maintainer": "m"
            }],
            "services": [{"app_name": "web"}]
        }"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("forge").unwrap();
    cmd.current_dir(temp_dir.path()).assert().failure().code(1);
}
