mod common;

use common::TestFixture;
use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Runs the binary with an isolated config directory and the given stdin
fn secretinject(fixture: &TestFixture, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_secretinject"))
        .args(args)
        .current_dir(&fixture.base_path)
        .env("HOME", &fixture.base_path)
        .env("XDG_CONFIG_HOME", fixture.base_path.join(".config"))
        .env_remove("SECRETINJECT_SOURCE")
        .env_remove("SECRETINJECT_TEMPLATE_VERSION")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_cli_inject_from_stdin() {
    let fixture = TestFixture::new();
    let store = fixture.create_secret_store();

    let output = secretinject(
        &fixture,
        &["inject", "--source", &store, "--var", "app=company/webapp"],
        "password={{ ${app}/prod/db/password }}",
    );

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "password=prod-db-pass\n"
    );
}

#[test]
fn test_cli_inject_to_file() {
    let fixture = TestFixture::new();
    let store = fixture.create_secret_store();
    let template = fixture.write("app.tpl", "key={{ company/webapp/prod/api_key }}\n");
    let out = fixture.base_path.join("app.conf");

    let output = secretinject(
        &fixture,
        &[
            "inject",
            "--source",
            &store,
            "--in-file",
            template.to_str().unwrap(),
            "--file",
            out.to_str().unwrap(),
        ],
        "",
    );

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(fs::read_to_string(&out).unwrap(), "key=prod-api-key\n");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&out).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn test_cli_inject_refuses_existing_file_without_tty() {
    let fixture = TestFixture::new();
    let out = fixture.write("app.conf", "keep me");

    let output = secretinject(
        &fixture,
        &["inject", "--file", out.to_str().unwrap()],
        "plain text",
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "keep me");
}

#[test]
fn test_cli_unknown_template_version() {
    let fixture = TestFixture::new();

    let output = secretinject(&fixture, &["inject", "--template-version", "3"], "x");

    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("unknown template version: '3' supported versions are 1, 2 and latest")
    );
}

#[test]
fn test_cli_invalid_template_var() {
    let fixture = TestFixture::new();

    let output = secretinject(&fixture, &["inject", "--var", "bad-name=x"], "x");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad-name"));
}

#[cfg(unix)]
#[test]
fn test_cli_run_with_env_file() {
    let fixture = TestFixture::new();
    let store = fixture.create_secret_store();
    fixture.write(
        "secretinject.env",
        "DB_PASSWORD={{ company/webapp/prod/db/password }}\n",
    );

    let output = secretinject(
        &fixture,
        &[
            "run",
            "--source",
            &store,
            "--",
            "/bin/sh",
            "-c",
            "printf %s \"$DB_PASSWORD\"; exit 7",
        ],
        "",
    );

    assert_eq!(output.status.code(), Some(7), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "prod-db-pass");
}

#[test]
fn test_cli_config_show_without_config() {
    let fixture = TestFixture::new();

    let output = secretinject(&fixture, &["config", "show"], "");

    assert!(output.status.success(), "{:?}", output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("No configuration found"));
}
