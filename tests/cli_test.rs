use std::io::ErrorKind;
use std::net::TcpListener;
use std::process::{Command, Output};

const MISSING_CONFIG_LINE: &str =
    "ERROR: Set all required env vars: ENVIRONMENT, FRONTEND_ROLLBAR_SERVER_ITEM_ACCESS_TOKEN.";

/// Runs the binary with every endpoint pointed at `listener`, so any storage
/// or HTTP traffic would show up as an accepted connection.
fn run_release(listener: &TcpListener, envs: &[(&str, &str)]) -> Output {
    let addr = listener.local_addr().unwrap();
    let workdir = tempfile::tempdir().unwrap();

    let mut command = Command::new(env!("CARGO_BIN_EXE_frontend-release"));
    command
        .current_dir(workdir.path())
        .env_remove("ENVIRONMENT")
        .env_remove("FRONTEND_ROLLBAR_SERVER_ITEM_ACCESS_TOKEN")
        .env("RUST_LOG", "off")
        .env("S3_ENDPOINT_URL", format!("http://{}", addr))
        .env(
            "ROLLBAR_SOURCE_MAP_ENDPOINT",
            format!("http://{}/api/1/sourcemap", addr),
        )
        .env("SOURCE_MAP_STAGING_DIR", workdir.path().join("source_maps"));
    for (key, value) in envs {
        command.env(key, value);
    }

    command.output().unwrap()
}

fn assert_no_connections(listener: &TcpListener) {
    match listener.accept() {
        Err(e) if e.kind() == ErrorKind::WouldBlock => {}
        Ok((_, peer)) => panic!("unexpected connection from {}", peer),
        Err(e) => panic!("accept failed: {}", e),
    }
}

fn listener() -> TcpListener {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    listener
}

#[test]
fn test_missing_config_exits_with_diagnostic() {
    let listener = listener();
    let output = run_release(&listener, &[]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), MISSING_CONFIG_LINE);
    assert_no_connections(&listener);
}

#[test]
fn test_empty_token_exits_with_diagnostic() {
    let listener = listener();
    let output = run_release(
        &listener,
        &[
            ("ENVIRONMENT", "staging"),
            ("FRONTEND_ROLLBAR_SERVER_ITEM_ACCESS_TOKEN", ""),
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ENVIRONMENT"));
    assert!(stdout.contains("FRONTEND_ROLLBAR_SERVER_ITEM_ACCESS_TOKEN"));
    assert_no_connections(&listener);
}
