//! CLI integration tests
//!
//! Spawn the built binary and check what it prints for the demo user.

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_viewfilter");
    Command::new(cli_bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI")
}

fn projected_line(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find(|line| line.starts_with("projected:"))
        .unwrap_or_else(|| panic!("no projected line in: {}", stdout))
        .to_string()
}

#[test]
fn test_demo_public_view_hides_password() {
    let output = run(&["demo", "--view", "public"]);

    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        projected_line(&output),
        r#"projected: User{username: "alice", password: null, email: "alice@example.com"}"#
    );
}

#[test]
fn test_demo_credentials_view_hides_email() {
    let output = run(&[
        "demo",
        "--view",
        "Credentials",
        "--username",
        "bob",
        "--password",
        "pw",
        "--profile",
        "production",
    ]);

    assert!(output.status.success());
    assert_eq!(
        projected_line(&output),
        r#"projected: User{username: "bob", password: "pw", email: null}"#
    );
}

#[test]
fn test_demo_original_line_is_unfiltered() {
    let output = run(&["demo", "--view", "username"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(
        r#"original:  User{username: "alice", password: "s3cret", email: "alice@example.com"}"#
    ));
}

#[test]
fn test_demo_unknown_view_fails() {
    let output = run(&["demo", "--view", "Admin"]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Unknown view tag: Admin"), "{}", stderr);
}

#[test]
fn test_views_lists_composite_tags() {
    let output = run(&["views"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "Username"));
    assert!(stdout.lines().any(|l| l == "Public extends Username, EMail"));
    assert!(stdout.lines().any(|l| l == "Credentials extends Username, Password"));
}

#[test]
fn test_views_json() {
    let output = run(&["views", "--json"]);

    assert!(output.status.success());
    let views: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let views = views.as_array().unwrap();
    assert_eq!(views.len(), 5);
    let public = views.iter().find(|v| v["name"] == "Public").unwrap();
    assert_eq!(public["extends"], serde_json::json!(["Username", "EMail"]));
}
