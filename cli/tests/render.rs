use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};

fn blockdown(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blockdown"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run blockdown")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "blockdown failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("output is not JSON")
}

#[test]
fn renders_a_message_template() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("greeting.bd");
    fs::write(&template, "header \"Welcome\"\ndivider\n").unwrap();

    let output = blockdown(&["render", template.to_str().unwrap()], dir.path());
    let document = stdout_json(&output);
    assert_eq!(document["blocks"].as_array().unwrap().len(), 2);
    assert_eq!(document["blocks"][0]["text"]["text"], "Welcome");
}

#[test]
fn default_subcommand_is_render() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("greeting.bd");
    fs::write(&template, "divider\n").unwrap();

    let output = blockdown(&[template.to_str().unwrap()], dir.path());
    let document = stdout_json(&output);
    assert_eq!(document["blocks"], json!([{ "type": "divider" }]));
}

#[test]
fn modal_format_flag() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("settings.bd");
    fs::write(&template, "title \"Settings\"\nsimple_section \"body\"\n").unwrap();

    let output = blockdown(
        &["render", template.to_str().unwrap(), "--format", "slack_modal"],
        dir.path(),
    );
    let document = stdout_json(&output);
    assert_eq!(document["type"], "modal");
}

#[test]
fn locals_file_feeds_bare_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("greeting.bd");
    fs::write(&template, "header name\n").unwrap();
    let locals = dir.path().join("locals.json");
    fs::write(&locals, r#"{"name": "Ana"}"#).unwrap();

    let output = blockdown(
        &[
            "render",
            template.to_str().unwrap(),
            "--locals",
            locals.to_str().unwrap(),
        ],
        dir.path(),
    );
    let document = stdout_json(&output);
    assert_eq!(document["blocks"][0]["text"]["text"], "Ana");
}

#[test]
fn partials_resolve_next_to_the_template() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("users")).unwrap();
    fs::write(
        dir.path().join("users").join("_user.bd"),
        "simple_section \"a user\"\n",
    )
    .unwrap();
    let template = dir.path().join("listing.bd");
    fs::write(&template, "render person\n").unwrap();
    let locals = dir.path().join("locals.json");
    fs::write(&locals, r#"{"person": {"type": "user", "name": "Ana"}}"#).unwrap();

    let output = blockdown(
        &[
            "render",
            template.to_str().unwrap(),
            "--locals",
            locals.to_str().unwrap(),
        ],
        dir.path(),
    );
    let document = stdout_json(&output);
    assert_eq!(document["blocks"].as_array().unwrap().len(), 1);
    assert_eq!(document["blocks"][0]["type"], "section");
}

#[test]
fn modal_suffix_implies_the_modal_format() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("settings.modal.bd");
    fs::write(&template, "title \"Settings\"\n").unwrap();

    let output = blockdown(&["render", template.to_str().unwrap()], dir.path());
    let document = stdout_json(&output);
    assert_eq!(document["type"], "modal");
}

#[test]
fn config_sets_the_default_format() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("blockdown.toml"), "default_format = \"slack_modal\"\n").unwrap();
    let template = dir.path().join("settings.bd");
    fs::write(&template, "title \"Settings\"\n").unwrap();

    let output = blockdown(&["render", template.to_str().unwrap()], dir.path());
    let document = stdout_json(&output);
    assert_eq!(document["type"], "modal");
}

#[test]
fn augmented_flag_prints_the_compiled_source() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("greeting.bd");
    fs::write(&template, "divider\n").unwrap();

    let output = blockdown(
        &["render", template.to_str().unwrap(), "--augmented"],
        dir.path(),
    );
    let text = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        text,
        "%builder blocks\n%fallback context\ndivider\n%yield blocks\n"
    );
}

#[test]
fn check_flag_stops_after_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("greeting.bd");
    fs::write(&template, "header undefined_local\n").unwrap();

    // An undefined local is an evaluation error; --check never gets there.
    let output = blockdown(
        &["render", template.to_str().unwrap(), "--check"],
        dir.path(),
    );
    assert!(output.status.success());
}

#[test]
fn errors_point_at_the_authored_line() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("broken.bd");
    fs::write(&template, "divider\nheader missing\n").unwrap();

    let output = blockdown(
        &["render", template.to_str().unwrap(), "--no-color"],
        dir.path(),
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("undefined local"), "stderr: {}", stderr);
    assert!(stderr.contains("2 "), "expected a line-2 label: {}", stderr);
}

#[test]
fn parse_errors_fail_with_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("broken.bd");
    fs::write(&template, "header \"unterminated\n").unwrap();

    let output = blockdown(
        &["render", template.to_str().unwrap(), "--no-color"],
        dir.path(),
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unterminated string"), "stderr: {}", stderr);
}
