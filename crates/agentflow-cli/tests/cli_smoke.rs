use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("graphs").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn parse_reports_diagnostics() {
    let exe = assert_cmd::cargo_bin!("agentflow-cli");
    let output = Command::new(exe)
        .args(["parse", fixture("dangling.json").to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["graph"]["nodes"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["diagnostics"]["danglingEdges"], serde_json::json!(["e3"]));
    assert_eq!(json["diagnostics"]["duplicateNodeIds"], serde_json::json!(["c"]));
}

#[test]
fn wrap_uses_the_node_type_budget() {
    let exe = assert_cmd::cargo_bin!("agentflow-cli");
    let output = Command::new(exe)
        .args(["wrap", "--type", "thinking", "分析用户需求：需要查找Python文件中的错误"])
        .output()
        .expect("run");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "分析用户需求：需要查找Python文\n件中的错误\n"
    );
}

#[test]
fn wrap_without_type_is_a_usage_error() {
    let exe = assert_cmd::cargo_bin!("agentflow-cli");
    Command::new(exe).args(["wrap", "hello"]).assert().code(2);
}

#[test]
fn layout_honours_flag_overrides() {
    let exe = assert_cmd::cargo_bin!("agentflow-cli");
    let output = Command::new(exe)
        .args([
            "layout",
            "--viewport-width",
            "1200",
            "--viewport-height",
            "800",
            fixture("agent_trace.json").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["mode"], "zigzag");
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(16));
    assert_eq!(json["grid"]["nodesPerRow"], 3);
}

#[test]
fn layout_reads_yaml_config() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("agentflow.yaml");
    fs::write(&config, "layout:\n  mode: grid\n").expect("write config");

    let exe = assert_cmd::cargo_bin!("agentflow-cli");
    let output = Command::new(exe)
        .args([
            "layout",
            "--config",
            config.to_string_lossy().as_ref(),
            fixture("agent_trace.json").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["mode"], "grid");
    assert!(json["grid"].is_null());
}

#[test]
fn unknown_mode_is_a_usage_error() {
    let exe = assert_cmd::cargo_bin!("agentflow-cli");
    Command::new(exe)
        .args(["layout", "--mode", "spiral", "-"])
        .assert()
        .code(2);
}

#[test]
fn dagre_without_engine_fails() {
    let exe = assert_cmd::cargo_bin!("agentflow-cli");
    let output = Command::new(exe)
        .args([
            "layout",
            "--mode",
            "dagre",
            fixture("agent_trace.json").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("dagre"));
}

#[test]
fn renders_svg_to_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("trace.svg");

    let exe = assert_cmd::cargo_bin!("agentflow-cli");
    Command::new(exe)
        .args([
            "render",
            "--id",
            "trace",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("agent_trace.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(&out).expect("read svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"id="trace""#));
    assert!(svg.contains(r#"data-id="node_16""#));
}

#[test]
fn renders_png_with_default_out_path_for_file_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let tmp_fixture = tmp.path().join("agent_trace.json");
    fs::copy(fixture("agent_trace.json"), &tmp_fixture).expect("copy fixture");
    let expected_out = tmp_fixture.with_extension("png");

    let exe = assert_cmd::cargo_bin!("agentflow-cli");
    Command::new(exe)
        .args([
            "render",
            "--format",
            "png",
            "--scale",
            "0.5",
            tmp_fixture.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let bytes = fs::read(&expected_out).expect("read png");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "output is not a PNG");
}
