use std::process::Command;

use lisa_contracts::{LISA_LIST_REPORT_SCHEMA_VERSION, LISA_RUN_REPORT_SCHEMA_VERSION};
use serde_json::Value;

fn run_lisa(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_lisa");
    Command::new(exe)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run lisa")
}

fn parse_json_stdout(out: &std::process::Output) -> Value {
    serde_json::from_slice(&out.stdout).expect("parse stdout JSON")
}

fn assert_exit(out: &std::process::Output, code: i32) {
    assert_eq!(
        out.status.code(),
        Some(code),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn list_prints_cases_in_declaration_order() {
    let out = run_lisa(&["list", "--json"]);
    assert_exit(&out, 0);
    let v = parse_json_stdout(&out);
    assert_eq!(v["schema_version"], LISA_LIST_REPORT_SCHEMA_VERSION);
    let cases = v["cases"].as_array().expect("cases[]");
    let names: Vec<&str> = cases
        .iter()
        .map(|c| c["full_name"].as_str().expect("case.full_name"))
        .collect();
    assert_eq!(
        names,
        vec![
            "HelloWorld.hello",
            "HelloWorld.bye",
            "Selftest.node_os",
            "Selftest.windows_only",
            "Selftest.warn",
            "Selftest.flaky",
        ]
    );
    assert_eq!(cases[0]["area"], "demo");
    assert_eq!(cases[0]["priority"], 1);
    assert_eq!(cases[1]["priority"], 2);

    let out = run_lisa(&["list", "--area", "demo"]);
    assert_exit(&out, 0);
    let text = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "hello\tHelloWorld\tdemo\tfunctional\tdemo\t1");
}

#[test]
fn run_hello_world_passes() {
    let out = run_lisa(&["run", "--filter", "HelloWorld"]);
    assert_exit(&out, 0);
    let v = parse_json_stdout(&out);
    assert_eq!(v["schema_version"], LISA_RUN_REPORT_SCHEMA_VERSION);
    assert_eq!(v["tool"]["name"], "lisa");
    assert_eq!(v["summary"]["passed"], 2);
    assert_eq!(v["summary"]["failed"], 0);
    let results = v["results"].as_array().expect("results[]");
    assert_eq!(results[0]["name"], "HelloWorld.hello");
    assert_eq!(results[0]["status"], "PASSED");
    assert_eq!(results[1]["suite"], "HelloWorld");
}

#[test]
fn flaky_case_needs_a_retry() {
    let out = run_lisa(&["run", "--filter", "Selftest.flaky", "--exact"]);
    assert_exit(&out, 10);
    let v = parse_json_stdout(&out);
    assert_eq!(v["summary"]["failed"], 1);
    assert_eq!(
        v["results"][0]["message"],
        "failed: first attempt always fails"
    );

    let out = run_lisa(&["run", "--filter", "Selftest.flaky", "--exact", "--retry", "1"]);
    assert_exit(&out, 0);
    let v = parse_json_stdout(&out);
    assert_eq!(v["summary"]["passed"], 1);
    assert_eq!(v["invocation"]["retry"], 1);

    let out = run_lisa(&[
        "run",
        "--filter",
        "Selftest.flaky",
        "--exact",
        "--ignore-failure",
    ]);
    assert_exit(&out, 0);
    let v = parse_json_stdout(&out);
    assert_eq!(v["summary"]["attempted"], 1);
    assert_eq!(v["results"][0]["status"], "ATTEMPTED");
}

#[test]
fn os_requirement_gates_cases() {
    let out = run_lisa(&[
        "run",
        "--filter",
        "Selftest.windows_only",
        "--exact",
        "--os",
        "ubuntu",
    ]);
    assert_exit(&out, 0);
    let v = parse_json_stdout(&out);
    assert_eq!(v["summary"]["skipped"], 1);
    let message = v["results"][0]["message"].as_str().expect("message");
    assert!(message.contains("os_type"), "{message}");

    let out = run_lisa(&[
        "run",
        "--filter",
        "Selftest.windows_only",
        "--exact",
        "--os",
        "windows",
    ]);
    assert_exit(&out, 0);
    let v = parse_json_stdout(&out);
    assert_eq!(v["summary"]["passed"], 1);
}

#[test]
fn warning_passes_and_times_repeats() {
    let out = run_lisa(&[
        "run",
        "--filter",
        "Selftest.warn",
        "--exact",
        "--times",
        "2",
    ]);
    assert_exit(&out, 0);
    let v = parse_json_stdout(&out);
    assert_eq!(v["summary"]["passed"], 2);
    let results = v["results"].as_array().expect("results[]");
    assert_eq!(results.len(), 2);
    assert_ne!(results[0]["id"], results[1]["id"]);
    assert_eq!(results[0]["message"], "warning: nothing to verify");
}

#[test]
fn report_out_writes_the_same_report() {
    let dir = std::env::temp_dir().join(format!("lisa-cli-{}", std::process::id()));
    let path = dir.join("report.json");
    let out = run_lisa(&[
        "run",
        "--filter",
        "HelloWorld.bye",
        "--json",
        "false",
        "--report-out",
        path.to_str().expect("utf-8 temp path"),
    ]);
    assert_exit(&out, 0);
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("PASSED\tHelloWorld.bye"), "{text}");
    assert!(text.contains("summary: passed=1"), "{text}");

    let bytes = std::fs::read(&path).expect("read report");
    let v: Value = serde_json::from_slice(&bytes).expect("parse report");
    assert_eq!(v["summary"]["passed"], 1);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_selection_is_an_error() {
    let out = run_lisa(&["run", "--area", "no-such-area"]);
    assert_exit(&out, 2);
    assert!(String::from_utf8_lossy(&out.stderr).contains("no test case matches"));
}

#[test]
fn check_reports_registry_and_requirements() {
    let out = run_lisa(&["check", "--os", "ubuntu"]);
    assert_exit(&out, 0);
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.starts_with("registry: 2 suites, 6 cases"), "{text}");
    assert!(text.contains("ok\tHelloWorld.hello"), "{text}");
    assert!(text.contains("unmet\tSelftest.windows_only\tos_type: "), "{text}");
}
