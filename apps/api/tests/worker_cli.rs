use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ats-scan"))
}

fn run_worker(input: &str) -> (i32, Value) {
    let mut child = bin()
        .arg("worker")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn worker");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1, "stdout was {stdout:?}");
    (
        output.status.code().unwrap_or(-1),
        serde_json::from_str(stdout.trim()).unwrap(),
    )
}

#[test]
fn test_worker_scores_original_field_names() {
    let (code, reply) = run_worker(r#"{"resumeText":"abc","jobDesc":"abc"}"#);
    assert_eq!(code, 0);
    assert_eq!(reply["success"], true);
    assert_eq!(reply["score"], 98.0);
    assert_eq!(reply["report"]["score"], 98.0);
}

#[test]
fn test_worker_reports_empty_input() {
    let (code, reply) = run_worker("");
    assert_eq!(code, 0);
    assert_eq!(reply["success"], false);
    assert!(reply["error"].as_str().unwrap().contains("no input"));
}

#[test]
fn test_worker_reports_invalid_json() {
    let (code, reply) = run_worker("resume text that is not json\n");
    assert_eq!(code, 0);
    assert_eq!(reply["success"], false);
}

#[test]
fn test_score_command_prints_report() {
    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("resume.txt");
    let job = dir.path().join("job.txt");
    std::fs::write(&resume, "Built scalable backend systems using React and Node").unwrap();
    std::fs::write(&job, "Looking for a React developer with Node experience").unwrap();

    let output = bin()
        .arg("score")
        .arg("--candidate")
        .arg(&resume)
        .arg("--target")
        .arg(&job)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["score"], 98.0);
    assert_eq!(report["missing_keywords"], serde_json::json!(["developer"]));
}

#[test]
fn test_score_command_rejects_blank_file() {
    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("resume.txt");
    let job = dir.path().join("job.txt");
    std::fs::write(&resume, "   \n").unwrap();
    std::fs::write(&job, "Rust engineer").unwrap();

    let output = bin()
        .args(["score", "--candidate"])
        .arg(&resume)
        .arg("--target")
        .arg(&job)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("candidateText"));
}
