use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::tempdir;

const AS_OF: &str = "2024-01-20T00:00:00Z";

fn run_flowtime(args: &[&str]) -> Output {
    let binary = assert_cmd::cargo::cargo_bin!("flowtime");
    Command::new(binary)
        .env("NO_COLOR", "1")
        .env_remove("FLOWTIME_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("flowtime command executes")
}

fn run_flowtime_ok(args: &[&str]) -> String {
    let output = run_flowtime(args);
    assert!(
        output.status.success(),
        "flowtime {:?} failed:\nstdout:\n{}\nstderr:\n{}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be utf8")
}

fn run_flowtime_json(args: &[&str]) -> Value {
    let stdout = run_flowtime_ok(args);
    serde_json::from_str(stdout.trim()).expect("valid json stdout")
}

fn run_flowtime_err_json(args: &[&str]) -> Value {
    let output = run_flowtime(args);
    assert!(
        !output.status.success(),
        "expected flowtime {:?} to fail, but it succeeded:\nstdout:\n{}",
        args,
        String::from_utf8_lossy(&output.stdout)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_line = stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    serde_json::from_str(json_line).expect("valid json error line in stderr")
}

fn history(at: &str, from: &str, to: &str) -> Value {
    json!({
        "created": at,
        "items": [{ "field": "status", "fromString": from, "toString": to }]
    })
}

fn issue(key: &str, assignee: &str, kind: &str, created: &str, histories: Vec<Value>) -> Value {
    json!({
        "key": key,
        "fields": {
            "created": created,
            "assignee": { "displayName": assignee },
            "issuetype": { "name": kind }
        },
        "changelog": { "histories": histories }
    })
}

/// ABC-1: 24h in progress, 48h in review, 96h lead time, done 2024-01-05.
/// ABC-2: 12h in progress, 36h in review, 49h lead time, done 2024-01-10.
/// ABC-3: still in progress. XYZ-1: another project.
fn seed_export(dir: &Path) -> PathBuf {
    let issues = vec![
        issue(
            "ABC-1",
            "Ada",
            "Story",
            "2024-01-01T09:00:00.000+0000",
            vec![
                history("2024-01-02T09:00:00.000+0000", "To Do", "In Progress"),
                history("2024-01-03T09:00:00.000+0000", "In Progress", "In Review"),
                history("2024-01-05T09:00:00.000+0000", "In Review", "Done"),
            ],
        ),
        issue(
            "ABC-2",
            "Grace",
            "Bug",
            "2024-01-08T09:00:00.000+0000",
            vec![
                history("2024-01-08T10:00:00.000+0000", "To Do", "In Progress"),
                history("2024-01-08T22:00:00.000+0000", "In Progress", "in review"),
                history("2024-01-10T10:00:00.000+0000", "In Review", "Done"),
            ],
        ),
        issue(
            "ABC-3",
            "Ada",
            "Story",
            "2024-01-15T09:00:00.000+0000",
            vec![history(
                "2024-01-16T09:00:00.000+0000",
                "To Do",
                "In Progress",
            )],
        ),
        issue(
            "XYZ-1",
            "Ada",
            "Story",
            "2024-01-01T09:00:00.000+0000",
            vec![history("2024-01-02T09:00:00.000+0000", "To Do", "Done")],
        ),
    ];

    let path = dir.join("export.json");
    fs::write(&path, json!({ "issues": issues }).to_string()).unwrap();
    path
}

fn ticket_by_key<'a>(report: &'a Value, key: &str) -> &'a Value {
    report["tickets"]
        .as_array()
        .expect("tickets array")
        .iter()
        .find(|ticket| ticket["ticket_key"] == key)
        .unwrap_or_else(|| panic!("ticket {key} missing from report"))
}

#[test]
fn ticket_reports_status_durations_and_lead_time() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let ticket = run_flowtime_json(&[
        "--as-of",
        AS_OF,
        "ticket",
        "ABC-1",
        "--source",
        source.to_str().unwrap(),
    ]);

    assert_eq!(ticket["ticket_key"], "ABC-1");
    assert_eq!(ticket["time_in_progress_hours"].as_f64(), Some(24.0));
    assert_eq!(ticket["time_in_review_hours"].as_f64(), Some(48.0));
    assert_eq!(ticket["lead_time_hours"].as_f64(), Some(96.0));
}

#[test]
fn unfinished_ticket_has_no_lead_time_and_counts_up_to_as_of() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let ticket = run_flowtime_json(&[
        "--as-of",
        AS_OF,
        "ticket",
        "ABC-3",
        "--source",
        source.to_str().unwrap(),
    ]);

    assert_eq!(ticket["time_in_progress_hours"].as_f64(), Some(87.0));
    assert!(ticket["lead_time_hours"].is_null());
}

#[test]
fn project_summary_covers_recent_completions_of_that_project() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let report = run_flowtime_json(&[
        "--as-of",
        AS_OF,
        "project",
        "ABC",
        "--source",
        source.to_str().unwrap(),
        "--days",
        "30",
    ]);

    let keys: Vec<&str> = report["tickets"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|ticket| ticket["ticket_key"].as_str())
        .collect();
    assert_eq!(keys, vec!["ABC-1", "ABC-2"]);

    let summary = &report["summary"];
    assert_eq!(summary["ticket_count"], 2);
    assert_eq!(summary["avg_time_in_progress_hours"].as_f64(), Some(18.0));
    assert_eq!(summary["avg_time_in_review_hours"].as_f64(), Some(42.0));
    assert_eq!(summary["avg_lead_time_hours"].as_f64(), Some(72.5));
    assert_eq!(summary["avg_lead_time_days"].as_f64(), Some(3.02));
}

#[test]
fn project_days_window_drops_older_completions() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let report = run_flowtime_json(&[
        "--as-of",
        AS_OF,
        "project",
        "ABC",
        "--source",
        source.to_str().unwrap(),
        "--days",
        "12",
    ]);

    let tickets = report["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["ticket_key"], "ABC-2");
}

#[test]
fn project_days_beyond_calendar_range_keeps_all_completions() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let report = run_flowtime_json(&[
        "--as-of",
        AS_OF,
        "project",
        "ABC",
        "--source",
        source.to_str().unwrap(),
        "--days",
        "4294967295",
    ]);

    assert_eq!(report["tickets"].as_array().unwrap().len(), 2);
    assert_eq!(report["summary"]["ticket_count"], 2);
}

#[test]
fn filtered_weekly_breakdown_groups_by_completion_week() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let report = run_flowtime_json(&[
        "--as-of",
        AS_OF,
        "filtered",
        "ABC",
        "--source",
        source.to_str().unwrap(),
        "--start",
        "2024-01-01",
        "--end",
        "2024-01-31",
        "--period",
        "weekly",
    ]);

    assert_eq!(report["tickets"].as_array().unwrap().len(), 3);
    assert_eq!(
        ticket_by_key(&report, "ABC-3")["time_in_progress_hours"].as_f64(),
        Some(87.0)
    );

    let summary = &report["summary"];
    assert_eq!(summary["ticket_count"], 3);
    assert_eq!(summary["avg_time_in_progress_hours"].as_f64(), Some(41.0));
    assert_eq!(summary["avg_time_in_review_hours"].as_f64(), Some(42.0));
    assert!(summary["assignee_name"].is_null());

    let breakdown = &report["period_breakdown"];
    assert_eq!(breakdown["granularity"], "weekly");
    let periods = breakdown["periods"].as_array().unwrap();
    assert_eq!(periods.len(), 2);
    assert_eq!(periods[0]["period"], "2024-W01");
    assert_eq!(periods[0]["ticket_count"], 1);
    assert_eq!(periods[0]["avg_lead_time_hours"].as_f64(), Some(96.0));
    assert_eq!(periods[1]["period"], "2024-W02");
    assert_eq!(periods[1]["avg_time_in_review_hours"].as_f64(), Some(36.0));

    assert_eq!(report["data_quality"]["incomplete_issues"], 1);
}

#[test]
fn filtered_by_assignee_and_type_without_breakdown() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let report = run_flowtime_json(&[
        "--as-of",
        AS_OF,
        "filtered",
        "ABC",
        "--source",
        source.to_str().unwrap(),
        "--assignee",
        "Ada",
        "--issue-type",
        "Story",
    ]);

    let tickets = report["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 2);
    assert_eq!(report["summary"]["assignee_name"], "Ada");
    assert!(report.get("period_breakdown").is_none());
}

#[test]
fn unknown_ticket_reports_json_error() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let err = run_flowtime_err_json(&["ticket", "ABC-99", "--source", source.to_str().unwrap()]);

    assert_eq!(err["error"], "issue_not_found");
    assert!(err["message"].as_str().unwrap().contains("ABC-99"));
}

#[test]
fn malformed_timestamp_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    let bad = issue(
        "ABC-1",
        "Ada",
        "Story",
        "2024-01-01T09:00:00Z",
        Vec::new(),
    );
    fs::write(&path, bad.to_string()).unwrap();

    let err = run_flowtime_err_json(&["ticket", "ABC-1", "--source", path.to_str().unwrap()]);

    assert_eq!(err["error"], "parse_error");
}

#[test]
fn invalid_date_bound_is_rejected() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let err = run_flowtime_err_json(&[
        "filtered",
        "ABC",
        "--source",
        source.to_str().unwrap(),
        "--start",
        "yesterday",
    ]);

    assert_eq!(err["error"], "invalid_date");
}

#[test]
fn directory_sources_and_config_file_are_honoured() {
    let dir = tempdir().unwrap();
    let exports = dir.path().join("exports");
    fs::create_dir(&exports).unwrap();
    seed_export(&exports);

    let config = dir.path().join("workflow.yaml");
    fs::write(
        &config,
        "statuses:\n  in_review:\n    name: In Review\n    match: exact\n",
    )
    .unwrap();

    let ticket = run_flowtime_json(&[
        "--as-of",
        AS_OF,
        "--config",
        config.to_str().unwrap(),
        "ticket",
        "ABC-2",
        "--source",
        exports.to_str().unwrap(),
    ]);

    // "in review" no longer matches once the rule is exact.
    assert_eq!(ticket["time_in_review_hours"].as_f64(), Some(0.0));
    assert_eq!(ticket["lead_time_hours"].as_f64(), Some(49.0));
}

#[test]
fn pretty_format_prints_human_summary() {
    let dir = tempdir().unwrap();
    let source = seed_export(dir.path());

    let stdout = run_flowtime_ok(&[
        "--as-of",
        AS_OF,
        "--format",
        "pretty",
        "ticket",
        "ABC-1",
        "--source",
        source.to_str().unwrap(),
    ]);

    assert!(predicate::str::contains("ABC-1").eval(&stdout));
    assert!(predicate::str::contains("lead time:   96.00h").eval(&stdout));
}

#[test]
fn plain_errors_outside_json_mode() {
    let output = run_flowtime(&[
        "--format",
        "pretty",
        "ticket",
        "ABC-1",
        "--source",
        "/nonexistent/flowtime-export.json",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(predicate::str::starts_with("error:").eval(stderr.trim()));
}
