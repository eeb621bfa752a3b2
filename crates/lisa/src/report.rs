use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use lisa_contracts::{LISA_LIST_REPORT_SCHEMA_VERSION, LISA_RUN_REPORT_SCHEMA_VERSION};
use lisa_suite::{CaseMetadata, TestResult, TestStatus};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LisaRunReport {
    pub schema_version: String,
    pub tool: ToolInfo,
    pub invocation: InvocationInfo,
    pub summary: Summary,
    pub results: Vec<CaseReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

impl ToolInfo {
    fn current() -> Self {
        Self {
            name: "lisa".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvocationInfo {
    pub argv: Vec<String>,
    pub cwd: String,
    pub started_at_unix_ms: u64,
    pub run_name: String,
    pub environment: String,
    pub retry: u32,
    pub times: u32,
    pub ignore_failure: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub attempted: u64,
    pub not_run: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub name: String,
    pub suite: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl CaseReport {
    fn from_result(r: &TestResult) -> Self {
        Self {
            id: r.id().to_string(),
            name: r.name().to_string(),
            suite: r.runtime().metadata.suite_name().to_string(),
            status: r.status(),
            duration_ms: r.elapsed().as_millis() as u64,
            message: r.message().to_string(),
        }
    }
}

pub fn finalize_report(
    invocation: InvocationInfo,
    elapsed: Duration,
    results: &[TestResult],
) -> LisaRunReport {
    let mut summary = Summary::default();
    for r in results {
        match r.status() {
            TestStatus::Passed => summary.passed += 1,
            TestStatus::Failed => summary.failed += 1,
            TestStatus::Skipped => summary.skipped += 1,
            TestStatus::Attempted => summary.attempted += 1,
            TestStatus::NotRun | TestStatus::Running => summary.not_run += 1,
        }
    }
    summary.duration_ms = elapsed.as_millis() as u64;

    LisaRunReport {
        schema_version: LISA_RUN_REPORT_SCHEMA_VERSION.to_string(),
        tool: ToolInfo::current(),
        invocation,
        summary,
        results: results.iter().map(CaseReport::from_result).collect(),
    }
}

pub fn compute_exit_code(report: &LisaRunReport) -> u8 {
    if report.summary.failed > 0 {
        return 10;
    }
    0
}

pub fn write_report_and_exit(
    report: &LisaRunReport,
    report_out: Option<&Path>,
    json: bool,
) -> Result<std::process::ExitCode> {
    let exit_code = compute_exit_code(report);
    let json_text = serde_json::to_string(report)? + "\n";

    if let Some(out_path) = report_out {
        if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create report dir: {}", parent.display()))?;
        }
        std::fs::write(out_path, json_text.as_bytes())
            .with_context(|| format!("write report: {}", out_path.display()))?;
        eprintln!(
            "lisa: passed={} failed={} skipped={} attempted={} not_run={} (exit={})",
            report.summary.passed,
            report.summary.failed,
            report.summary.skipped,
            report.summary.attempted,
            report.summary.not_run,
            exit_code
        );
    }

    if json {
        print!("{json_text}");
    } else {
        for r in &report.results {
            if r.message.is_empty() {
                println!("{}\t{}", r.status, r.name);
            } else {
                let last = r.message.lines().last().unwrap_or_default();
                println!("{}\t{}\t{}", r.status, r.name, last);
            }
        }
        println!(
            "summary: passed={} failed={} skipped={} attempted={} not_run={} (exit={})",
            report.summary.passed,
            report.summary.failed,
            report.summary.skipped,
            report.summary.attempted,
            report.summary.not_run,
            exit_code
        );
    }

    Ok(std::process::ExitCode::from(exit_code))
}

#[derive(Debug, Clone, Serialize)]
pub struct LisaListReport {
    pub schema_version: String,
    pub tool: ToolInfo,
    pub cases: Vec<ListedCase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListedCase {
    pub name: String,
    pub full_name: String,
    pub suite: String,
    pub area: String,
    pub category: String,
    pub tags: Vec<String>,
    pub priority: u32,
    pub description: String,
}

impl ListedCase {
    pub fn from_case(case: &CaseMetadata) -> Self {
        Self {
            name: case.name().to_string(),
            full_name: case.full_name().to_string(),
            suite: case.suite_name().to_string(),
            area: case.area().to_string(),
            category: case.category().to_string(),
            tags: case.tags().to_vec(),
            priority: case.priority(),
            description: case.description().to_string(),
        }
    }
}

pub fn list_report(cases: Vec<ListedCase>) -> LisaListReport {
    LisaListReport {
        schema_version: LISA_LIST_REPORT_SCHEMA_VERSION.to_string(),
        tool: ToolInfo::current(),
        cases,
    }
}

pub fn invocation(
    run_name: &str,
    environment: &str,
    retry: u32,
    times: u32,
    ignore_failure: bool,
) -> InvocationInfo {
    InvocationInfo {
        argv: std::env::args().collect(),
        cwd: std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .display()
            .to_string(),
        started_at_unix_ms: crate::util::unix_ms_now(),
        run_name: run_name.to_string(),
        environment: environment.to_string(),
        retry,
        times,
        ignore_failure,
    }
}
