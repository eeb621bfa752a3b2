//! Drives the orchestrator over a selection: one suite run per suite, in the
//! order suites first appear in the selection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use lisa_suite::{
    CaseMetadata, CaseRuntimeData, Environment, FrozenRegistry, Message, Notifier, SuiteRunConfig,
    SuiteRunner, TestResult, TestRunMessage, TestRunStatus, TestStatus,
};
use tracing::{info, warn};

use crate::util;

#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub run_name: String,
    pub retry: u32,
    pub times: u32,
    pub ignore_failure: bool,
    pub retry_delay: Duration,
}

pub fn run_cases(
    registry: &FrozenRegistry,
    cases: &[Arc<CaseMetadata>],
    settings: &RunSettings,
    environment: &mut dyn Environment,
    notifier: Arc<dyn Notifier>,
) -> Result<Vec<TestResult>> {
    let started = Instant::now();
    send_run_status(&*notifier, &settings.run_name, TestRunStatus::Initializing);

    let mut groups: Vec<(String, Vec<TestResult>)> = Vec::new();
    let mut order: HashMap<String, usize> = HashMap::new();
    for case in cases {
        let group = match groups.iter().position(|(s, _)| s == case.suite_name()) {
            Some(idx) => idx,
            None => {
                groups.push((case.suite_name().to_string(), Vec::new()));
                groups.len() - 1
            }
        };
        for iteration in 0..settings.times.max(1) {
            let mut runtime = CaseRuntimeData::new(Arc::clone(case));
            runtime.select_action = "include".to_string();
            runtime.retry = settings.retry;
            runtime.times = settings.times.max(1);
            runtime.ignore_failure = settings.ignore_failure;
            let id = util::record_id(&settings.run_name, case.full_name(), iteration);
            order.insert(id.clone(), order.len());
            groups[group]
                .1
                .push(TestResult::new(id, runtime, Arc::clone(&notifier)));
        }
    }

    send_run_status(&*notifier, &settings.run_name, TestRunStatus::Running);
    let runner = SuiteRunner::new(SuiteRunConfig {
        retry_delay: settings.retry_delay,
    });
    let mut out = Vec::new();
    for (suite_name, mut records) in groups {
        let suite = registry
            .suite(&suite_name)
            .with_context(|| format!("unknown test suite: {suite_name}"))?;

        for record in records.iter_mut() {
            record.bind_environment(environment);
            if !record.check_environment(environment, true) {
                let reason = record
                    .check_results()
                    .map(|r| r.explain())
                    .unwrap_or_default();
                record.set_status(
                    TestStatus::Skipped,
                    &format!("no available environment: {reason}"),
                );
            }
        }
        let (mut runnable, skipped): (Vec<TestResult>, Vec<TestResult>) =
            records.into_iter().partition(|r| r.can_run());

        if runnable.is_empty() {
            info!("suite '{suite_name}' has no runnable case");
        } else {
            info!(
                "running suite '{suite_name}' with {} case(s) on '{}'",
                runnable.len(),
                environment.name()
            );
            let outcome = runner.run_suite(suite, environment, &mut runnable);
            if let Some(err) = &outcome.before_suite_error {
                warn!("suite '{suite_name}': {err}");
            }
        }
        out.extend(runnable);
        out.extend(skipped);
    }
    out.sort_by_key(|r| order.get(r.id()).copied().unwrap_or(usize::MAX));

    let completed = out.iter().filter(|r| r.status().is_completed()).count();
    info!("{completed} of {} case record(s) completed", out.len());

    let failed = out.iter().any(|r| r.status() == TestStatus::Failed);
    let status = if failed {
        TestRunStatus::Failed
    } else {
        TestRunStatus::Success
    };
    info!("test run '{}' {}", settings.run_name, status.as_str());
    let mut finished = TestRunMessage::new(settings.run_name.as_str(), status);
    finished.elapsed = started.elapsed().as_secs_f64();
    notifier.notify(&Message::TestRun(finished));
    notifier.finalize();
    Ok(out)
}

fn send_run_status(notifier: &dyn Notifier, run_name: &str, status: TestRunStatus) {
    info!("test run '{run_name}' {}", status.as_str());
    notifier.notify(&Message::TestRun(TestRunMessage::new(run_name, status)));
}
