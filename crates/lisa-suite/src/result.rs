use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lisa_search_space::{EnvironmentStatus, OsType, ResultReason};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::notifier::{Message, Notifier, TestResultMessage};
use crate::{CaseError, CaseErrorKind, CaseRuntimeData, Environment};

pub const MAX_MESSAGE_CHARS: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    NotRun,
    Running,
    Failed,
    Passed,
    Skipped,
    Attempted,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::NotRun => "NOTRUN",
            TestStatus::Running => "RUNNING",
            TestStatus::Failed => "FAILED",
            TestStatus::Passed => "PASSED",
            TestStatus::Skipped => "SKIPPED",
            TestStatus::Attempted => "ATTEMPTED",
        }
    }

    pub fn is_completed(self) -> bool {
        matches!(
            self,
            TestStatus::Failed | TestStatus::Passed | TestStatus::Skipped | TestStatus::Attempted
        )
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run record of one selected case.
///
/// Every status change is pushed to the notifier immediately, so a sink always
/// sees the record's latest state even if the run is torn down mid-way.
pub struct TestResult {
    id: String,
    runtime: CaseRuntimeData,
    status: TestStatus,
    started: Option<Instant>,
    elapsed: Duration,
    message: String,
    information: BTreeMap<String, String>,
    environment_information: BTreeMap<String, String>,
    check_results: Option<ResultReason>,
    notifier: Arc<dyn Notifier>,
}

impl TestResult {
    pub fn new(
        id: impl Into<String>,
        runtime: CaseRuntimeData,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let out = Self {
            id: id.into(),
            runtime,
            status: TestStatus::NotRun,
            started: None,
            elapsed: Duration::ZERO,
            message: String::new(),
            information: BTreeMap::new(),
            environment_information: BTreeMap::new(),
            check_results: None,
            notifier,
        };
        out.send_result_message();
        out
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.runtime.full_name()
    }

    pub fn runtime(&self) -> &CaseRuntimeData {
        &self.runtime
    }

    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Wall time spent in `Running`; still ticking while the case runs.
    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(started) => self.elapsed + started.elapsed(),
            None => self.elapsed,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn information(&self) -> &BTreeMap<String, String> {
        &self.information
    }

    pub fn set_information(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.information.insert(key.into(), value.into());
    }

    pub fn check_results(&self) -> Option<&ResultReason> {
        self.check_results.as_ref()
    }

    pub fn can_run(&self) -> bool {
        self.status == TestStatus::NotRun
    }

    /// Snapshots facts about the environment the case is bound to.
    pub fn bind_environment(&mut self, environment: &dyn Environment) {
        self.environment_information = environment.information();
        self.runtime.environment_name = environment.name().to_string();
    }

    pub fn set_status(&mut self, new_status: TestStatus, message: &str) {
        if !message.is_empty() {
            if !self.message.is_empty() {
                self.message.push('\n');
            }
            self.message.push_str(message);
        }

        if self.status != new_status {
            if new_status == TestStatus::Running {
                self.started = Some(Instant::now());
            } else if let Some(started) = self.started.take() {
                self.elapsed += started.elapsed();
            }
            self.status = new_status;
        }

        self.send_result_message();
    }

    /// Turns a hook or body error into the matching terminal status.
    pub fn handle_exception(&mut self, err: &CaseError, phase: &str) {
        let phase = if phase.is_empty() {
            String::new()
        } else {
            format!("{phase} ")
        };
        let detail = err.message();
        debug!("'{}' raised {}", self.id, err.kind().as_str());
        match err.kind() {
            CaseErrorKind::Skipped => {
                info!("case skipped: {detail}");
                self.set_status(TestStatus::Skipped, &format!("{phase}skipped: {detail}"));
            }
            CaseErrorKind::NotRun => {
                info!("case not run: {detail}");
                self.set_status(TestStatus::NotRun, &format!("{phase}notrun: {detail}"));
            }
            CaseErrorKind::PassedWithWarning => {
                warn!("case passed with warning: {detail}");
                self.set_status(TestStatus::Passed, &format!("{phase}warning: {detail}"));
            }
            CaseErrorKind::Failed if self.runtime.ignore_failure => {
                info!("case failed and ignored: {detail}");
                self.set_status(TestStatus::Attempted, &format!("{phase}{detail}"));
            }
            CaseErrorKind::Failed => {
                warn!("case failed: {detail}");
                self.set_status(TestStatus::Failed, &format!("{phase}failed: {detail}"));
            }
        }
    }

    /// True if `environment` can host this case.
    ///
    /// With `save_reason` every check runs to the end and the merged
    /// explanation is kept on the record; otherwise checking stops at the first
    /// mismatch.
    pub fn check_environment(&mut self, environment: &dyn Environment, save_reason: bool) -> bool {
        let requirement = Arc::clone(self.runtime.metadata.requirement());
        let mut check = ResultReason::ok();

        let status = environment.status();
        if !status.satisfies(requirement.environment_status()) {
            check.add_reason(format!(
                "environment status {status} doesn't meet required {}",
                requirement.environment_status()
            ));
        }

        if check.result || save_reason {
            check.merge(
                requirement.environment().check(&environment.capability()),
                "environment",
            );
        }

        if check.result || save_reason {
            if let Some(platform) = requirement.platform_type() {
                let offered = environment.platform_type().to_string();
                check.merge(platform.check([&offered]), "platform_type");
            }
        }

        if check.result || save_reason {
            if let Some(os_type) = requirement.os_type() {
                if status == EnvironmentStatus::Connected {
                    for node in environment.nodes() {
                        let ancestors: Vec<OsType> =
                            node.os().map(OsType::ancestors).unwrap_or_default();
                        let os_result = os_type.check(ancestors.iter());
                        let failed = !os_result.result;
                        check.merge(os_result, "os_type");
                        if failed && !save_reason {
                            break;
                        }
                    }
                }
            }
        }

        debug!(
            "check '{}' on environment '{}': {check}",
            self.name(),
            environment.name()
        );
        let ok = check.result;
        if save_reason {
            match self.check_results.as_mut() {
                Some(existing) => existing.merge(check, environment.name()),
                None => self.check_results = Some(check),
            }
        }
        ok
    }

    fn send_result_message(&self) {
        let mut msg = TestResultMessage::new(&self.id, self.name(), self.status);
        msg.elapsed = self.elapsed().as_secs_f64();
        msg.message = truncate_chars(&self.message, MAX_MESSAGE_CHARS);
        msg.information = self.environment_information.clone();
        msg.information
            .extend(self.information.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.notifier.notify(&Message::TestResult(msg));
    }
}

impl fmt::Debug for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResult")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("status", &self.status)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
