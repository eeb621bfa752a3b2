//! Result message contract and the bundled sinks.
//!
//! Transports (files, dashboards, REST) live outside this crate; they only need
//! to implement [`Notifier`].

use std::collections::BTreeMap;
use std::sync::Mutex;

use lisa_contracts::{TEST_RESULT_MESSAGE_SCHEMA_VERSION, TEST_RUN_MESSAGE_SCHEMA_VERSION};
use serde::Serialize;

use crate::TestStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResultMessage {
    pub schema_version: &'static str,
    pub id: String,
    pub name: String,
    pub status: TestStatus,
    /// Seconds.
    pub elapsed: f64,
    pub message: String,
    pub information: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestRunStatus {
    Initializing,
    Running,
    Success,
    Failed,
}

impl TestRunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestRunStatus::Initializing => "INITIALIZING",
            TestRunStatus::Running => "RUNNING",
            TestRunStatus::Success => "SUCCESS",
            TestRunStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRunMessage {
    pub schema_version: &'static str,
    pub run_name: String,
    pub status: TestRunStatus,
    pub elapsed: f64,
    pub message: String,
}

impl TestRunMessage {
    pub fn new(run_name: impl Into<String>, status: TestRunStatus) -> Self {
        Self {
            schema_version: TEST_RUN_MESSAGE_SCHEMA_VERSION,
            run_name: run_name.into(),
            status,
            elapsed: 0.0,
            message: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    TestResult(TestResultMessage),
    TestRun(TestRunMessage),
}

impl TestResultMessage {
    pub(crate) fn new(id: &str, name: &str, status: TestStatus) -> Self {
        Self {
            schema_version: TEST_RESULT_MESSAGE_SCHEMA_VERSION,
            id: id.to_string(),
            name: name.to_string(),
            status,
            elapsed: 0.0,
            message: String::new(),
            information: BTreeMap::new(),
        }
    }
}

/// Sink for result messages. Must tolerate being called from any thread.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &Message);

    /// Flush point at the end of a run.
    fn finalize(&self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &Message) {}
}

/// Writes every message as one JSON line through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &Message) {
        match serde_json::to_string(message) {
            Ok(line) => tracing::info!(target: "lisa::notifier", "{line}"),
            Err(err) => tracing::warn!(target: "lisa::notifier", "cannot encode message: {err}"),
        }
    }
}

/// Keeps every message in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<Message>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn results(&self) -> Vec<TestResultMessage> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::TestResult(r) => Some(r),
                Message::TestRun(_) => None,
            })
            .collect()
    }

    /// Most recent result message per case id, in first-seen order.
    pub fn latest_results(&self) -> Vec<TestResultMessage> {
        let mut order: Vec<String> = Vec::new();
        let mut latest: BTreeMap<String, TestResultMessage> = BTreeMap::new();
        for r in self.results() {
            if !latest.contains_key(&r.id) {
                order.push(r.id.clone());
            }
            latest.insert(r.id.clone(), r);
        }
        order
            .into_iter()
            .filter_map(|id| latest.remove(&id))
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &Message) {
        match self.messages.lock() {
            Ok(mut guard) => guard.push(message.clone()),
            Err(poisoned) => poisoned.into_inner().push(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_with_type_tag() {
        let mut msg = TestResultMessage::new("r1", "HelloWorld.hello", TestStatus::Passed);
        msg.elapsed = 1.5;
        let v = serde_json::to_value(Message::TestResult(msg)).unwrap();
        assert_eq!(v["type"], "test_result");
        assert_eq!(v["status"], "PASSED");
        assert_eq!(v["schema_version"], TEST_RESULT_MESSAGE_SCHEMA_VERSION);

        let run = TestRunMessage::new("run", TestRunStatus::Success);
        let v = serde_json::to_value(Message::TestRun(run)).unwrap();
        assert_eq!(v["type"], "test_run");
        assert_eq!(v["status"], "SUCCESS");
    }

    #[test]
    fn collecting_notifier_keeps_latest_per_id() {
        let sink = CollectingNotifier::new();
        sink.notify(&Message::TestResult(TestResultMessage::new("a", "S.a", TestStatus::NotRun)));
        sink.notify(&Message::TestResult(TestResultMessage::new("b", "S.b", TestStatus::NotRun)));
        sink.notify(&Message::TestRun(TestRunMessage::new("run", TestRunStatus::Running)));
        sink.notify(&Message::TestResult(TestResultMessage::new("a", "S.a", TestStatus::Passed)));

        assert_eq!(sink.messages().len(), 4);
        assert_eq!(sink.results().len(), 3);
        let latest = sink.latest_results();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id, "a");
        assert_eq!(latest[0].status, TestStatus::Passed);
        assert_eq!(latest[1].status, TestStatus::NotRun);
    }
}
