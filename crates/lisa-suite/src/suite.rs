//! Suite lifecycle: hooks, per-case context and the orchestrator that drives
//! `before_suite -> (before_case -> case -> after_case)* -> after_suite`.

use std::cell::Cell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::retry::{retry_call, RetryPolicy};
use crate::{CaseError, CaseResult, Environment, Node, SuiteMetadata, TestResult, TestStatus};

/// Lifecycle hooks of a suite. Every hook defaults to a no-op.
pub trait TestSuite {
    fn before_suite(&mut self, _ctx: &TestContext<'_>) -> CaseResult {
        Ok(())
    }

    fn after_suite(&mut self, _ctx: &TestContext<'_>) -> CaseResult {
        Ok(())
    }

    fn before_case(&mut self, _ctx: &TestContext<'_>) -> CaseResult {
        Ok(())
    }

    fn after_case(&mut self, _ctx: &TestContext<'_>) -> CaseResult {
        Ok(())
    }
}

/// Hooks of suites that declare none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl TestSuite for NoHooks {}

/// Cooperative stop request, checked between cases.
#[derive(Debug, Default)]
pub struct StopSignal(Cell<bool>);

impl StopSignal {
    pub fn raise(&self) {
        self.0.set(true);
    }

    pub fn is_raised(&self) -> bool {
        self.0.get()
    }
}

/// What a hook or case body gets to work with.
pub struct TestContext<'a> {
    environment: &'a dyn Environment,
    node: Option<&'a dyn Node>,
    case_name: &'a str,
    stop: &'a StopSignal,
}

impl<'a> TestContext<'a> {
    pub fn new(
        environment: &'a dyn Environment,
        node: Option<&'a dyn Node>,
        case_name: &'a str,
        stop: &'a StopSignal,
    ) -> Self {
        Self {
            environment,
            node,
            case_name,
            stop,
        }
    }

    pub fn environment(&self) -> &'a dyn Environment {
        self.environment
    }

    /// Default node of the environment.
    pub fn node(&self) -> Result<&'a dyn Node, CaseError> {
        self.node.ok_or_else(|| {
            CaseError::skipped(format!(
                "environment '{}' has no node",
                self.environment.name()
            ))
        })
    }

    /// Empty inside suite-level hooks.
    pub fn case_name(&self) -> &'a str {
        self.case_name
    }

    /// Asks the orchestrator not to start any further case in this suite run.
    pub fn stop(&self) {
        self.stop.raise();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteRunConfig {
    /// Pause between attempts of a retried hook or body.
    pub retry_delay: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteRunOutcome {
    /// `"before_suite: <err>"` when suite setup failed.
    pub before_suite_error: Option<String>,
    pub stopped: bool,
    pub cases_run: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SuiteRunner {
    config: SuiteRunConfig,
}

impl SuiteRunner {
    pub fn new(config: SuiteRunConfig) -> Self {
        Self { config }
    }

    /// Runs `results` (cases of `metadata`) on `environment` with a fresh hook object.
    pub fn run_suite(
        &self,
        metadata: &SuiteMetadata,
        environment: &mut dyn Environment,
        results: &mut [TestResult],
    ) -> SuiteRunOutcome {
        let mut suite = metadata.create_suite();
        self.run(metadata.name(), suite.as_mut(), environment, results)
    }

    /// Runs every record in order. Hook and body errors never escape: they end
    /// up in the records' statuses.
    pub fn run(
        &self,
        suite_name: &str,
        suite: &mut dyn TestSuite,
        environment: &mut dyn Environment,
        results: &mut [TestResult],
    ) -> SuiteRunOutcome {
        environment.mark_used();
        let environment: &dyn Environment = environment;
        let node = environment.default_node();
        let stop = StopSignal::default();
        let mut outcome = SuiteRunOutcome::default();

        let suite_ctx = TestContext::new(environment, node, "", &stop);
        let started = Instant::now();
        if let Err(err) = suite.before_suite(&suite_ctx) {
            warn!("suite '{suite_name}' before_suite failed: {err}");
            outcome.before_suite_error = Some(format!("before_suite: {err}"));
        }
        debug!("before_suite end in {:?}", started.elapsed());

        for result in results.iter_mut() {
            let case = Arc::clone(&result.runtime().metadata);
            let policy = RetryPolicy::new(result.runtime().retry, self.config.retry_delay);
            let ctx = TestContext::new(environment, node, case.name(), &stop);

            result.bind_environment(environment);
            info!("test case '{}' is running", case.full_name());
            let total = Instant::now();
            result.set_status(TestStatus::Running, "");
            outcome.cases_run += 1;

            let mut is_continue = match &outcome.before_suite_error {
                Some(message) => {
                    result.set_status(TestStatus::Skipped, message);
                    false
                }
                None => true,
            };

            if is_continue {
                let started = Instant::now();
                if let Err(err) = retry_call(policy, "before_case", || suite.before_case(&ctx)) {
                    error!("'{}' before_case: {err}", case.full_name());
                    result.set_status(TestStatus::Skipped, &format!("before_case: {err}"));
                    is_continue = false;
                }
                debug!("before_case end in {:?}", started.elapsed());
            }

            if is_continue {
                let started = Instant::now();
                let body = case.body();
                match retry_call(policy, case.full_name(), || body(&ctx)) {
                    Ok(()) => result.set_status(TestStatus::Passed, ""),
                    Err(err) => result.handle_exception(&err, ""),
                }
                debug!("case end in {:?}", started.elapsed());
            }

            let started = Instant::now();
            if let Err(err) = retry_call(policy, "after_case", || suite.after_case(&ctx)) {
                error!("'{}' after_case failed: {err}", case.full_name());
            }
            debug!("after_case end in {:?}", started.elapsed());

            info!(
                "result: {}, elapsed: {:.3}s",
                result.status(),
                total.elapsed().as_secs_f64()
            );

            if stop.is_raised() {
                info!("received stop message, stop run");
                outcome.stopped = true;
                break;
            }
        }

        let started = Instant::now();
        if let Err(err) = suite.after_suite(&suite_ctx) {
            warn!("suite '{suite_name}' after_suite failed: {err}");
        }
        debug!("after_suite end in {:?}", started.elapsed());

        outcome
    }
}
