//! Suite execution engine: metadata registry, requirements, the per-case result
//! state machine and the orchestrator that runs a suite's cases on one
//! environment.

mod environment;
mod error;
mod metadata;
pub mod notifier;
mod registry;
mod requirement;
mod result;
pub mod retry;
mod signal;
mod suite;

pub use environment::{Environment, ExecResult, Node};
pub use error::{RegistryError, RequirementError};
pub use metadata::{
    CaseBody, CaseMetadata, CaseRuntimeData, SuiteFactory, SuiteMetadata, DEFAULT_PRIORITY,
};
pub use notifier::{
    CollectingNotifier, LogNotifier, Message, Notifier, NullNotifier, TestResultMessage,
    TestRunMessage, TestRunStatus,
};
pub use registry::{global, install, FrozenRegistry, Registry};
pub use requirement::{default_requirement, SimpleRequirement, TestCaseRequirement};
pub use result::{TestResult, TestStatus, MAX_MESSAGE_CHARS};
pub use signal::{CaseError, CaseErrorKind, CaseResult};
pub use suite::{
    NoHooks, StopSignal, SuiteRunConfig, SuiteRunOutcome, SuiteRunner, TestContext, TestSuite,
};

pub use lisa_search_space as search_space;
