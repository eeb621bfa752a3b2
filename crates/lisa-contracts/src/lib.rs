//! Shared, version-pinned protocol identifiers.
//!
//! These constants are the single source of truth for schema/version strings that
//! appear in machine-readable output (notifier messages and run reports).

pub const TEST_RESULT_MESSAGE_SCHEMA_VERSION: &str = "lisa.test_result@0.1.0";
pub const TEST_RUN_MESSAGE_SCHEMA_VERSION: &str = "lisa.test_run@0.1.0";

pub const LISA_RUN_REPORT_SCHEMA_VERSION: &str = "lisa.run.report@0.1.0";
pub const LISA_LIST_REPORT_SCHEMA_VERSION: &str = "lisa.list.report@0.1.0";
