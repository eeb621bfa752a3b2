//! Outcomes raised by hooks and case bodies.
//!
//! Skip, not-run and pass-with-warning travel through the same error channel as
//! real failures; `TestResult::handle_exception` is the single place that gives
//! each kind its meaning.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseErrorKind {
    /// The case decided at runtime that it cannot apply (unsupported distro, SKU, ...).
    Skipped,
    /// The case should stay `NotRun` so a later environment may pick it up.
    NotRun,
    /// The case passed but wants a caveat recorded.
    PassedWithWarning,
    Failed,
}

impl CaseErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseErrorKind::Skipped => "skipped",
            CaseErrorKind::NotRun => "not_run",
            CaseErrorKind::PassedWithWarning => "passed_with_warning",
            CaseErrorKind::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseError {
    kind: CaseErrorKind,
    message: String,
}

pub type CaseResult = Result<(), CaseError>;

impl CaseError {
    pub fn new(kind: CaseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(CaseErrorKind::Skipped, message)
    }

    pub fn not_run(message: impl Into<String>) -> Self {
        Self::new(CaseErrorKind::NotRun, message)
    }

    pub fn passed_with_warning(message: impl Into<String>) -> Self {
        Self::new(CaseErrorKind::PassedWithWarning, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(CaseErrorKind::Failed, message)
    }

    pub fn kind(&self) -> CaseErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CaseError {}

impl From<anyhow::Error> for CaseError {
    fn from(err: anyhow::Error) -> Self {
        CaseError::failed(format!("{err:#}"))
    }
}

impl From<std::io::Error> for CaseError {
    fn from(err: std::io::Error) -> Self {
        CaseError::failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn io_body() -> Result<(), CaseError> {
        std::fs::read("/definitely/not/here/lisa")?;
        Ok(())
    }

    fn anyhow_body() -> Result<(), CaseError> {
        let r: anyhow::Result<()> = Err(anyhow::anyhow!("exit code 1"));
        r.context("run echo")?;
        Ok(())
    }

    #[test]
    fn question_mark_produces_generic_failure() {
        let err = io_body().unwrap_err();
        assert_eq!(err.kind(), CaseErrorKind::Failed);

        let err = anyhow_body().unwrap_err();
        assert_eq!(err.kind(), CaseErrorKind::Failed);
        assert_eq!(err.message(), "run echo: exit code 1");
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(CaseError::skipped("x").kind(), CaseErrorKind::Skipped);
        assert_eq!(CaseError::not_run("x").kind(), CaseErrorKind::NotRun);
        assert_eq!(
            CaseError::passed_with_warning("x").kind(),
            CaseErrorKind::PassedWithWarning
        );
        assert_eq!(CaseError::failed("boom").to_string(), "boom");
    }
}
