//! Cases that exercise each outcome the engine can report.

use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use lisa_search_space::OsType;
use lisa_suite::{
    CaseError, CaseMetadata, CaseResult, Registry, SimpleRequirement, SuiteMetadata, TestContext,
};

static FLAKY_ATTEMPTS: AtomicU32 = AtomicU32::new(0);

pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register_suite(
        SuiteMetadata::new(
            "Selftest",
            "selftest",
            "sanity",
            "Engine self checks: requirement gating, warnings and retries.",
        )
        .with_tags(["selftest"]),
    )?;

    let posix = SimpleRequirement::new()
        .supported_os([OsType::Posix])
        .build()?;
    registry.register_case(
        CaseMetadata::new("Selftest", "node_os", "Query the kernel name.", node_os)
            .with_priority(1)
            .with_requirement(posix),
    )?;

    let windows = SimpleRequirement::new()
        .supported_os([OsType::Windows])
        .build()?;
    registry.register_case(
        CaseMetadata::new(
            "Selftest",
            "windows_only",
            "Only runs where the node is Windows.",
            |_| Ok(()),
        )
        .with_priority(3)
        .with_requirement(windows),
    )?;

    registry.register_case(
        CaseMetadata::new("Selftest", "warn", "Passes with a warning.", |_| {
            Err(CaseError::passed_with_warning("nothing to verify"))
        })
        .with_priority(3),
    )?;

    registry.register_case(
        CaseMetadata::new(
            "Selftest",
            "flaky",
            "Fails on its first attempt in a process.",
            flaky,
        )
        .with_priority(4),
    )?;
    Ok(())
}

fn node_os(ctx: &TestContext<'_>) -> CaseResult {
    let node = ctx.node()?;
    let Some(os) = node.os() else {
        return Err(CaseError::skipped("node os is unknown"));
    };
    let out = node.execute("uname", &["-s"])?;
    if !out.success() {
        return Err(CaseError::failed(format!(
            "uname exited with {}",
            out.exit_code
        )));
    }
    tracing::info!("{os}: {}", out.stdout.trim());
    Ok(())
}

fn flaky(_ctx: &TestContext<'_>) -> CaseResult {
    let attempt = FLAKY_ATTEMPTS.fetch_add(1, Ordering::SeqCst) + 1;
    if attempt == 1 {
        return Err(CaseError::failed("first attempt always fails"));
    }
    Ok(())
}
