use anyhow::Result;
use lisa_search_space::EnvironmentStatus;
use lisa_suite::{
    CaseError, CaseMetadata, CaseResult, Registry, SuiteMetadata, TestContext, TestSuite,
};
use tracing::info;

#[derive(Debug, Default)]
pub struct HelloWorld {
    cases_seen: u32,
}

impl TestSuite for HelloWorld {
    fn before_suite(&mut self, ctx: &TestContext<'_>) -> CaseResult {
        info!("hello world suite on '{}'", ctx.environment().name());
        Ok(())
    }

    fn before_case(&mut self, ctx: &TestContext<'_>) -> CaseResult {
        if ctx.environment().status() != EnvironmentStatus::Connected {
            return Err(CaseError::not_run("environment is not connected"));
        }
        self.cases_seen += 1;
        Ok(())
    }

    fn after_suite(&mut self, _ctx: &TestContext<'_>) -> CaseResult {
        info!("hello world suite finished {} case(s)", self.cases_seen);
        Ok(())
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register_suite(
        SuiteMetadata::for_suite::<HelloWorld>(
            "demo",
            "functional",
            "Echoes a greeting on the default node.",
        )
        .with_tags(["demo"]),
    )?;
    registry.register_case(
        CaseMetadata::new("HelloWorld", "hello", "Say hello.", hello).with_priority(1),
    )?;
    registry.register_case(CaseMetadata::new("HelloWorld", "bye", "Say bye.", bye))?;
    Ok(())
}

fn hello(ctx: &TestContext<'_>) -> CaseResult {
    echo(ctx, "hello world")
}

fn bye(ctx: &TestContext<'_>) -> CaseResult {
    echo(ctx, "bye")
}

fn echo(ctx: &TestContext<'_>, text: &str) -> CaseResult {
    let node = ctx.node()?;
    let out = node.execute("echo", &[text])?;
    if !out.success() {
        return Err(CaseError::failed(format!(
            "echo exited with {}: {}",
            out.exit_code,
            out.stderr.trim()
        )));
    }
    if out.stdout.trim() != text {
        return Err(CaseError::failed(format!(
            "expected {text:?}, got {:?}",
            out.stdout.trim()
        )));
    }
    info!("{} said {text:?}", node.name());
    Ok(())
}
