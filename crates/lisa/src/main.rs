use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::{Args, Parser};
use lisa_search_space::OsType;
use lisa_suite::{
    CaseRuntimeData, Environment, FrozenRegistry, LogNotifier, Notifier, NullNotifier, TestResult,
};

mod local;
mod logging;
mod report;
mod runner;
mod selector;
mod suites;
mod util;

use local::LocalEnvironment;
use selector::SelectArgs;

#[derive(Parser, Debug)]
#[command(name = "lisa")]
#[command(about = "Run test suites against the local machine.", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// List the selected test cases.
    List(ListArgs),
    /// Validate the registry and match each selected case against this machine.
    Check(CheckArgs),
    /// Run the selected test cases.
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
struct EnvArgs {
    /// Use this OS for the local node instead of detecting it.
    #[arg(long, value_enum, value_name = "OS")]
    os: Option<OsType>,
}

#[derive(Debug, Clone, Args)]
struct ListArgs {
    #[command(flatten)]
    select: SelectArgs,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct CheckArgs {
    #[command(flatten)]
    select: SelectArgs,

    #[command(flatten)]
    env: EnvArgs,
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    #[command(flatten)]
    select: SelectArgs,

    #[command(flatten)]
    env: EnvArgs,

    /// Extra attempts for hooks and case bodies.
    #[arg(long, value_name = "N", default_value_t = 0)]
    retry: u32,

    /// Run every selected case N times.
    #[arg(long, value_name = "N", default_value_t = 1)]
    times: u32,

    /// Report failures as ATTEMPTED.
    #[arg(long)]
    ignore_failure: bool,

    #[arg(long, value_name = "MS", default_value_t = 0)]
    retry_delay_ms: u64,

    #[arg(long, value_name = "NAME")]
    run_name: Option<String>,

    #[arg(
        long,
        action = clap::ArgAction::Set,
        value_name = "BOOL",
        value_parser = clap::value_parser!(bool),
        default_value = "true"
    )]
    json: bool,

    #[arg(long, value_name = "PATH")]
    report_out: Option<PathBuf>,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let registry = lisa_suite::install(suites::load()?)?;

    match cli.command {
        Command::List(args) => cmd_list(registry, args),
        Command::Check(args) => cmd_check(registry, args),
        Command::Run(args) => cmd_run(registry, args),
    }
}

fn cmd_list(registry: &FrozenRegistry, args: ListArgs) -> Result<ExitCode> {
    let cases = selector::select(registry, &args.select);
    let listed: Vec<report::ListedCase> = cases
        .iter()
        .map(|c| report::ListedCase::from_case(c))
        .collect();

    if args.json {
        let json = serde_json::to_string(&report::list_report(listed))? + "\n";
        print!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    for c in &listed {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            c.name,
            c.suite,
            c.area,
            c.category,
            c.tags.join(","),
            c.priority
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(registry: &FrozenRegistry, args: CheckArgs) -> Result<ExitCode> {
    println!(
        "registry: {} suites, {} cases",
        registry.suites().len(),
        registry.cases().len()
    );

    let env = LocalEnvironment::new(args.env.os);
    let notifier: Arc<dyn Notifier> = Arc::new(NullNotifier);
    for case in selector::select(registry, &args.select) {
        let full_name = case.full_name().to_string();
        let mut record = TestResult::new(
            full_name.as_str(),
            CaseRuntimeData::new(case),
            Arc::clone(&notifier),
        );
        if record.check_environment(&env, true) {
            println!("ok\t{full_name}");
        } else {
            let reason = record
                .check_results()
                .map(|r| r.explain())
                .unwrap_or_default();
            println!("unmet\t{full_name}\t{reason}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_run(registry: &FrozenRegistry, args: RunArgs) -> Result<ExitCode> {
    let started = Instant::now();

    let cases = selector::select(registry, &args.select);
    if cases.is_empty() {
        bail!("no test case matches the selection");
    }

    let run_name = args
        .run_name
        .clone()
        .unwrap_or_else(|| format!("lisa-{}", util::unix_ms_now()));
    let settings = runner::RunSettings {
        run_name: run_name.clone(),
        retry: args.retry,
        times: args.times,
        ignore_failure: args.ignore_failure,
        retry_delay: Duration::from_millis(args.retry_delay_ms),
    };

    let mut env = LocalEnvironment::new(args.env.os);
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let results = runner::run_cases(registry, &cases, &settings, &mut env, notifier)?;

    let invocation = report::invocation(
        &run_name,
        env.name(),
        args.retry,
        args.times,
        args.ignore_failure,
    );
    let report = report::finalize_report(invocation, started.elapsed(), &results);
    report::write_report_and_exit(&report, args.report_out.as_deref(), args.json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory as _;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_args_defaults() {
        let cli = Cli::try_parse_from(["lisa", "run", "--filter", "HelloWorld"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.retry, 0);
        assert_eq!(args.times, 1);
        assert!(args.json);
        assert!(args.env.os.is_none());

        let cli = Cli::try_parse_from(["lisa", "check", "--os", "ubuntu"]).unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.env.os, Some(OsType::Ubuntu));
    }
}
