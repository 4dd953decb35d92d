//! Command definition and dispatch

use crate::logging::{self, LogFormat};
use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use harness_core::config::parse_timeout;
use harness_core::{ExecutionMode, Registry, Runner, RunnerConfig, TestFilter};
use harness_report::{annotations, markdown, Format};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

/// Exit code for usage, configuration and output errors
pub const EXIT_USAGE: i32 = 2;

/// Suite name written into JUnit reports
pub const JUNIT_SUITE_NAME: &str = "harness";

/// Build the `harness` command
#[must_use]
pub fn command() -> Command {
    Command::new("harness")
        .version(harness_core::VERSION)
        .about("Fixture-based test runner")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("warn")
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .help("Log verbosity (RUST_LOG takes precedence)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("run")
                .about("Run registered tests")
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .value_name("PATTERN")
                        .allow_hyphen_values(true)
                        .help("POSITIVE[-NEGATIVE] ':'-separated globs over fixture.test"),
                )
                .arg(
                    Arg::new("list")
                        .long("list")
                        .action(ArgAction::SetTrue)
                        .help("List selected tests without running them"),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_name("SECONDS")
                        .value_parser(value_parser!(f64))
                        .help("Per-test timeout"),
                )
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .value_name("N")
                        .value_parser(value_parser!(u64).range(1..))
                        .help("Number of worker threads (1 runs sequentially)"),
                )
                .arg(
                    Arg::new("fail-fast")
                        .long("fail-fast")
                        .action(ArgAction::SetTrue)
                        .help("Stop starting tests after the first failure"),
                )
                .arg(
                    Arg::new("also-run-disabled")
                        .long("also-run-disabled")
                        .action(ArgAction::SetTrue)
                        .help("Run disabled tests too"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("text")
                        .value_parser(["text", "json", "markdown"])
                        .help("Report format written to stdout"),
                )
                .arg(
                    Arg::new("junit")
                        .long("junit")
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write a JUnit XML report"),
                )
                .arg(
                    Arg::new("step-summary")
                        .long("step-summary")
                        .action(ArgAction::SetTrue)
                        .help("Append a markdown summary to $GITHUB_STEP_SUMMARY"),
                )
                .arg(
                    Arg::new("annotations")
                        .long("annotations")
                        .action(ArgAction::SetTrue)
                        .help("Print GitHub workflow annotations for failures"),
                )
                .arg(
                    Arg::new("include-skipped")
                        .long("include-skipped")
                        .action(ArgAction::SetTrue)
                        .requires("annotations")
                        .help("Annotate skipped tests as warnings"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML runner configuration; flags override it"),
                ),
        )
}

/// Parse `args`, run the requested subcommand against `registry` and return
/// the process exit code
pub fn run<I, T>(args: I, registry: &Registry, out: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => {
            if err.use_stderr() {
                eprint!("{}", err.render());
            } else {
                let _ = write!(out, "{}", err.render());
            }
            return err.exit_code();
        }
    };

    let level = matches
        .get_one::<String>("log-level")
        .map_or("warn", String::as_str);
    let format = if matches.get_flag("log-json") {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init(level, format);

    match execute(&matches, registry, out) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "harness aborted");
            eprintln!("error: {err:#}");
            EXIT_USAGE
        }
    }
}

/// Dispatch parsed arguments
///
/// # Errors
/// Returns an error for invalid filters or configuration, and for reports
/// that cannot be written.
pub fn execute(matches: &ArgMatches, registry: &Registry, out: &mut dyn Write) -> anyhow::Result<i32> {
    match matches.subcommand() {
        Some(("run", args)) => run_tests(args, registry, out),
        Some((name, _)) => bail!("unknown subcommand {name:?}"),
        None => bail!("no subcommand given"),
    }
}

fn run_tests(args: &ArgMatches, registry: &Registry, out: &mut dyn Write) -> anyhow::Result<i32> {
    let filter = match args.get_one::<String>("filter") {
        Some(pattern) => TestFilter::parse(pattern).with_context(|| format!("invalid --filter {pattern:?}"))?,
        None => TestFilter::all(),
    };

    if args.get_flag("list") {
        for case in registry.select(&filter) {
            let marker = if case.is_skipped() { " (disabled)" } else { "" };
            writeln!(out, "{}{marker}", case.id())?;
        }
        return Ok(0);
    }

    let config = runner_config(args)?;
    let format: Format = args
        .get_one::<String>("format")
        .map_or(Ok(Format::Text), |name| name.parse())?;

    let summary = Runner::new(config).run(registry, &filter);

    write!(out, "{}", harness_report::render(&summary, format)?)?;
    if args.get_flag("annotations") {
        let include_skipped = args.get_flag("include-skipped");
        write!(out, "{}", annotations::render(&summary, include_skipped))?;
    }
    out.flush()?;

    if let Some(path) = args.get_one::<PathBuf>("junit") {
        harness_report::write_junit(&summary, JUNIT_SUITE_NAME, path)?;
    }
    if args.get_flag("step-summary") {
        match markdown::step_summary_path() {
            Some(path) => markdown::append_step_summary(&path, &markdown::render(&summary))?,
            None => tracing::warn!(
                "--step-summary given but {} is not set",
                markdown::STEP_SUMMARY_ENV
            ),
        }
    }

    Ok(summary.exit_code())
}

/// Config file first, then command-line overrides
fn runner_config(args: &ArgMatches) -> anyhow::Result<RunnerConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => RunnerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunnerConfig::new(),
    };

    if let Some(&workers) = args.get_one::<u64>("workers") {
        let workers = usize::try_from(workers).context("--workers out of range")?;
        config = config.with_mode(ExecutionMode::from_workers(workers));
    }
    if let Some(&secs) = args.get_one::<f64>("timeout") {
        config = config.with_timeout(parse_timeout(secs).context("invalid --timeout")?);
    }
    if args.get_flag("fail-fast") {
        config = config.with_fail_fast(true);
    }
    if args.get_flag("also-run-disabled") {
        config = config.with_also_run_disabled(true);
    }

    Ok(config.validate()?)
}
