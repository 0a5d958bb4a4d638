//! Release mirror CLI entrypoint.
//!
//! Loads configuration, runs one mirror pass, and maps the outcome to the
//! process exit code: 0 when the mirror is current, 2 when an artefact failed
//! verification and was deleted, 1 on any fatal error.

use clap::Parser;
use log::LevelFilter;
use std::io::Write;
use release_mirror::artefact::download::HttpClient;
use release_mirror::cli::Cli;
use release_mirror::config::MirrorConfig;
use release_mirror::error::Result;
use release_mirror::output::write_stderr_line;
use release_mirror::pipeline::{EXIT_FAILURE, EXIT_OK, MirrorRun, RunReport};
use release_mirror::prompt::{InteractivePrompt, Unattended};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != EXIT_OK {
        std::process::exit(exit_code);
    }
}

/// Install `env_logger` at `level`; `RUST_LOG` takes precedence when set.
fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Run one mirror pass. Returns `None` for a dry run.
fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<Option<RunReport>> {
    let config = load_config(cli)?;
    let client = HttpClient::new(&config.network);
    let mirror = MirrorRun {
        config: &config,
        client: &client,
        quiet: cli.quiet,
    };

    if cli.dry_run {
        mirror.dry_run(&mut std::io::stdout())?;
        return Ok(None);
    }

    let report = if cli.interactive {
        let mut prompt = InteractivePrompt::new(std::io::stdin().lock(), std::io::stderr());
        mirror.run(&mut prompt, stderr)?
    } else {
        mirror.run(&mut Unattended, stderr)?
    };
    Ok(Some(report))
}

/// Load the configuration file, apply command-line overrides, and validate.
fn load_config(cli: &Cli) -> Result<MirrorConfig> {
    let mut config = MirrorConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;
    log::debug!("effective configuration: {config:?}");
    Ok(config)
}

fn exit_code_for_run_result(result: Result<Option<RunReport>>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(Some(report)) if report.has_checksum_mismatch() => {
            write_stderr_line(
                stderr,
                "error: downloaded artefact failed verification and was deleted",
            );
            report.exit_code()
        }
        Ok(_) => EXIT_OK,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                write_stderr_line(stderr, format!("  caused by: {cause}"));
                source = cause.source();
            }
            EXIT_FAILURE
        }
    }
}
