use std::{io::Write, process::ExitCode};

use pr_report::{ReportError, error::EXIT_CONFIG, parse_args, run};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,pr_report=info";

/// Diagnostics go to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let config = match parse_args(std::env::args_os()) {
        Ok(config) => config,
        Err(err) => match err.downcast::<clap::Error>() {
            // Help and version print to stdout and exit 0; usage errors exit 2.
            Ok(clap_err) => clap_err.exit(),
            Err(err) => {
                eprintln!("Error: {err:#}");
                return exit_with(EXIT_CONFIG);
            }
        },
    };

    let mut stdout = std::io::stdout().lock();
    let result = run(&config, &mut stdout)
        .await
        .and_then(|()| stdout.flush().map_err(ReportError::Output));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = stdout.flush();
            eprintln!("Error: {err}");
            exit_with(err.exit_code())
        }
    }
}
