mod cli;
mod command;
mod command_result;
mod commands;
mod graphql_files;
mod output_utils;

use clap::Parser;
pub(crate) use cli::Cli;
pub(crate) use command::RunnableCommand;
pub(crate) use command_result::CommandResult;

const DEFAULT_LOG_LEVEL: tracing::Level = tracing::Level::INFO;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> std::process::ExitCode {
    let mut cli = Cli::parse();
    setup_logger(&cli);

    if let Some(command) = cli.cmd.take() {
        let result = command.run(cli).await;
        if let Some(stdout) = result.stdout {
            println!("{stdout}");
        }
        if let Some(stderr) = result.stderr {
            eprintln!("{stderr}")
        }
        result.exit_code
    } else {
        match cli.run_default().await {
            Ok(()) => std::process::ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{} {err:#}", output_utils::RED_X);
                std::process::ExitCode::FAILURE
            },
        }
    }
}

/// Logs go to stderr so that `execute` output on stdout stays valid JSON.
///
/// `--verbose` wins over the `LOG_LEVEL` environment variable.
fn setup_logger(cli: &Cli) {
    let requested = std::env::var("LOG_LEVEL").ok();
    let parsed = requested.as_deref().map(parse_log_level);
    let log_level = match (cli.verbose, parsed) {
        (true, _) => tracing::Level::DEBUG,
        (false, Some(Some(level))) => level,
        (false, _) => DEFAULT_LOG_LEVEL,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();
    log::trace!("Logging level set to `{log_level}`.");

    if let (Some(other), Some(None)) = (requested, parsed) {
        log::warn!("Ignoring invalid `LOG_LEVEL` environment variable value: `{other}`");
    }
}

fn parse_log_level(raw: &str) -> Option<tracing::Level> {
    match raw.trim() {
        "VERBOSE" | "verbose" => Some(tracing::Level::DEBUG),
        other => other.parse().ok(),
    }
}
