use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use progresslog::config::CONFIG;
use progresslog::models::progress_log_entry::ACTION_MAX_LEN;
use progresslog::{db, telemetry, LogContext, ProgressLog};

/// Run a command and track it as a progress log record
#[derive(Debug, Parser)]
#[command(name = "progresslog", version)]
struct Cli {
    /// Task name stored on the record
    #[arg(long, default_value = "cli")]
    task: String,

    /// Action name stored on the record (defaults to the command name)
    #[arg(long)]
    action: Option<String>,

    /// Actor recorded as the initiator
    #[arg(long, env = "USER")]
    who: Option<String>,

    /// Database URL (overrides PROGRESSLOG_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Do not print state lines to stdout
    #[arg(long, short)]
    quiet: bool,

    /// Command to run, with its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    telemetry::init(&CONFIG);
    tracing::debug!("progresslog v{}", CONFIG.version);

    let db = match &cli.database_url {
        Some(url) => db::connect_with_url(url).await?,
        None => db::connect().await?,
    };

    let ctx = match &cli.who {
        Some(who) => LogContext::system().with_actor(who),
        None => LogContext::system(),
    };

    let program = &cli.command[0];
    let action = cli
        .action
        .clone()
        .unwrap_or_else(|| command_name(program));

    let mut log = ProgressLog::start(&db, &ctx, &cli.task, action).await?;
    emit(&log, cli.quiet)?;

    log.step(&db, cli.command.join(" ")).await?;
    emit(&log, cli.quiet)?;

    let status = tokio::process::Command::new(program)
        .args(&cli.command[1..])
        .status()
        .await;

    let code = match status {
        Ok(status) if status.success() => {
            log.success(&db, "exit 0").await?;
            0
        }
        Ok(status) => {
            let info = match status.code() {
                Some(code) => format!("exit {}", code),
                None => "terminated by signal".to_string(),
            };
            log.failed(&db, info).await?;
            status.code().unwrap_or(1)
        }
        Err(e) => {
            tracing::warn!(program = %program, error = %e, "Failed to start command");
            log.failed(&db, format!("failed to start: {}", e)).await?;
            127
        }
    };
    emit(&log, cli.quiet)?;

    Ok(ExitCode::from((code & 0xff) as u8))
}

fn emit(log: &ProgressLog, quiet: bool) -> progresslog::Result<()> {
    if quiet {
        return Ok(());
    }
    log.output()
}

/// Basename of the program, cut to fit the action column
fn command_name(program: &str) -> String {
    let name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(program);
    name.chars().take(ACTION_MAX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_name_uses_basename() {
        assert_eq!(command_name("/usr/local/bin/backup.sh"), "backup.sh");
        assert_eq!(command_name("make"), "make");
    }

    #[test]
    fn test_command_name_is_truncated() {
        let long = "x".repeat(40);
        assert_eq!(command_name(&long).len(), ACTION_MAX_LEN);
    }

    #[test]
    fn test_cli_parses_trailing_command() {
        let cli = Cli::parse_from([
            "progresslog",
            "--task",
            "Backup",
            "--",
            "tar",
            "-czf",
            "out.tgz",
            "data",
        ]);
        assert_eq!(cli.task, "Backup");
        assert_eq!(cli.command, vec!["tar", "-czf", "out.tgz", "data"]);
        assert!(cli.action.is_none());
    }
}
