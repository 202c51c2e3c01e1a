//! Purpose: Hold top-level CLI command dispatch for `tabquery`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: The record file is loaded only by commands that read records.
//! Invariants: Query logic lives in the library `commands` module; this file only wires I/O.

use super::*;

use tabquery::commands;
use tabquery::shell::Shell as CommandShell;

pub(super) fn dispatch_command(
    command: Command,
    config: &StoreConfig,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "tabquery", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Query { expr, json } => {
            let store = config.load()?;
            let text = expr.join(" ");
            let output = commands::query(&store, Some(&text), output_format(json))?;
            emit_output(output, color_mode);
            Ok(RunOutcome::ok())
        }
        Command::IndexQuery { expr, json } => {
            let store = config.load()?;
            let text = expr.join(" ");
            let output = commands::index_query(&store, Some(&text), output_format(json))?;
            emit_output(output, color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Shell => {
            let store = config.load()?;
            let stdin = io::stdin();
            CommandShell::new(&store).run(stdin.lock(), io::stdout().lock())?;
            Ok(RunOutcome::ok())
        }
    }
}
