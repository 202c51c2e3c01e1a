//! Purpose: Interactive read-eval-print loop over a loaded record store.
//! Exports: `Shell`, `EXIT_COMMAND`.
//! Role: Reads one command per line, dispatches through a name registry, prints results.
//! Invariants: A failing command prints its message and the loop continues.
//! Invariants: `exit` (any case) or end of input ends the loop.
use std::io::{BufRead, Write};

use tracing::debug;

use crate::commands::{self, CommandFn, OutputFormat};
use crate::core::error::{Error, ErrorKind};
use crate::core::store::RecordStore;
use crate::core::table::KeyedTable;

pub const EXIT_COMMAND: &str = "exit";
const PROMPT: &str = "> ";
const FAREWELL: &str = "Goodbye!";
const UNKNOWN_COMMAND: &str = "Unknown command!";

pub struct Shell<'a> {
    store: &'a RecordStore,
    commands: KeyedTable<&'static str, CommandFn>,
}

impl<'a> Shell<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        let mut registry: KeyedTable<&'static str, CommandFn> = KeyedTable::new();
        let builtins: [(&'static str, CommandFn); 2] = [
            ("query", commands::query),
            ("indexquery", commands::index_query),
        ];
        for (name, command) in builtins {
            let inserted = registry.put(name, command);
            debug_assert!(matches!(inserted, Ok(None)), "command names are non-empty and distinct");
        }
        Self {
            store,
            commands: registry,
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|(name, _)| *name).collect()
    }

    /// Runs one line; `None` means the loop should stop.
    pub fn execute_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim())),
            None => (line, None),
        };
        if name.eq_ignore_ascii_case(EXIT_COMMAND) {
            return None;
        }
        let Some(command) = self.commands.get(name) else {
            return Some(UNKNOWN_COMMAND.to_string());
        };
        debug!(command = name, "shell command");
        Some(match command(self.store, arg, OutputFormat::Table) {
            Ok(output) => output.into_text(),
            Err(err) => failure_text(&err),
        })
    }

    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<(), Error> {
        let mut lines = input.lines();
        loop {
            write!(output, "{PROMPT}").map_err(write_error)?;
            output.flush().map_err(write_error)?;
            let Some(line) = lines.next() else {
                writeln!(output).map_err(write_error)?;
                break;
            };
            let line = line.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read command")
                    .with_source(err)
            })?;
            match self.execute_line(&line) {
                Some(text) => writeln!(output, "{text}").map_err(write_error)?,
                None => break,
            }
        }
        writeln!(output, "{FAREWELL}").map_err(write_error)
    }
}

fn failure_text(err: &Error) -> String {
    match err.message() {
        Some(message) => message.to_string(),
        None => err.to_string(),
    }
}

fn write_error(err: std::io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write shell output")
        .with_source(err)
}
