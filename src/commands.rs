//! Purpose: The `query` and `indexquery` commands over a loaded record store.
//! Exports: `CommandOutput`, `OutputFormat`, `CommandFn`, `query`, `index_query`, `selection_json`.
//! Role: Shared by the CLI subcommands and the interactive shell.
//! Invariants: Commands return their output as values; they never print.
//! Invariants: A blank expression is rejected before the parser sees it.
use serde_json::{Value, json};

use crate::core::error::{Error, ErrorKind};
use crate::core::parser::Query;
use crate::core::record::{Record, RecordView};
use crate::core::schema::Schema;
use crate::core::store::{Plan, RecordStore};
use crate::render::render_records;

pub const INDEX_NOTICE: &str = "Using index for record retrieval.";

const QUERY_SYNTAX: &str = "query expression1 AND expression2 AND ...";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutput {
    Text(String),
    Json(Value),
}

impl CommandOutput {
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Json(value) => value.to_string(),
        }
    }
}

pub type CommandFn = fn(&RecordStore, Option<&str>, OutputFormat) -> Result<CommandOutput, Error>;

pub fn query(
    store: &RecordStore,
    expr: Option<&str>,
    format: OutputFormat,
) -> Result<CommandOutput, Error> {
    let text = require_expression(expr, QUERY_SYNTAX)?;
    let query = Query::compile(text, store.schema())?;
    let outcome = store.execute(&query)?;
    Ok(match format {
        OutputFormat::Json => {
            CommandOutput::Json(selection_json(store.schema(), outcome.plan, &outcome.records))
        }
        OutputFormat::Table => CommandOutput::Text(table_text(outcome.plan, &outcome.records)),
    })
}

pub fn index_query(
    store: &RecordStore,
    expr: Option<&str>,
    format: OutputFormat,
) -> Result<CommandOutput, Error> {
    let syntax = index_syntax(store.schema());
    let text = require_expression(expr, &syntax)?;
    let query = Query::compile(text, store.schema())?;
    let Some(key) = query.index_key() else {
        return Err(syntax_error(&syntax));
    };

    let records = store.lookup_by_key(key).into_iter().collect::<Vec<_>>();
    if format == OutputFormat::Json {
        return Ok(CommandOutput::Json(selection_json(
            store.schema(),
            Plan::IndexLookup,
            &records,
        )));
    }
    if records.is_empty() {
        return Ok(CommandOutput::Text(format!(
            "A record with the specified {} does not exist.",
            store.schema().primary_key().name
        )));
    }
    Ok(CommandOutput::Text(table_text(Plan::IndexLookup, &records)))
}

/// `{"plan": "index"|"scan", "selected": N, "records": [{column: value}, ...]}`
pub fn selection_json(schema: &Schema, plan: Plan, records: &[&Record]) -> Value {
    let views = records
        .iter()
        .map(|&record| RecordView { schema, record })
        .collect::<Vec<_>>();
    json!({
        "plan": plan.as_str(),
        "selected": records.len(),
        "records": views,
    })
}

fn table_text(plan: Plan, records: &[&Record]) -> String {
    let table = render_records(records);
    match plan {
        Plan::IndexLookup => format!("{INDEX_NOTICE}\n{table}"),
        Plan::Scan => table,
    }
}

fn require_expression<'a>(expr: Option<&'a str>, syntax: &str) -> Result<&'a str, Error> {
    match expr.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(syntax_error(syntax)),
    }
}

fn index_syntax(schema: &Schema) -> String {
    format!("indexquery {}=\"<value>\"", schema.primary_key().name)
}

fn syntax_error(syntax: &str) -> Error {
    Error::new(ErrorKind::Syntax).with_message(format!(
        "The syntax of the command is incorrect. Expected: {syntax}"
    ))
}
