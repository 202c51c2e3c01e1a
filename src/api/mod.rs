//! Purpose: Define the public Rust API boundary for tabquery.
//! Exports: Core types and operations needed by the CLI and integration tests.
//! Role: Additive-only surface over the core modules.
//! Invariants: Callers load stores, compile queries, and execute them through these types.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::filter::{Filter, QueryFilter};
pub use crate::core::lexer::{LexerMode, Token, TokenKind, Tokenizer};
pub use crate::core::operator::ComparisonOperator;
pub use crate::core::parser::{ConditionalExpression, Query, parse_query};
pub use crate::core::record::{Record, RecordView};
pub use crate::core::schema::{Column, ColumnKind, FieldGetter, STUDENT_COLUMNS, Schema};
pub use crate::core::store::{Plan, QueryOutcome, RecordStore};
pub use crate::core::table::{KeyedTable, TableCursor, TableEntry, TableKey};
