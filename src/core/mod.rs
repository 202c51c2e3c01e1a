// Core modules implementing the keyed table, query language, and record store.
pub mod collation;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod operator;
pub mod parser;
pub mod record;
pub mod schema;
pub mod store;
pub mod table;
