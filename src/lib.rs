//! Purpose: Shared library crate used by the `tabquery` CLI and tests.
//! Exports: `core` (table, lexer, parser, store, errors), `api`, `commands`, `render`, `shell`.
//! Role: Library backing the binary; `api` is the supported import path.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
//! Invariants: Commands return their output as values; only the binary writes to stdout.
pub mod api;
pub mod commands;
pub mod core;
pub mod render;
pub mod shell;
