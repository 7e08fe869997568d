// src/error.rs
//! Error types for table loading and for the `parse_tree` driver.

use thiserror::Error;

use crate::{egt::EntryType, grammar::SymbolKind, token::Position};

/// Failure while reading or validating a compiled grammar table.
///
/// Loading is all-or-nothing: any of these aborts the load and no grammar is
/// produced.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error at byte {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("expected a content record ('M') at byte {offset}, found 0x{tag:02X}")]
    UnexpectedRecordTag { tag: u8, offset: u64 },

    #[error("unknown entry type 0x{tag:02X} at byte {offset}")]
    UnknownEntryType { tag: u8, offset: u64 },

    #[error("type mismatch at byte {offset}: expected {expected:?}, read {found:?}")]
    TypeMismatch {
        expected: EntryType,
        found: EntryType,
        offset: u64,
    },

    #[error("a record of type '{kind}' was read at byte {offset}; this is not a valid code")]
    UnknownRecord { kind: char, offset: u64 },

    #[error("'{record}' record read before the table counts")]
    TableCountsMissing { record: &'static str },

    #[error("{table} index {index} is out of range (table size {len})")]
    IndexOutOfRange {
        table: &'static str,
        index: u16,
        len: usize,
    },

    #[error("{table} slot {index} was never filled")]
    MissingEntry { table: &'static str, index: usize },

    #[error("{owner} refers to {table} {index}, which does not exist")]
    BadReference {
        owner: String,
        table: &'static str,
        index: u16,
    },

    #[error("invalid {what} value {value}")]
    InvalidValue { what: &'static str, value: u16 },

    #[error("production {production} has head symbol {head}, which is not a nonterminal")]
    NonterminalHead { production: u16, head: u16 },

    #[error("grammar has no {0:?} symbol")]
    MissingSymbol(SymbolKind),

    #[error("grammar JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The first halting condition met by [`Parser::parse_tree`](crate::parser::Parser::parse_tree).
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("lexical error at {position}: cannot recognize {text:?}")]
    Lexical { text: String, position: Position },

    #[error("syntax error at {position}: read {found}, expecting {}", .expected.join(" "))]
    Syntax {
        found: String,
        expected: Vec<String>,
        position: Position,
    },

    #[error("runaway group at {position}: end of input reached inside a group")]
    Group { position: Position },

    #[error("internal error at {position}: the parse tables are inconsistent")]
    Internal { position: Position },

    #[error("no input has been opened")]
    NotLoaded,
}
