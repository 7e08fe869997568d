// src/egt/mod.rs
//! Typed-record framing of compiled grammar tables (EGT v5.0).
//!
//! A file is a zero-terminated UTF-16 header string followed by content
//! records. Each record is the byte `'M'`, a little-endian u16 entry count and
//! that many typed entries. This module knows nothing about grammars; see
//! [`crate::grammar::load`] for the record semantics.

pub mod reader;
pub mod writer;

pub use reader::EgtReader;
pub use writer::EgtWriter;

/// Header written by table generators for the v5.0 format.
pub const EGT_HEADER: &str = "GOLD Parser Tables/v5.0";

/// Tag byte of a multi-entry content record.
pub const RECORD_CONTENT_MULTI: u8 = b'M';

/// Type tag preceding every entry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryType {
    Empty = b'E',
    Boolean = b'B',
    UInt16 = b'I',
    String = b'S',
    Byte = b'b',
    Error = 0,
}

impl EntryType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            b'E' => EntryType::Empty,
            b'B' => EntryType::Boolean,
            b'I' => EntryType::UInt16,
            b'S' => EntryType::String,
            b'b' => EntryType::Byte,
            _ => return None,
        })
    }
}

/// One decoded entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Empty,
    Boolean(bool),
    UInt16(u16),
    String(String),
    Byte(u8),
}

impl Entry {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Entry::Empty => EntryType::Empty,
            Entry::Boolean(_) => EntryType::Boolean,
            Entry::UInt16(_) => EntryType::UInt16,
            Entry::String(_) => EntryType::String,
            Entry::Byte(_) => EntryType::Byte,
        }
    }
}

/// Record type byte: the first entry of every content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    Property = b'p',
    TableCounts = b't',
    InitialStates = b'I',
    Symbol = b'S',
    Production = b'R',
    DfaState = b'D',
    LrState = b'L',
    CharRanges = b'c',
    Group = b'g',
}

impl RecordType {
    pub fn from_byte(b: u8) -> Option<Self> {
        use RecordType::*;
        Some(match b {
            b'p' => Property,
            b't' => TableCounts,
            b'I' => InitialStates,
            b'S' => Symbol,
            b'R' => Production,
            b'D' => DfaState,
            b'L' => LrState,
            b'c' => CharRanges,
            b'g' => Group,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            RecordType::Property => "property",
            RecordType::TableCounts => "table counts",
            RecordType::InitialStates => "initial states",
            RecordType::Symbol => "symbol",
            RecordType::Production => "production",
            RecordType::DfaState => "DFA state",
            RecordType::LrState => "LALR state",
            RecordType::CharRanges => "character set",
            RecordType::Group => "group",
        }
    }
}
