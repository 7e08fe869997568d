// src/grammar/load.rs
// Record-by-record loader. The table-counts record pre-sizes fixed slot
// tables; every indexed record then fills one slot by absolute index, so
// records of one type may arrive in any order.

use std::io::BufRead;

use super::{
    Action, AdvanceMode, CharacterRange, CharacterSet, DfaEdge, DfaState, EndingMode, Grammar,
    GrammarProperties, Group, LrState, Production, Symbol, SymbolKind,
};
use crate::{
    egt::{EGT_HEADER, EgtReader, RecordType},
    error::LoadError,
};

struct Slots<T> {
    table: &'static str,
    slots: Vec<Option<T>>,
}

impl<T> Slots<T> {
    fn with_len(table: &'static str, len: u16) -> Self {
        let mut slots = Vec::with_capacity(len as usize);
        slots.resize_with(len as usize, || None);
        Self { table, slots }
    }

    fn fill(&mut self, index: u16, value: T) -> Result<(), LoadError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(LoadError::IndexOutOfRange {
                table: self.table,
                index,
                len,
            })?;
        if slot.is_some() {
            log::warn!("{} {index} defined twice; keeping the later record", self.table);
        }
        *slot = Some(value);
        Ok(())
    }

    fn finish(self) -> Result<Vec<T>, LoadError> {
        let table = self.table;
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, s)| s.ok_or(LoadError::MissingEntry { table, index }))
            .collect()
    }
}

struct Tables {
    symbols: Slots<Symbol>,
    charsets: Slots<CharacterSet>,
    productions: Slots<Production>,
    dfa_states: Slots<DfaState>,
    lr_states: Slots<LrState>,
    groups: Slots<Group>,
}

fn enum_value<T>(what: &'static str, value: u16, parse: fn(u16) -> Option<T>) -> Result<T, LoadError> {
    parse(value).ok_or(LoadError::InvalidValue { what, value })
}

/// Reads every record from `reader` and builds a validated [`Grammar`].
pub fn load<R: BufRead>(mut reader: EgtReader<R>) -> Result<Grammar, LoadError> {
    let header = reader.header().to_string();
    if header != EGT_HEADER {
        log::warn!("unexpected table header {header:?}; expected {EGT_HEADER:?}");
    }

    let mut properties = GrammarProperties::default();
    let mut tables: Option<Tables> = None;
    let mut dfa_initial = 0;
    let mut lr_initial = 0;
    let mut records = 0usize;

    while reader.next_record()? {
        records += 1;
        let offset = reader.offset();
        let kind = reader.read_byte()?;
        let record = RecordType::from_byte(kind).ok_or(LoadError::UnknownRecord {
            kind: char::from(kind),
            offset,
        })?;

        match record {
            RecordType::Property => {
                let index = reader.read_u16()?;
                let _name = reader.read_string()?;
                properties.set(index, reader.read_string()?);
            }
            RecordType::TableCounts => {
                let symbols = reader.read_u16()?;
                let charsets = reader.read_u16()?;
                let productions = reader.read_u16()?;
                let dfa_states = reader.read_u16()?;
                let lr_states = reader.read_u16()?;
                let groups = reader.read_u16()?;
                log::debug!(
                    "table counts: {symbols} symbols, {charsets} sets, {productions} productions, \
                     {dfa_states} DFA states, {lr_states} LALR states, {groups} groups"
                );
                tables = Some(Tables {
                    symbols: Slots::with_len("symbol", symbols),
                    charsets: Slots::with_len("character set", charsets),
                    productions: Slots::with_len("production", productions),
                    dfa_states: Slots::with_len("DFA state", dfa_states),
                    lr_states: Slots::with_len("LALR state", lr_states),
                    groups: Slots::with_len("group", groups),
                });
            }
            RecordType::InitialStates => {
                dfa_initial = reader.read_u16()?;
                lr_initial = reader.read_u16()?;
            }
            _ => {
                let t = tables.as_mut().ok_or(LoadError::TableCountsMissing {
                    record: record.name(),
                })?;
                read_indexed(&mut reader, record, t)?;
            }
        }
    }

    let t = tables.ok_or(LoadError::TableCountsMissing {
        record: "end of file",
    })?;
    let grammar = Grammar::from_tables(
        header,
        properties,
        t.symbols.finish()?,
        t.charsets.finish()?,
        t.productions.finish()?,
        t.dfa_states.finish()?,
        t.lr_states.finish()?,
        t.groups.finish()?,
        dfa_initial,
        lr_initial,
    )?;

    log::debug!(
        "loaded grammar {:?} from {records} records ({} symbols, {} productions, {} DFA / {} LALR states)",
        grammar.properties().name(),
        grammar.symbols().len(),
        grammar.productions().len(),
        grammar.dfa_states().len(),
        grammar.lr_states().len(),
    );
    Ok(grammar)
}

fn read_indexed<R: BufRead>(
    reader: &mut EgtReader<R>,
    record: RecordType,
    t: &mut Tables,
) -> Result<(), LoadError> {
    match record {
        RecordType::Symbol => {
            // #, Name, Kind
            let index = reader.read_u16()?;
            let name = reader.read_string()?;
            let kind = enum_value("symbol kind", reader.read_u16()?, SymbolKind::from_u16)?;
            t.symbols.fill(
                index,
                Symbol {
                    index,
                    name,
                    kind,
                    group: None,
                },
            )
        }
        RecordType::Group => {
            // #, Name, Container#, Start#, End#, Advance, Ending, Reserved, Count, Nested#...
            let index = reader.read_u16()?;
            let name = reader.read_string()?;
            let container = reader.read_u16()?;
            let start = reader.read_u16()?;
            let end = reader.read_u16()?;
            let advance = enum_value("group advance mode", reader.read_u16()?, AdvanceMode::from_u16)?;
            let ending = enum_value("group ending mode", reader.read_u16()?, EndingMode::from_u16)?;
            reader.read_entry()?;
            let count = reader.read_u16()?;
            let nesting = (0..count)
                .map(|_| reader.read_u16())
                .collect::<Result<Vec<_>, _>>()?;
            t.groups.fill(
                index,
                Group {
                    index,
                    name,
                    container,
                    start,
                    end,
                    advance,
                    ending,
                    nesting,
                },
            )
        }
        RecordType::CharRanges => {
            // #, Codepage, Total, Reserved, (Start, End)...
            let index = reader.read_u16()?;
            let codepage = reader.read_u16()?;
            let total = reader.read_u16()?;
            reader.read_entry()?;
            let mut ranges = Vec::with_capacity(total as usize);
            while !reader.record_complete() {
                let start = reader.read_u16()?;
                let end = reader.read_u16()?;
                ranges.push(CharacterRange { start, end });
            }
            if ranges.len() != total as usize {
                log::warn!(
                    "character set {index} declares {total} ranges but holds {}",
                    ranges.len()
                );
            }
            t.charsets.fill(index, CharacterSet { codepage, ranges })
        }
        RecordType::Production => {
            // #, Head#, Reserved, Symbol#...
            let index = reader.read_u16()?;
            let head = reader.read_u16()?;
            reader.read_entry()?;
            let mut body = Vec::new();
            while !reader.record_complete() {
                body.push(reader.read_u16()?);
            }
            t.productions.fill(index, Production { index, head, body })
        }
        RecordType::DfaState => {
            // #, Accept?, Accept#, Reserved, (Set#, Target#, Reserved)...
            let index = reader.read_u16()?;
            let accepts = reader.read_bool()?;
            let accept_index = reader.read_u16()?;
            reader.read_entry()?;
            let mut edges = Vec::new();
            while !reader.record_complete() {
                let set = reader.read_u16()?;
                let target = reader.read_u16()?;
                reader.read_entry()?;
                edges.push(DfaEdge { set, target });
            }
            let accept = accepts.then_some(accept_index);
            t.dfa_states.fill(index, DfaState { accept, edges })
        }
        RecordType::LrState => {
            // #, Reserved, (Symbol#, Action, Target#, Reserved)...
            let index = reader.read_u16()?;
            reader.read_entry()?;
            let mut state = LrState::new();
            while !reader.record_complete() {
                let symbol = reader.read_u16()?;
                let kind = reader.read_u16()?;
                let target = reader.read_u16()?;
                reader.read_entry()?;
                let action = Action::from_table(kind, target).ok_or(LoadError::InvalidValue {
                    what: "LALR action",
                    value: kind,
                })?;
                state.push(symbol, action);
            }
            t.lr_states.fill(index, state)
        }
        // read directly by load()
        RecordType::Property | RecordType::TableCounts | RecordType::InitialStates => Ok(()),
    }
}
