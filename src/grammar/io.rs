// src/grammar/io.rs
use std::io::{BufWriter, Write};

use super::Grammar;
use crate::{
    egt::{EGT_HEADER, EgtWriter, Entry, RecordType},
    error::LoadError,
};

// -------------------- JSON (de)serialization --------------------

pub fn save_grammar_json(path: &std::path::Path, g: &Grammar) -> std::io::Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, g)?;
    w.flush()
}

/// Parses a JSON dump and runs the same validation as the table loader.
pub fn load_grammar_json_bytes(data: &[u8]) -> Result<Grammar, LoadError> {
    let mut g: Grammar = serde_json::from_slice(data)?;
    g.link()?;
    Ok(g)
}

// -------------------- EGT tables --------------------

pub fn save_grammar_egt(path: &std::path::Path, g: &Grammar) -> std::io::Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    write_grammar_egt(&mut w, g)?;
    w.flush()
}

pub fn load_grammar_egt_bytes(data: &[u8]) -> Result<Grammar, LoadError> {
    Grammar::from_bytes(data)
}

fn record(kind: RecordType) -> Vec<Entry> {
    vec![Entry::Byte(kind as u8)]
}

/// Serializes `g` in the v5.0 record layout the loader reads.
pub fn write_grammar_egt<W: Write>(w: W, g: &Grammar) -> std::io::Result<()> {
    let mut out = EgtWriter::new(w);
    out.write_header(EGT_HEADER)?;

    for (i, (name, value)) in g.properties().iter().enumerate() {
        let mut r = record(RecordType::Property);
        r.extend([
            Entry::UInt16(i as u16),
            Entry::String(name.to_string()),
            Entry::String(value.to_string()),
        ]);
        out.write_record(&r)?;
    }

    let count = |n: usize| Entry::UInt16(n as u16);
    let mut r = record(RecordType::TableCounts);
    r.extend([
        count(g.symbols.len()),
        count(g.charsets.len()),
        count(g.productions.len()),
        count(g.dfa_states.len()),
        count(g.lr_states.len()),
        count(g.groups.len()),
    ]);
    out.write_record(&r)?;

    let mut r = record(RecordType::InitialStates);
    r.extend([Entry::UInt16(g.dfa_initial), Entry::UInt16(g.lr_initial)]);
    out.write_record(&r)?;

    for (i, cs) in g.charsets.iter().enumerate() {
        let mut r = record(RecordType::CharRanges);
        r.extend([
            count(i),
            Entry::UInt16(cs.codepage),
            count(cs.ranges.len()),
            Entry::Empty,
        ]);
        for range in &cs.ranges {
            r.extend([Entry::UInt16(range.start), Entry::UInt16(range.end)]);
        }
        out.write_record(&r)?;
    }

    for s in &g.symbols {
        let mut r = record(RecordType::Symbol);
        r.extend([
            Entry::UInt16(s.index),
            Entry::String(s.name.clone()),
            Entry::UInt16(s.kind as u16),
        ]);
        out.write_record(&r)?;
    }

    for grp in &g.groups {
        let mut r = record(RecordType::Group);
        r.extend([
            Entry::UInt16(grp.index),
            Entry::String(grp.name.clone()),
            Entry::UInt16(grp.container),
            Entry::UInt16(grp.start),
            Entry::UInt16(grp.end),
            Entry::UInt16(grp.advance as u16),
            Entry::UInt16(grp.ending as u16),
            Entry::Empty,
            count(grp.nesting.len()),
        ]);
        r.extend(grp.nesting.iter().map(|&n| Entry::UInt16(n)));
        out.write_record(&r)?;
    }

    for p in &g.productions {
        let mut r = record(RecordType::Production);
        r.extend([Entry::UInt16(p.index), Entry::UInt16(p.head), Entry::Empty]);
        r.extend(p.body.iter().map(|&s| Entry::UInt16(s)));
        out.write_record(&r)?;
    }

    for (i, st) in g.dfa_states.iter().enumerate() {
        let mut r = record(RecordType::DfaState);
        r.extend([
            count(i),
            Entry::Boolean(st.accept.is_some()),
            Entry::UInt16(st.accept.unwrap_or(0)),
            Entry::Empty,
        ]);
        for e in &st.edges {
            r.extend([Entry::UInt16(e.set), Entry::UInt16(e.target), Entry::Empty]);
        }
        out.write_record(&r)?;
    }

    for (i, st) in g.lr_states.iter().enumerate() {
        let mut r = record(RecordType::LrState);
        r.extend([count(i), Entry::Empty]);
        for a in st.actions() {
            let (kind, target) = a.action.to_table();
            r.extend([
                Entry::UInt16(a.symbol),
                Entry::UInt16(kind),
                Entry::UInt16(target),
                Entry::Empty,
            ]);
        }
        out.write_record(&r)?;
    }

    out.flush()
}
