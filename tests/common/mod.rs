// tests/common/mod.rs
//! Shared fixtures: a small expression grammar in EGT form.
//!
//! Symbols: 0 EOF, 1 Error, 2 Whitespace, 3 '+', 4 id, 5 <E>, 6 <T>,
//! 7 "/*", 8 "*/", 9 Comment.
//! Productions: 0 `<E> ::= <E> '+' <T>`, 1 `<E> ::= <T>`, 2 `<T> ::= id`.
//! Block comments form group 0; `nest` lets it open inside itself.
#![allow(dead_code)]

use egtparse::{
    Grammar, ParseMessage, Parser, Token,
    egt::{EGT_HEADER, EgtWriter, Entry, RecordType},
};

pub const EOF: u16 = 0;
pub const ERROR: u16 = 1;
pub const WS: u16 = 2;
pub const PLUS: u16 = 3;
pub const ID: u16 = 4;
pub const E: u16 = 5;
pub const T: u16 = 6;
pub const COMMENT_START: u16 = 7;
pub const COMMENT_END: u16 = 8;
pub const COMMENT: u16 = 9;

fn u(v: u16) -> Entry {
    Entry::UInt16(v)
}

fn rec(kind: RecordType, rest: impl IntoIterator<Item = Entry>) -> Vec<Entry> {
    let mut r = vec![Entry::Byte(kind as u8)];
    r.extend(rest);
    r
}

fn symbol(index: u16, name: &str, kind: u16) -> Vec<Entry> {
    rec(RecordType::Symbol, [u(index), Entry::String(name.into()), u(kind)])
}

fn charset(index: u16, ranges: &[(char, char)]) -> Vec<Entry> {
    let mut r = rec(
        RecordType::CharRanges,
        [u(index), u(0), u(ranges.len() as u16), Entry::Empty],
    );
    for &(a, b) in ranges {
        r.extend([u(a as u16), u(b as u16)]);
    }
    r
}

fn dfa(index: u16, accept: Option<u16>, edges: &[(u16, u16)]) -> Vec<Entry> {
    let mut r = rec(
        RecordType::DfaState,
        [
            u(index),
            Entry::Boolean(accept.is_some()),
            u(accept.unwrap_or(0)),
            Entry::Empty,
        ],
    );
    for &(set, target) in edges {
        r.extend([u(set), u(target), Entry::Empty]);
    }
    r
}

fn production(index: u16, head: u16, body: &[u16]) -> Vec<Entry> {
    let mut r = rec(RecordType::Production, [u(index), u(head), Entry::Empty]);
    r.extend(body.iter().map(|&s| u(s)));
    r
}

/// `(symbol, action code, target)` triples.
fn lalr(index: u16, actions: &[(u16, u16, u16)]) -> Vec<Entry> {
    let mut r = rec(RecordType::LrState, [u(index), Entry::Empty]);
    for &(symbol, kind, target) in actions {
        r.extend([u(symbol), u(kind), u(target), Entry::Empty]);
    }
    r
}

const SHIFT: u16 = 1;
const REDUCE: u16 = 2;
const GOTO: u16 = 3;
const ACCEPT: u16 = 4;

/// Records of the expression grammar, in file order after the header.
pub fn calc_records(nest: bool) -> Vec<Vec<Entry>> {
    let mut out = vec![
        rec(
            RecordType::Property,
            [u(0), Entry::String("Name".into()), Entry::String("Calc".into())],
        ),
        rec(
            RecordType::Property,
            [u(6), Entry::String("Generated By".into()), Entry::String("hand".into())],
        ),
        // symbols, charsets, productions, DFA, LALR, groups
        rec(RecordType::TableCounts, [u(10), u(5), u(3), u(8), u(6), u(1)]),
        rec(RecordType::InitialStates, [u(0), u(0)]),
    ];

    out.extend([
        charset(0, &[('\t', '\n'), ('\r', '\r'), (' ', ' ')]),
        charset(1, &[('a', 'z')]),
        charset(2, &[('+', '+')]),
        charset(3, &[('/', '/')]),
        charset(4, &[('*', '*')]),
    ]);

    out.extend([
        symbol(EOF, "EOF", 3),
        symbol(ERROR, "Error", 7),
        symbol(WS, "Whitespace", 2),
        symbol(PLUS, "+", 1),
        symbol(ID, "id", 1),
        symbol(E, "E", 0),
        symbol(T, "T", 0),
        symbol(COMMENT_START, "/*", 4),
        symbol(COMMENT_END, "*/", 5),
        symbol(COMMENT, "Comment", 2),
    ]);

    let nesting: Vec<u16> = if nest { vec![0] } else { Vec::new() };
    let mut group = rec(
        RecordType::Group,
        [
            u(0),
            Entry::String("Comment Block".into()),
            u(COMMENT),
            u(COMMENT_START),
            u(COMMENT_END),
            u(1), // advance by character
            u(1), // closed
            Entry::Empty,
            u(nesting.len() as u16),
        ],
    );
    group.extend(nesting.into_iter().map(u));
    out.push(group);

    out.extend([
        production(0, E, &[E, PLUS, T]),
        production(1, E, &[T]),
        production(2, T, &[ID]),
    ]);

    out.extend([
        dfa(0, None, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 6)]),
        dfa(1, Some(WS), &[(0, 1)]),
        dfa(2, Some(ID), &[(1, 2)]),
        dfa(3, Some(PLUS), &[]),
        dfa(4, None, &[(4, 5)]),
        dfa(5, Some(COMMENT_START), &[]),
        dfa(6, None, &[(3, 7)]),
        dfa(7, Some(COMMENT_END), &[]),
    ]);

    out.extend([
        lalr(0, &[(ID, SHIFT, 3), (E, GOTO, 1), (T, GOTO, 2)]),
        lalr(1, &[(EOF, ACCEPT, 0), (PLUS, SHIFT, 4)]),
        lalr(2, &[(EOF, REDUCE, 1), (PLUS, REDUCE, 1)]),
        lalr(3, &[(EOF, REDUCE, 2), (PLUS, REDUCE, 2)]),
        lalr(4, &[(ID, SHIFT, 3), (T, GOTO, 5)]),
        lalr(5, &[(EOF, REDUCE, 0), (PLUS, REDUCE, 0)]),
    ]);
    out
}

pub fn encode(header: &str, records: &[Vec<Entry>]) -> Vec<u8> {
    let mut w = EgtWriter::new(Vec::new());
    w.write_header(header).unwrap();
    for r in records {
        w.write_record(r).unwrap();
    }
    w.into_inner()
}

pub fn calc_egt(nest: bool) -> Vec<u8> {
    encode(EGT_HEADER, &calc_records(nest))
}

pub fn load_records(records: &[Vec<Entry>]) -> Grammar {
    Grammar::from_bytes(&encode(EGT_HEADER, records)).expect("patched grammar loads")
}

pub fn is_record(r: &[Entry], kind: RecordType) -> bool {
    matches!(r.first(), Some(Entry::Byte(b)) if *b == kind as u8)
}

/// Rewrites the comment group's advance (0 token, 1 character) and ending
/// (0 open, 1 closed) modes.
pub fn set_group_modes(records: &mut [Vec<Entry>], advance: u16, ending: u16) {
    let group = records
        .iter_mut()
        .find(|r| is_record(r, RecordType::Group))
        .expect("fixture has a group record");
    group[6] = u(advance);
    group[7] = u(ending);
}

/// Mutable access to the record of LALR state `index`.
pub fn lalr_record(records: &mut [Vec<Entry>], index: u16) -> &mut Vec<Entry> {
    records
        .iter_mut()
        .find(|r| is_record(r, RecordType::LrState) && r[1] == u(index))
        .expect("fixture has the LALR state")
}

pub fn calc_grammar(nest: bool) -> Grammar {
    Grammar::from_bytes(&calc_egt(nest)).expect("fixture grammar loads")
}

/// Runs `parse` until a final message, collecting every message on the way.
pub fn drive(p: &mut Parser<'_>) -> Vec<ParseMessage> {
    let mut out = Vec::new();
    for _ in 0..10_000 {
        let m = p.parse();
        out.push(m);
        if m.is_final() {
            return out;
        }
    }
    panic!("parser did not terminate: {:?}", &out[out.len() - 10..]);
}

/// Compact rendering of a tree: `(Head child...)` for reductions, the text for
/// terminals. With `inline_chains`, a chain reduction is replaced by its only
/// child relabelled with the chain's head.
pub fn shape(g: &Grammar, t: &Token, inline_chains: bool) -> String {
    shape_as(g, t, t.symbol, inline_chains)
}

fn shape_as(g: &Grammar, t: &Token, symbol: u16, inline_chains: bool) -> String {
    let Some(r) = t.reduction() else {
        return t.text().unwrap_or_default().to_string();
    };
    let p = g.production(r.production()).unwrap();
    if inline_chains && g.is_chain(p) {
        return shape_as(g, &r[0], symbol, inline_chains);
    }
    let mut out = format!("({}", g.symbol(symbol).unwrap().name);
    for c in r.children() {
        out.push(' ');
        out.push_str(&shape(g, c, inline_chains));
    }
    out.push(')');
    out
}
