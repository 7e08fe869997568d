//! Table loading: the model built from records, rejected files, and the
//! EGT / JSON round trips.

mod common;

use common::*;
use egtparse::{
    Grammar, LoadError, Parser, SymbolKind,
    egt::{EGT_HEADER, Entry, RecordType},
    grammar::{
        Action, AdvanceMode, EndingMode, load_grammar_egt_bytes, load_grammar_json_bytes,
        write_grammar_egt,
    },
    parser::tree::tree_to_json,
};
use rayon::prelude::*;

fn load(records: &[Vec<Entry>]) -> Result<Grammar, LoadError> {
    Grammar::from_bytes(&encode(EGT_HEADER, records))
}

#[test]
fn fixture_loads_into_the_expected_model() {
    let g = calc_grammar(true);
    assert_eq!(g.header(), EGT_HEADER);
    assert_eq!(g.properties().name(), "Calc");
    assert_eq!(g.properties().generated_by(), "hand");
    assert_eq!(g.symbols().len(), 10);
    assert_eq!(g.end_symbol().index, EOF);
    assert_eq!(g.error_symbol().index, ERROR);
    assert_eq!(g.symbol_by_name("Comment").map(|s| s.kind), Some(SymbolKind::Noise));

    let grp = g.group(0).unwrap();
    assert_eq!(grp.name, "Comment Block");
    assert_eq!((grp.advance, grp.ending), (AdvanceMode::Character, EndingMode::Closed));
    assert_eq!(grp.nesting, vec![0]);
    for s in [COMMENT, COMMENT_START, COMMENT_END] {
        assert_eq!(g.symbol(s).unwrap().group, Some(0));
    }
    assert_eq!(g.symbol(ID).unwrap().group, None);

    let texts: Vec<String> = g.productions().iter().map(|p| g.production_text(p)).collect();
    assert_eq!(texts, vec!["<E> ::= <E> '+' <T>", "<E> ::= <T>", "<T> ::= id"]);
    assert!(g.is_chain(&g.productions()[1]));
    assert!(!g.is_chain(&g.productions()[2]));

    assert_eq!(g.lr_states()[1].action(PLUS), Some(Action::Shift(4)));
    assert_eq!(g.lr_states()[1].action(EOF), Some(Action::Accept));
    assert_eq!(g.dfa_states()[2].accept, Some(ID));
}

#[test]
fn records_may_arrive_in_any_order() {
    let mut records = calc_records(false);
    // keep properties, counts and initial states up front
    records[4..].reverse();
    let g = load(&records).unwrap();
    assert_eq!(g.productions().len(), 3);
    let mut p = Parser::new(&g);
    p.open("a+b");
    assert!(p.parse_tree().is_ok());
}

#[test]
fn other_headers_load_with_a_warning() {
    let g = Grammar::from_bytes(&encode("GOLD Parser Tables/v1.0", &calc_records(false))).unwrap();
    assert_eq!(g.header(), "GOLD Parser Tables/v1.0");
}

#[test]
fn indexed_record_before_counts_is_rejected() {
    let mut records = calc_records(false);
    let counts = records.iter().position(|r| is_record(r, RecordType::TableCounts)).unwrap();
    let r = records.remove(counts);
    records.push(r);
    assert!(matches!(
        load(&records),
        Err(LoadError::TableCountsMissing { record: "character set" })
    ));

    records.retain(|r| !is_record(r, RecordType::TableCounts));
    assert!(matches!(load(&records), Err(LoadError::TableCountsMissing { .. })));
}

#[test]
fn unknown_record_type_is_rejected() {
    let mut records = calc_records(false);
    records.push(vec![Entry::Byte(b'Z'), Entry::UInt16(0)]);
    assert!(matches!(load(&records), Err(LoadError::UnknownRecord { kind: 'Z', .. })));
}

#[test]
fn wrong_entry_type_is_a_type_mismatch() {
    let mut records = calc_records(false);
    let sym = records.iter_mut().find(|r| is_record(r, RecordType::Symbol)).unwrap();
    sym[3] = Entry::String("three".into());
    assert!(matches!(load(&records), Err(LoadError::TypeMismatch { .. })));
}

#[test]
fn index_past_the_declared_count_is_rejected() {
    let mut records = calc_records(false);
    records.push(vec![
        Entry::Byte(RecordType::Symbol as u8),
        Entry::UInt16(10),
        Entry::String("extra".into()),
        Entry::UInt16(1),
    ]);
    assert!(matches!(
        load(&records),
        Err(LoadError::IndexOutOfRange { table: "symbol", index: 10, len: 10 })
    ));
}

#[test]
fn unfilled_slot_is_rejected() {
    let mut records = calc_records(false);
    records.retain(|r| !(is_record(r, RecordType::DfaState) && r[1] == Entry::UInt16(7)));
    assert!(matches!(
        load(&records),
        Err(LoadError::MissingEntry { table: "DFA state", index: 7 })
    ));
}

#[test]
fn dangling_reference_is_rejected() {
    let mut records = calc_records(false);
    let prod = records.iter_mut().find(|r| is_record(r, RecordType::Production)).unwrap();
    prod.push(Entry::UInt16(99));
    assert!(matches!(
        load(&records),
        Err(LoadError::BadReference { table: "symbol", index: 99, .. })
    ));
}

#[test]
fn production_head_must_be_a_nonterminal() {
    let mut records = calc_records(false);
    let prod = records.iter_mut().find(|r| is_record(r, RecordType::Production)).unwrap();
    prod[2] = Entry::UInt16(PLUS);
    assert!(matches!(
        load(&records),
        Err(LoadError::NonterminalHead { production: 0, head: PLUS })
    ));
}

#[test]
fn invalid_action_code_is_rejected() {
    let mut records = calc_records(false);
    let st = records.iter_mut().find(|r| is_record(r, RecordType::LrState)).unwrap();
    // first action's type entry
    st[4] = Entry::UInt16(9);
    assert!(matches!(load(&records), Err(LoadError::InvalidValue { value: 9, .. })));
}

#[test]
fn grammar_without_an_error_symbol_is_rejected() {
    let mut records = calc_records(false);
    let sym = records
        .iter_mut()
        .find(|r| is_record(r, RecordType::Symbol) && r[1] == Entry::UInt16(ERROR))
        .unwrap();
    sym[3] = Entry::UInt16(1);
    assert!(matches!(load(&records), Err(LoadError::MissingSymbol(SymbolKind::Error))));
}

#[test]
fn truncated_file_is_an_io_error() {
    let bytes = calc_egt(false);
    for cut in [1, 3] {
        let r = Grammar::from_bytes(&bytes[..bytes.len() - cut]);
        assert!(matches!(r, Err(LoadError::Io { .. })), "cut {cut}: {r:?}");
    }
}

#[test]
fn every_prefix_of_a_table_file_is_rejected() {
    let bytes = calc_egt(true);
    for len in 0..bytes.len() {
        assert!(Grammar::from_bytes(&bytes[..len]).is_err(), "prefix of {len} bytes loaded");
    }
}

#[test]
fn egt_round_trip_preserves_the_model() {
    let g = calc_grammar(true);
    let mut bytes = Vec::new();
    write_grammar_egt(&mut bytes, &g).unwrap();
    let back = load_grammar_egt_bytes(&bytes).unwrap();

    assert_eq!(back.header(), g.header());
    assert_eq!(back.properties(), g.properties());
    assert_eq!(back.symbols(), g.symbols());
    assert_eq!(back.charsets(), g.charsets());
    assert_eq!(back.productions(), g.productions());
    assert_eq!(back.dfa_states(), g.dfa_states());
    assert_eq!(back.lr_states(), g.lr_states());
    assert_eq!(back.groups(), g.groups());
    assert_eq!(
        (back.dfa_initial(), back.lr_initial()),
        (g.dfa_initial(), g.lr_initial())
    );

    // re-encoding is stable
    let mut again = Vec::new();
    write_grammar_egt(&mut again, &back).unwrap();
    assert_eq!(again, bytes);
}

#[test]
fn json_round_trip_rebuilds_lookups() {
    let g = calc_grammar(true);
    let json = serde_json::to_vec(&g).unwrap();
    let back = load_grammar_json_bytes(&json).unwrap();
    assert_eq!(back.symbols(), g.symbols());
    assert_eq!(back.lr_states()[1].action(PLUS), Some(Action::Shift(4)));
    assert_eq!(back.symbol_by_name("id").map(|s| s.index), Some(ID));
    assert_eq!(back.end_symbol().index, EOF);

    let mut p = Parser::new(&back);
    p.open("a + /* c */ b");
    assert!(p.parse_tree().is_ok());
}

#[test]
fn json_with_dangling_reference_is_rejected() {
    let g = calc_grammar(false);
    let mut v = serde_json::to_value(&g).unwrap();
    v["dfa_initial"] = serde_json::json!(42);
    let bytes = serde_json::to_vec(&v).unwrap();
    assert!(matches!(
        load_grammar_json_bytes(&bytes),
        Err(LoadError::BadReference { table: "DFA state", index: 42, .. })
    ));
    assert!(matches!(load_grammar_json_bytes(b"{"), Err(LoadError::Json(_))));
}

#[test]
fn one_grammar_serves_parallel_parsers() {
    let g = calc_grammar(true);
    let inputs: Vec<String> = (0..64)
        .map(|i| {
            (0..=i % 9)
                .map(|k| "x".repeat(k + 1))
                .collect::<Vec<_>>()
                .join(" + /* c /* n */ */ ")
        })
        .collect();

    let trees: Vec<serde_json::Value> = inputs
        .par_iter()
        .map(|src| {
            let mut p = Parser::new(&g);
            p.set_trim_reductions(true);
            p.open(src);
            let root = p.parse_tree().unwrap();
            tree_to_json(&g, &root)
        })
        .collect();

    for (src, tree) in inputs.iter().zip(&trees) {
        let mut p = Parser::new(&g);
        p.set_trim_reductions(true);
        p.open(src);
        let root = p.parse_tree().unwrap();
        assert_eq!(&tree_to_json(&g, &root), tree, "input {src:?}");
    }
}
