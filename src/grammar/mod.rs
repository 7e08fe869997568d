// src/grammar/mod.rs
//! In-memory grammar tables: symbols, productions, character sets, the lexical
//! DFA, the LALR(1) states and lexical groups.
//!
//! Every cross reference is a `u16` index into one of the tables owned by
//! [`Grammar`]. A grammar is only handed out after [`Grammar::link`] has
//! checked all of them, so the lexer and parser index without re-checking.

pub mod io;
pub mod load;

use std::{fmt, io::BufRead, path::Path};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

// Re-exports to keep the external API flat.
pub use io::{
    load_grammar_egt_bytes, load_grammar_json_bytes, save_grammar_egt, save_grammar_json,
    write_grammar_egt,
};
pub use load::load;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum SymbolKind {
    Nonterminal = 0,
    /// Terminal passed to the parser.
    Content = 1,
    /// Terminal the parser skips (whitespace, comments).
    Noise = 2,
    End = 3,
    GroupStart = 4,
    GroupEnd = 5,
    // 6 was the retired comment-line kind.
    Error = 7,
}

impl SymbolKind {
    pub fn from_u16(v: u16) -> Option<Self> {
        use SymbolKind::*;
        Some(match v {
            0 => Nonterminal,
            1 => Content,
            2 => Noise,
            3 => End,
            4 => GroupStart,
            5 => GroupEnd,
            7 => Error,
            _ => return None,
        })
    }

    /// Kinds reported to the user as "expected" after a syntax error.
    pub fn is_expectable(self) -> bool {
        matches!(
            self,
            SymbolKind::Content | SymbolKind::End | SymbolKind::GroupStart | SymbolKind::GroupEnd
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub index: u16,
    pub name: String,
    pub kind: SymbolKind,
    /// Group this symbol starts, ends or contains.
    pub group: Option<u16>,
}

impl Symbol {
    /// BNF rendering: `<Name>` for nonterminals, a literal for content
    /// terminals and `(Name)` for everything else.
    pub fn text(&self) -> String {
        self.text_delimited(false)
    }

    /// Like [`Symbol::text`], optionally forcing quotes around every literal.
    pub fn text_delimited(&self, always_delimit: bool) -> String {
        match self.kind {
            SymbolKind::Nonterminal => format!("<{}>", self.name),
            SymbolKind::Content => literal_format(&self.name, always_delimit),
            _ => format!("({})", self.name),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

fn literal_format(name: &str, force: bool) -> String {
    if name == "'" {
        return "''".to_string();
    }
    let plain = |c: char| c.is_alphabetic() || matches!(c, '.' | '_' | '-');
    if force || !name.chars().all(plain) {
        format!("'{name}'")
    } else {
        name.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub index: u16,
    pub head: u16,
    pub body: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRange {
    pub start: u16,
    pub end: u16,
}

/// Inclusive code-unit ranges. Sets are small, so membership is a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSet {
    pub codepage: u16,
    pub ranges: Vec<CharacterRange>,
}

impl CharacterSet {
    pub fn contains(&self, c: char) -> bool {
        let code = c as u32;
        self.ranges
            .iter()
            .any(|r| (r.start as u32) <= code && code <= (r.end as u32))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaEdge {
    pub set: u16,
    pub target: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaState {
    pub accept: Option<u16>,
    /// Scanned in order; the first edge whose set holds the character wins.
    pub edges: Vec<DfaEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Shift(u16),
    Reduce(u16),
    Goto(u16),
    Accept,
    Error,
}

impl Action {
    /// Decodes the on-disk `(type, target)` pair.
    pub fn from_table(kind: u16, target: u16) -> Option<Self> {
        Some(match kind {
            1 => Action::Shift(target),
            2 => Action::Reduce(target),
            3 => Action::Goto(target),
            4 => Action::Accept,
            5 => Action::Error,
            _ => return None,
        })
    }

    pub fn to_table(self) -> (u16, u16) {
        match self {
            Action::Shift(t) => (1, t),
            Action::Reduce(p) => (2, p),
            Action::Goto(t) => (3, t),
            Action::Accept => (4, 0),
            Action::Error => (5, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LrAction {
    pub symbol: u16,
    pub action: Action,
}

/// Actions of one LALR state, kept in table order with a symbol lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LrState {
    actions: Vec<LrAction>,
    #[serde(skip)]
    lookup: HashMap<u16, usize>,
}

impl LrState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action; if `symbol` already has one, the first stays in effect.
    pub fn push(&mut self, symbol: u16, action: Action) {
        self.lookup.entry(symbol).or_insert(self.actions.len());
        self.actions.push(LrAction { symbol, action });
    }

    pub fn action(&self, symbol: u16) -> Option<Action> {
        self.lookup.get(&symbol).map(|&i| self.actions[i].action)
    }

    pub fn actions(&self) -> &[LrAction] {
        &self.actions
    }

    fn reindex(&mut self) {
        self.lookup.clear();
        for (i, a) in self.actions.iter().enumerate() {
            self.lookup.entry(a.symbol).or_insert(i);
        }
    }
}

impl PartialEq for LrState {
    fn eq(&self, other: &Self) -> bool {
        self.actions == other.actions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum AdvanceMode {
    /// Append whole tokens to the group text.
    Token = 0,
    /// Append one character at a time and re-lex.
    Character = 1,
}

impl AdvanceMode {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(AdvanceMode::Token),
            1 => Some(AdvanceMode::Character),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum EndingMode {
    /// The end symbol is left in the input (e.g. the newline ending a line comment).
    Open = 0,
    /// The end symbol is consumed into the group text.
    Closed = 1,
}

impl EndingMode {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(EndingMode::Open),
            1 => Some(EndingMode::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub index: u16,
    pub name: String,
    pub container: u16,
    pub start: u16,
    pub end: u16,
    pub advance: AdvanceMode,
    pub ending: EndingMode,
    /// Groups that may open while this one is on top of the group stack.
    pub nesting: Vec<u16>,
}

/// Names of the indexed properties, in index order.
pub const PROPERTY_NAMES: [&str; 8] = [
    "Name",
    "Version",
    "Author",
    "About",
    "Character Set",
    "Character Mapping",
    "Generated By",
    "Generated Date",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarProperties {
    values: [String; 8],
}

impl GrammarProperties {
    /// Indices outside the known property set are ignored.
    pub fn set(&mut self, index: u16, value: String) {
        if let Some(slot) = self.values.get_mut(index as usize) {
            *slot = value;
        } else {
            log::debug!("ignoring grammar property #{index} = {value:?}");
        }
    }

    pub fn get(&self, index: u16) -> Option<&str> {
        self.values.get(index as usize).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        PROPERTY_NAMES
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn name(&self) -> &str {
        &self.values[0]
    }
    pub fn version(&self) -> &str {
        &self.values[1]
    }
    pub fn author(&self) -> &str {
        &self.values[2]
    }
    pub fn about(&self) -> &str {
        &self.values[3]
    }
    pub fn character_set(&self) -> &str {
        &self.values[4]
    }
    pub fn character_mapping(&self) -> &str {
        &self.values[5]
    }
    pub fn generated_by(&self) -> &str {
        &self.values[6]
    }
    pub fn generated_date(&self) -> &str {
        &self.values[7]
    }
}

/// A loaded, validated grammar. Immutable once built, so one instance can be
/// shared by any number of parsers on any number of threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grammar {
    pub(crate) header: String,
    pub(crate) properties: GrammarProperties,
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) charsets: Vec<CharacterSet>,
    pub(crate) productions: Vec<Production>,
    pub(crate) dfa_states: Vec<DfaState>,
    pub(crate) lr_states: Vec<LrState>,
    pub(crate) groups: Vec<Group>,
    pub(crate) dfa_initial: u16,
    pub(crate) lr_initial: u16,
    #[serde(skip)]
    end_symbol: u16,
    #[serde(skip)]
    error_symbol: u16,
    #[serde(skip)]
    by_name: HashMap<String, u16>,
}

impl Grammar {
    /// Loads an EGT file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        log::debug!("loading grammar tables from {}", path.display());
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io { offset: 0, source })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LoadError> {
        load(crate::egt::EgtReader::open(reader)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        Self::from_reader(bytes)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_tables(
        header: String,
        properties: GrammarProperties,
        symbols: Vec<Symbol>,
        charsets: Vec<CharacterSet>,
        productions: Vec<Production>,
        dfa_states: Vec<DfaState>,
        lr_states: Vec<LrState>,
        groups: Vec<Group>,
        dfa_initial: u16,
        lr_initial: u16,
    ) -> Result<Self, LoadError> {
        let mut g = Grammar {
            header,
            properties,
            symbols,
            charsets,
            productions,
            dfa_states,
            lr_states,
            groups,
            dfa_initial,
            lr_initial,
            end_symbol: 0,
            error_symbol: 0,
            by_name: HashMap::new(),
        };
        g.link()?;
        Ok(g)
    }

    /// Re-stamps table indices, sets the symbol → group back-links, rebuilds
    /// the lookup maps and checks every cross reference.
    pub(crate) fn link(&mut self) -> Result<(), LoadError> {
        for (i, s) in self.symbols.iter_mut().enumerate() {
            s.index = i as u16;
            s.group = None;
        }
        for (i, p) in self.productions.iter_mut().enumerate() {
            p.index = i as u16;
        }
        for (i, g) in self.groups.iter_mut().enumerate() {
            g.index = i as u16;
        }
        for st in &mut self.lr_states {
            st.reindex();
        }

        self.validate()?;

        for g in &self.groups {
            for s in [g.container, g.start, g.end] {
                self.symbols[s as usize].group = Some(g.index);
            }
        }

        self.end_symbol = self
            .first_of_kind(SymbolKind::End)
            .ok_or(LoadError::MissingSymbol(SymbolKind::End))?
            .index;
        self.error_symbol = self
            .first_of_kind(SymbolKind::Error)
            .ok_or(LoadError::MissingSymbol(SymbolKind::Error))?
            .index;

        self.by_name.clear();
        for s in &self.symbols {
            self.by_name.entry(s.name.clone()).or_insert(s.index);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), LoadError> {
        fn check(owner: impl Fn() -> String, table: &'static str, index: u16, len: usize) -> Result<(), LoadError> {
            if (index as usize) < len {
                Ok(())
            } else {
                Err(LoadError::BadReference {
                    owner: owner(),
                    table,
                    index,
                })
            }
        }

        let n_sym = self.symbols.len();
        let n_set = self.charsets.len();
        let n_prod = self.productions.len();
        let n_dfa = self.dfa_states.len();
        let n_lr = self.lr_states.len();
        let n_group = self.groups.len();

        for p in &self.productions {
            let owner = || format!("production {}", p.index);
            check(owner, "symbol", p.head, n_sym)?;
            if self.symbols[p.head as usize].kind != SymbolKind::Nonterminal {
                return Err(LoadError::NonterminalHead {
                    production: p.index,
                    head: p.head,
                });
            }
            for &s in &p.body {
                check(owner, "symbol", s, n_sym)?;
            }
        }

        for (i, st) in self.dfa_states.iter().enumerate() {
            let owner = || format!("DFA state {i}");
            if let Some(a) = st.accept {
                check(owner, "symbol", a, n_sym)?;
            }
            for e in &st.edges {
                check(owner, "character set", e.set, n_set)?;
                check(owner, "DFA state", e.target, n_dfa)?;
            }
        }

        for (i, st) in self.lr_states.iter().enumerate() {
            let owner = || format!("LALR state {i}");
            for a in st.actions() {
                check(owner, "symbol", a.symbol, n_sym)?;
                match a.action {
                    Action::Shift(t) | Action::Goto(t) => check(owner, "LALR state", t, n_lr)?,
                    Action::Reduce(p) => check(owner, "production", p, n_prod)?,
                    Action::Accept | Action::Error => {}
                }
            }
        }

        for g in &self.groups {
            let owner = || format!("group {}", g.index);
            for s in [g.container, g.start, g.end] {
                check(owner, "symbol", s, n_sym)?;
            }
            for &n in &g.nesting {
                check(owner, "group", n, n_group)?;
            }
        }

        check(|| "initial states".into(), "DFA state", self.dfa_initial, n_dfa)?;
        check(|| "initial states".into(), "LALR state", self.lr_initial, n_lr)?;
        Ok(())
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn properties(&self) -> &GrammarProperties {
        &self.properties
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol(&self, index: u16) -> Option<&Symbol> {
        self.symbols.get(index as usize)
    }

    /// First symbol with the given name.
    pub fn symbol_by_name(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).map(|&i| &self.symbols[i as usize])
    }

    pub fn first_of_kind(&self, kind: SymbolKind) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.kind == kind)
    }

    pub fn end_symbol(&self) -> &Symbol {
        &self.symbols[self.end_symbol as usize]
    }

    pub fn error_symbol(&self) -> &Symbol {
        &self.symbols[self.error_symbol as usize]
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: u16) -> Option<&Production> {
        self.productions.get(index as usize)
    }

    /// `<Head> ::= body...` in BNF.
    pub fn production_text(&self, p: &Production) -> String {
        let mut out = format!("{} ::=", self.symbols[p.head as usize].text());
        for &s in &p.body {
            out.push(' ');
            out.push_str(&self.symbols[s as usize].text());
        }
        out
    }

    /// True for chain productions whose body is exactly one nonterminal.
    pub fn is_chain(&self, p: &Production) -> bool {
        matches!(p.body.as_slice(), [only] if self.symbols[*only as usize].kind == SymbolKind::Nonterminal)
    }

    pub fn charsets(&self) -> &[CharacterSet] {
        &self.charsets
    }

    pub fn dfa_states(&self) -> &[DfaState] {
        &self.dfa_states
    }

    pub fn dfa_initial(&self) -> u16 {
        self.dfa_initial
    }

    pub fn lr_states(&self) -> &[LrState] {
        &self.lr_states
    }

    pub fn lr_initial(&self) -> u16 {
        self.lr_initial
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, index: u16) -> Option<&Group> {
        self.groups.get(index as usize)
    }
}
