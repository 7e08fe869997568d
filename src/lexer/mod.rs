// src/lexer/mod.rs
//! Table-driven lexer: a longest-match DFA ([`dfa`]) under a lexical group
//! layer ([`group`]) that assembles comments, strings and other bracketed
//! regions into single tokens.

pub mod dfa;
pub mod group;

use std::collections::VecDeque;

use crate::{
    grammar::Grammar,
    token::{Position, Token},
};

/// An open group on the group stack: the text gathered so far and where it began.
#[derive(Debug, Clone)]
struct GroupFrame {
    group: u16,
    text: String,
    position: Position,
}

/// Lexer state for one input. The grammar is shared and read-only; the
/// lookahead buffer, position counters and group stack belong to this lexer.
pub struct Lexer<'g> {
    grammar: &'g Grammar,
    source: Box<dyn Iterator<Item = char> + 'g>,
    buffer: VecDeque<char>,
    position: Position,
    groups: Vec<GroupFrame>,
}

impl<'g> Lexer<'g> {
    /// A lexer with no input; it yields only the end symbol until opened.
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            source: Box::new(std::iter::empty()),
            buffer: VecDeque::new(),
            position: Position::default(),
            groups: Vec::new(),
        }
    }

    pub fn open(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        self.open_chars(chars);
    }

    /// Lexes from a pull-based character source. Characters are only drawn
    /// from `chars` as the DFA needs them.
    pub fn open_chars<I>(&mut self, chars: I)
    where
        I: IntoIterator<Item = char>,
        I::IntoIter: 'g,
    {
        self.reset();
        self.source = Box::new(chars.into_iter());
    }

    /// Drops buffered lookahead, open groups and position counters.
    pub fn reset(&mut self) {
        self.source = Box::new(std::iter::empty());
        self.buffer.clear();
        self.position = Position::default();
        self.groups.clear();
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Position of the next unconsumed character.
    pub fn position(&self) -> Position {
        self.position
    }

    /// True while a lexical group is open (e.g. inside an unterminated comment).
    pub fn in_group(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn group_depth(&self) -> usize {
        self.groups.len()
    }

    /// Lexes group-assembled tokens up to and including the end token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let end = self.grammar.end_symbol().index;
        let mut out = Vec::new();
        loop {
            let t = self.next_token();
            let done = t.symbol == end;
            out.push(t);
            if done {
                return out;
            }
        }
    }

    /// Character `index` of the lookahead buffer, reading from the source
    /// until the buffer is long enough. `None` past the end of input.
    fn lookahead(&mut self, index: usize) -> Option<char> {
        while self.buffer.len() <= index {
            let c = self.source.next()?;
            self.buffer.push_back(c);
        }
        self.buffer.get(index).copied()
    }

    /// The first `n` buffered characters, without consuming them.
    fn peek_text(&self, n: usize) -> String {
        self.buffer.iter().take(n).collect()
    }

    /// Removes `n` characters from the front of the buffer and advances the
    /// position: `'\n'` starts a new line, `'\r'` is ignored.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.buffer.len(), "consuming past the lookahead buffer");
        let n = n.min(self.buffer.len());
        for c in self.buffer.drain(..n) {
            match c {
                '\n' => {
                    self.position.line += 1;
                    self.position.column = 0;
                }
                '\r' => {}
                _ => self.position.column += 1,
            }
        }
    }
}
