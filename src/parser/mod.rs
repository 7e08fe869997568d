// src/parser/mod.rs
//! Pull-driven LALR(1) parser.
//!
//! Each call to [`Parser::parse`] runs until something worth reporting
//! happens (a token was read, a reduction was built, the input was accepted
//! or parsing halted) and returns that as a [`ParseMessage`]. Between calls
//! the consumer may inspect or replace the current token or reduction.

pub mod lalr;
pub mod tree;

use std::{collections::VecDeque, io::Read};

use crate::{
    error::ParseError,
    grammar::{Grammar, Symbol, SymbolKind},
    lexer::Lexer,
    token::{Position, Reduction, Token, TokenData},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseMessage {
    /// A token was read from the lexer and queued; it has not been parsed yet.
    TokenRead,
    /// A production was reduced; see [`Parser::current_reduction`].
    Reduction,
    /// The input is a sentence of the grammar.
    Accept,
    /// `parse` was called with no input opened.
    NotLoadedError,
    /// The lexer produced an error token; it is the current token.
    LexicalError,
    /// No action for the current token; see [`Parser::expected_symbols`].
    SyntaxError,
    /// Input ended inside an unterminated group.
    GroupError,
    /// The tables are inconsistent (missing goto, stack underflow).
    InternalError,
}

impl ParseMessage {
    /// True for the messages after which further `parse` calls make no progress.
    pub fn is_final(self) -> bool {
        !matches!(self, ParseMessage::TokenRead | ParseMessage::Reduction)
    }
}

pub struct Parser<'g> {
    grammar: &'g Grammar,
    lexer: Lexer<'g>,
    opened: bool,
    lr_state: u16,
    /// Parse stack. The bottom entry is a placeholder carrying the initial state.
    stack: Vec<Token>,
    /// Tokens waiting to be parsed; the front is the lookahead.
    input: VecDeque<Token>,
    expected: Vec<u16>,
    /// Position of the lookahead token as of the last `parse` step.
    position: Position,
    trim_reductions: bool,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        let mut p = Self {
            grammar,
            lexer: Lexer::new(grammar),
            opened: false,
            lr_state: grammar.lr_initial(),
            stack: Vec::new(),
            input: VecDeque::new(),
            expected: Vec::new(),
            position: Position::default(),
            trim_reductions: false,
        };
        p.restart();
        p
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn trim_reductions(&self) -> bool {
        self.trim_reductions
    }

    /// When set, chain productions (`<A> ::= <B>`) are not materialized:
    /// the `<B>` token is re-tagged as `<A>` instead.
    pub fn set_trim_reductions(&mut self, trim: bool) {
        self.trim_reductions = trim;
    }

    /// Starts a fresh parse of `text`.
    pub fn open(&mut self, text: &str) {
        self.restart();
        self.lexer.open(text);
        self.opened = true;
    }

    /// Starts a fresh parse over a character source that is pulled on demand.
    pub fn open_chars<I>(&mut self, chars: I)
    where
        I: IntoIterator<Item = char>,
        I::IntoIter: 'g,
    {
        self.restart();
        self.lexer.open_chars(chars);
        self.opened = true;
    }

    /// Reads UTF-8 text from `reader` and starts a fresh parse over it.
    pub fn open_reader<R: Read>(&mut self, mut reader: R) -> std::io::Result<()> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.open(&text);
        Ok(())
    }

    /// Drops all parse state and the current input. The grammar stays; call
    /// one of the `open` methods before parsing again.
    pub fn restart(&mut self) {
        self.lexer.reset();
        self.opened = false;
        self.lr_state = self.grammar.lr_initial();
        self.stack.clear();
        self.stack.push(Token {
            state: self.lr_state,
            ..Token::from_text(self.grammar.end_symbol().index, "", Position::default())
        });
        self.input.clear();
        self.expected.clear();
        self.position = Position::default();
    }

    /// Advances the parse until the next message for the consumer.
    pub fn parse(&mut self) -> ParseMessage {
        if !self.opened {
            return ParseMessage::NotLoadedError;
        }

        loop {
            let Some(front) = self.input.front() else {
                let t = self.lexer.next_token();
                log::trace!("read {} {:?} at {}", self.symbol_name(t.symbol), t.text(), t.position);
                self.input.push_back(t);
                return ParseMessage::TokenRead;
            };
            self.position = front.position;

            if self.lexer.in_group() {
                return ParseMessage::GroupError;
            }

            let Some(kind) = front.kind(self.grammar) else {
                return ParseMessage::InternalError;
            };
            match kind {
                SymbolKind::Noise => {
                    self.input.pop_front();
                }
                SymbolKind::Error => return ParseMessage::LexicalError,
                _ => match self.parse_lalr() {
                    lalr::Step::Accept => return ParseMessage::Accept,
                    lalr::Step::Shift | lalr::Step::ReduceEliminated => {}
                    lalr::Step::ReduceNormal => return ParseMessage::Reduction,
                    lalr::Step::SyntaxError => return ParseMessage::SyntaxError,
                    lalr::Step::InternalError => return ParseMessage::InternalError,
                },
            }
        }
    }

    /// Drives [`Parser::parse`] to completion and returns the root token.
    ///
    /// The parser is left without input afterwards.
    pub fn parse_tree(&mut self) -> Result<Token, ParseError> {
        loop {
            let msg = self.parse();
            if !msg.is_final() {
                continue;
            }
            let position = self.current_position();
            let err = match msg {
                ParseMessage::Accept => {
                    let root = self.stack.pop();
                    self.restart();
                    return root.ok_or(ParseError::Internal { position });
                }
                ParseMessage::NotLoadedError => ParseError::NotLoaded,
                ParseMessage::LexicalError => {
                    let t = self.current_token();
                    ParseError::Lexical {
                        text: t.and_then(Token::text).unwrap_or_default().to_string(),
                        position,
                    }
                }
                ParseMessage::SyntaxError => {
                    let t = self.current_token();
                    ParseError::Syntax {
                        found: t.map(|t| self.symbol_name(t.symbol)).unwrap_or_default(),
                        expected: self.expected_symbols().iter().map(|s| s.text()).collect(),
                        position,
                    }
                }
                ParseMessage::GroupError => ParseError::Group { position },
                _ => ParseError::Internal { position },
            };
            log::debug!("parse halted: {err}");
            return Err(err);
        }
    }

    /// The lookahead token: the one just read, or the one that caused an error.
    pub fn current_token(&self) -> Option<&Token> {
        self.input.front()
    }

    pub fn current_token_mut(&mut self) -> Option<&mut Token> {
        self.input.front_mut()
    }

    /// Removes the lookahead token, e.g. to skip past a lexical error.
    pub fn discard_current_token(&mut self) -> Option<Token> {
        self.input.pop_front()
    }

    /// Queues a token behind any pending input.
    pub fn enqueue_input(&mut self, token: Token) {
        self.input.push_back(token);
    }

    /// Makes `token` the next token to be parsed.
    pub fn push_input(&mut self, token: Token) {
        self.input.push_front(token);
    }

    /// The reduction on top of the parse stack: the one just built after
    /// [`ParseMessage::Reduction`], or the root after [`ParseMessage::Accept`].
    pub fn current_reduction(&self) -> Option<&Reduction> {
        self.stack.last().and_then(Token::reduction)
    }

    pub fn current_reduction_mut(&mut self) -> Option<&mut Reduction> {
        self.stack.last_mut().and_then(|t| t.data.as_reduction_mut())
    }

    /// Replaces the payload of the token on top of the parse stack with a
    /// computed value. Returns false if the stack holds no parsed token.
    pub fn set_current_value(&mut self, value: serde_json::Value) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        match self.stack.last_mut() {
            Some(top) => {
                top.data = TokenData::Value(value);
                true
            }
            None => false,
        }
    }

    /// Terminals that would have been accepted where the last syntax error occurred.
    pub fn expected_symbols(&self) -> Vec<&'g Symbol> {
        let g = self.grammar;
        self.expected
            .iter()
            .filter_map(|&s| g.symbol(s))
            .collect()
    }

    /// Position of the token the parser last looked at: the offending token
    /// after an error, the lookahead otherwise.
    pub fn current_position(&self) -> Position {
        self.position
    }

    /// Depth of the parse stack, not counting the bottom placeholder.
    pub fn stack_depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    fn symbol_name(&self, symbol: u16) -> String {
        self.grammar
            .symbol(symbol)
            .map_or_else(|| format!("#{symbol}"), Symbol::text)
    }
}
