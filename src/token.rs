// src/token.rs
//! Tokens and the parse tree built out of them.
//!
//! A terminal token carries the text it matched; a nonterminal token carries
//! the [`Reduction`] that produced it. A consumer walking the tree may swap
//! either payload for a computed [`TokenData::Value`].

use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize};

use crate::grammar::{Grammar, SymbolKind};

/// Zero-based line/column. Copied into every token, never shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenData {
    Text(String),
    Reduction(Box<Reduction>),
    Value(serde_json::Value),
}

impl TokenData {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TokenData::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reduction(&self) -> Option<&Reduction> {
        match self {
            TokenData::Reduction(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_reduction_mut(&mut self) -> Option<&mut Reduction> {
        match self {
            TokenData::Reduction(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            TokenData::Value(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// Index of the token's symbol in the grammar's symbol table.
    pub symbol: u16,
    pub data: TokenData,
    pub position: Position,
    /// LALR state the parser entered when this token was pushed.
    pub(crate) state: u16,
}

impl Token {
    pub fn new(symbol: u16, data: TokenData, position: Position) -> Self {
        Self {
            symbol,
            data,
            position,
            state: 0,
        }
    }

    pub fn from_text(symbol: u16, text: impl Into<String>, position: Position) -> Self {
        Self::new(symbol, TokenData::Text(text.into()), position)
    }

    pub fn state(&self) -> u16 {
        self.state
    }

    pub fn kind(&self, grammar: &Grammar) -> Option<SymbolKind> {
        grammar.symbol(self.symbol).map(|s| s.kind)
    }

    pub fn text(&self) -> Option<&str> {
        self.data.as_text()
    }

    pub fn reduction(&self) -> Option<&Reduction> {
        self.data.as_reduction()
    }
}

/// A production applied to the tokens that matched its body, left to right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reduction {
    production: u16,
    children: Vec<Token>,
}

impl Reduction {
    pub fn new(production: u16, children: Vec<Token>) -> Self {
        Self {
            production,
            children,
        }
    }

    pub fn production(&self) -> u16 {
        self.production
    }

    pub fn children(&self) -> &[Token] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Token] {
        &mut self.children
    }

    pub fn into_children(self) -> Vec<Token> {
        self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.children.get(index)
    }

    /// Shortcut for the payload of child `index`.
    pub fn data(&self, index: usize) -> Option<&TokenData> {
        self.children.get(index).map(|t| &t.data)
    }
}

impl Index<usize> for Reduction {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.children[index]
    }
}
