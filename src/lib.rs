// src/lib.rs
//! Table-driven LALR(1) front end over compiled grammar tables (EGT v5.0).
//!
//! Load a [`Grammar`] once, then run any number of [`Parser`]s against it:
//!
//! ```no_run
//! use egtparse::{Grammar, ParseMessage, Parser};
//!
//! let g = Grammar::from_path("calc.egt")?;
//! let mut p = Parser::new(&g);
//! p.open("a + b");
//! loop {
//!     match p.parse() {
//!         ParseMessage::Accept => break,
//!         ParseMessage::TokenRead | ParseMessage::Reduction => {}
//!         other => panic!("{other:?} at {}", p.current_position()),
//!     }
//! }
//! # Ok::<(), egtparse::LoadError>(())
//! ```

pub mod egt;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod token;

pub use error::{LoadError, ParseError};
pub use grammar::{Grammar, Production, Symbol, SymbolKind};
pub use lexer::Lexer;
pub use parser::{ParseMessage, Parser};
pub use token::{Position, Reduction, Token, TokenData};
