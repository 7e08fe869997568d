// src/lexer/dfa.rs
use super::Lexer;
use crate::token::Token;

impl<'g> Lexer<'g> {
    /// Runs the DFA from its initial state over the lookahead buffer and
    /// returns the longest accepted run, without consuming it.
    ///
    /// No accepting state reached → a one-character error token.
    /// No input left → the end token with empty text.
    pub fn next_raw_token(&mut self) -> Token {
        let g = self.grammar;
        let position = self.position;

        if self.lookahead(0).is_none() {
            return Token::from_text(g.end_symbol().index, "", position);
        }

        let states = g.dfa_states();
        let sets = g.charsets();
        let mut state = g.dfa_initial();
        let mut len = 0usize;
        // (accepted symbol, length of the run that reached it)
        let mut last_accept: Option<(u16, usize)> = None;

        while let Some(c) = self.lookahead(len) {
            let edge = states[state as usize]
                .edges
                .iter()
                .find(|e| sets[e.set as usize].contains(c));
            let Some(edge) = edge else {
                break;
            };

            state = edge.target;
            len += 1;
            if let Some(symbol) = states[state as usize].accept {
                last_accept = Some((symbol, len));
            }
        }

        let (symbol, len) = last_accept.unwrap_or((g.error_symbol().index, 1));
        Token::from_text(symbol, self.peek_text(len), position)
    }
}
