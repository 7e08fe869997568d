// src/parser/lalr.rs
use super::Parser;
use crate::{
    grammar::Action,
    token::{Reduction, Token, TokenData},
};

/// Outcome of one LALR step on the lookahead token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Accept,
    Shift,
    /// A reduction was built and pushed.
    ReduceNormal,
    /// A chain production was trimmed; no reduction was built.
    ReduceEliminated,
    SyntaxError,
    InternalError,
}

impl<'g> Parser<'g> {
    /// Applies the action for the current state and the front input token.
    pub(super) fn parse_lalr(&mut self) -> Step {
        let g = self.grammar;
        let Some(lookahead) = self.input.front() else {
            return Step::InternalError;
        };
        let state = &g.lr_states()[self.lr_state as usize];

        // An explicit error action in the table reads the same as no action.
        let action = state.action(lookahead.symbol).filter(|&a| a != Action::Error);
        let Some(action) = action else {
            self.expected = state
                .actions()
                .iter()
                .map(|a| a.symbol)
                .filter(|&s| g.symbols()[s as usize].kind.is_expectable())
                .collect();
            log::trace!(
                "state {}: no action on {}",
                self.lr_state,
                self.symbol_name(lookahead.symbol)
            );
            return Step::SyntaxError;
        };

        match action {
            Action::Accept => {
                log::trace!("state {}: accept", self.lr_state);
                Step::Accept
            }
            Action::Shift(target) => {
                let Some(mut t) = self.input.pop_front() else {
                    return Step::InternalError;
                };
                log::trace!("state {}: shift {} -> {target}", self.lr_state, self.symbol_name(t.symbol));
                t.state = target;
                self.lr_state = target;
                self.stack.push(t);
                Step::Shift
            }
            Action::Reduce(production) => self.reduce(production),
            // Gotos are only keyed on nonterminals, which never come from the lexer.
            Action::Goto(_) | Action::Error => Step::InternalError,
        }
    }

    fn reduce(&mut self, production: u16) -> Step {
        let g = self.grammar;
        let p = &g.productions()[production as usize];
        let n = p.body.len();
        // The bottom placeholder must survive the pop.
        if self.stack.len() <= n {
            return Step::InternalError;
        }

        let (mut head, step) = if self.trim_reductions && g.is_chain(p) {
            let Some(mut t) = self.stack.pop() else {
                return Step::InternalError;
            };
            t.symbol = p.head;
            (t, Step::ReduceEliminated)
        } else {
            let children = self.stack.split_off(self.stack.len() - n);
            let position = match children.first() {
                Some(first) => first.position,
                None => self
                    .input
                    .front()
                    .map_or_else(|| self.lexer.position(), |t| t.position),
            };
            let reduction = Reduction::new(production, children);
            (
                Token::new(p.head, TokenData::Reduction(Box::new(reduction)), position),
                Step::ReduceNormal,
            )
        };

        let Some(top) = self.stack.last() else {
            return Step::InternalError;
        };
        match g.lr_states()[top.state as usize].action(p.head) {
            Some(Action::Goto(target)) => {
                log::trace!(
                    "state {}: reduce {} -> {target}{}",
                    self.lr_state,
                    g.production_text(p),
                    if step == Step::ReduceEliminated { " (trimmed)" } else { "" }
                );
                head.state = target;
                self.lr_state = target;
                self.stack.push(head);
                step
            }
            _ => Step::InternalError,
        }
    }
}
