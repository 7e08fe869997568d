// src/lexer/group.rs
// Group layer over the raw DFA tokens. A stack of open groups collects text
// so that a whole comment or string comes back as one token of the group's
// container symbol.

use super::{GroupFrame, Lexer};
use crate::{
    grammar::{AdvanceMode, EndingMode, SymbolKind},
    token::Token,
};

impl<'g> Lexer<'g> {
    /// Next finished token, consumed from the input.
    ///
    /// Returns the end token as soon as input runs out, even inside an open
    /// group; the caller detects that case through [`Lexer::in_group`].
    pub fn next_token(&mut self) -> Token {
        let g = self.grammar;
        loop {
            let read = self.next_raw_token();
            let symbol = &g.symbols()[read.symbol as usize];
            let text = read.text().unwrap_or_default();
            let len = text.chars().count();

            // A group may always open at top level; inside another group
            // only when that group lists it as nestable.
            let nest = match (symbol.kind, symbol.group) {
                (SymbolKind::GroupStart, Some(group)) => match self.groups.last() {
                    None => Some(group),
                    Some(top) => g.groups()[top.group as usize]
                        .nesting
                        .contains(&group)
                        .then_some(group),
                },
                _ => None,
            };

            if let Some(group) = nest {
                log::trace!("group {:?} opens at {}", g.groups()[group as usize].name, read.position);
                self.consume(len);
                self.groups.push(GroupFrame {
                    group,
                    text: text.to_string(),
                    position: read.position,
                });
                continue;
            }

            let Some(mut top) = self.groups.pop() else {
                self.consume(len);
                return read;
            };
            let group = &g.groups()[top.group as usize];

            if read.symbol == group.end {
                if group.ending == EndingMode::Closed {
                    top.text.push_str(text);
                    self.consume(len);
                }
                match self.groups.last_mut() {
                    None => return Token::from_text(group.container, top.text, top.position),
                    Some(parent) => parent.text.push_str(&top.text),
                }
            } else if symbol.kind == SymbolKind::End {
                self.groups.push(top);
                return read;
            } else {
                match group.advance {
                    AdvanceMode::Token => {
                        top.text.push_str(text);
                        self.consume(len);
                    }
                    AdvanceMode::Character => {
                        top.text.extend(text.chars().next());
                        self.consume(1);
                    }
                }
                self.groups.push(top);
            }
        }
    }
}
