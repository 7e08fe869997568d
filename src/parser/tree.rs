// src/parser/tree.rs
// Walking and dumping parse trees.

use std::fmt::Write as _;

use serde_json::{Value, json};

use crate::{
    grammar::Grammar,
    token::{Token, TokenData},
};

/// Visits `root` and every token below it in pre-order, with its depth.
pub fn walk<'t>(root: &'t Token, f: &mut impl FnMut(&'t Token, usize)) {
    fn go<'t>(t: &'t Token, depth: usize, f: &mut impl FnMut(&'t Token, usize)) {
        f(t, depth);
        if let Some(r) = t.reduction() {
            for child in r.children() {
                go(child, depth + 1, f);
            }
        }
    }
    go(root, 0, f);
}

/// Terminal tokens of the tree, left to right.
pub fn leaves(root: &Token) -> Vec<&Token> {
    let mut out = Vec::new();
    walk(root, &mut |t, _| {
        if t.reduction().is_none() {
            out.push(t);
        }
    });
    out
}

/// JSON rendering: terminals as `{symbol, text, line, column}`, reductions as
/// `{symbol, production, children}`.
pub fn tree_to_json(g: &Grammar, t: &Token) -> Value {
    let symbol = g.symbol(t.symbol).map_or_else(String::new, |s| s.name.clone());
    match &t.data {
        TokenData::Text(text) => json!({
            "symbol": symbol,
            "text": text,
            "line": t.position.line,
            "column": t.position.column,
        }),
        TokenData::Reduction(r) => json!({
            "symbol": symbol,
            "production": g.production(r.production()).map(|p| g.production_text(p)),
            "children": r.children().iter().map(|c| tree_to_json(g, c)).collect::<Vec<_>>(),
        }),
        TokenData::Value(v) => json!({ "symbol": symbol, "value": v }),
    }
}

/// One line per token, indented by depth.
pub fn render_tree(g: &Grammar, root: &Token) -> String {
    let mut out = String::new();
    walk(root, &mut |t, depth| {
        let name = g.symbol(t.symbol).map_or_else(|| format!("#{}", t.symbol), |s| s.text());
        let _ = match &t.data {
            TokenData::Text(text) => writeln!(out, "{:indent$}{name} {text:?}", "", indent = depth * 2),
            TokenData::Reduction(r) => {
                let prod = g
                    .production(r.production())
                    .map(|p| g.production_text(p))
                    .unwrap_or_default();
                writeln!(out, "{:indent$}{prod}", "", indent = depth * 2)
            }
            TokenData::Value(v) => writeln!(out, "{:indent$}{name} = {v}", "", indent = depth * 2),
        };
    });
    out
}
