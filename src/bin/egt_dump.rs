// src/bin/egt_dump.rs
// Load a compiled grammar table file, print a summary and dump the model as JSON.
// Usage:
//   cargo run --bin egt_dump -- grammar.egt              # summary only
//   cargo run --bin egt_dump -- grammar.egt out.json     # summary + JSON dump

use std::{env, path::Path, time::Instant};

use anyhow::{Context, Result, bail};
use egtparse::{Grammar, SymbolKind, grammar::save_grammar_json};

fn main() -> Result<()> {
    env_logger::init();

    let Some(input) = env::args().nth(1) else {
        bail!("usage: egt_dump <file.egt> [out.json]");
    };

    let t0 = Instant::now();
    let g = Grammar::from_path(&input).with_context(|| format!("loading {input}"))?;
    let ms = t0.elapsed().as_secs_f64() * 1e3;

    println!("[egt_dump] {input}: {:?} | load {ms:.3} ms", g.header());
    for (name, value) in g.properties().iter().filter(|(_, v)| !v.is_empty()) {
        println!("  {name:<18} {value}");
    }

    let count = |k: SymbolKind| g.symbols().iter().filter(|s| s.kind == k).count();
    println!(
        "  symbols {} ({} terminals, {} nonterminals, {} noise)",
        g.symbols().len(),
        count(SymbolKind::Content),
        count(SymbolKind::Nonterminal),
        count(SymbolKind::Noise),
    );
    println!(
        "  productions {} | charsets {} | DFA states {} | LALR states {} | groups {}",
        g.productions().len(),
        g.charsets().len(),
        g.dfa_states().len(),
        g.lr_states().len(),
        g.groups().len(),
    );
    if log::log_enabled!(log::Level::Debug) {
        for p in g.productions() {
            log::debug!("  {:>4}: {}", p.index, g.production_text(p));
        }
    }

    if let Some(out) = env::args().nth(2) {
        let out_path = Path::new(&out);
        save_grammar_json(out_path, &g).with_context(|| format!("writing {}", out_path.display()))?;
        println!("[egt_dump] wrote {}", out_path.display());
    }
    Ok(())
}
