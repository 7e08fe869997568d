// src/bin/egt_parse.rs
// Parse input files against a compiled grammar, in parallel.
// Usage:
//   cargo run --bin egt_parse -- grammar.egt a.txt b.txt ...
// Env:
//   EGT_TRIM=1     trim chain productions from the trees
//   EGT_FORMAT=    "json" (default) or "tree"

use std::{env, fs, time::Instant};

use anyhow::{Context, Result, bail};
use egtparse::{
    Grammar, Parser,
    parser::tree::{render_tree, tree_to_json},
};
use rayon::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let [grammar_path, inputs @ ..] = args.as_slice() else {
        bail!("usage: egt_parse <file.egt> <input>...");
    };
    if inputs.is_empty() {
        bail!("usage: egt_parse <file.egt> <input>...");
    }

    let trim = env::var("EGT_TRIM").map(|v| v == "1").unwrap_or(false);
    let as_tree = env::var("EGT_FORMAT").map(|v| v == "tree").unwrap_or(false);

    let g = Grammar::from_path(grammar_path).with_context(|| format!("loading {grammar_path}"))?;

    let t0 = Instant::now();
    let results: Vec<Result<String>> = inputs
        .par_iter()
        .map(|path| {
            let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            let mut p = Parser::new(&g);
            p.set_trim_reductions(trim);
            p.open(&text);
            let root = p.parse_tree().with_context(|| format!("parsing {path}"))?;
            Ok(if as_tree {
                render_tree(&g, &root)
            } else {
                serde_json::to_string_pretty(&tree_to_json(&g, &root))?
            })
        })
        .collect();
    let ms = t0.elapsed().as_secs_f64() * 1e3;

    let mut failed = 0usize;
    for (path, r) in inputs.iter().zip(results) {
        match r {
            Ok(out) => println!("== {path}\n{out}"),
            Err(e) => {
                failed += 1;
                eprintln!("== {path}\nerror: {e:#}");
            }
        }
    }
    println!(
        "[egt_parse] {} inputs, {} failed | {ms:.3} ms",
        inputs.len(),
        failed
    );
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
