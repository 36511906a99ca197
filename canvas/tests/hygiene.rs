//! Source hygiene budgets for the canvas crate.
//!
//! Production files under `src/` are scanned line by line for patterns that
//! crash the page, swallow errors or bypass logging. Every budget is zero;
//! a new hit fails the build with the offending files listed.

use std::fs;
use std::path::{Path, PathBuf};

struct Rule {
    pattern: &'static str,
    budget: usize,
}

const PANICS: &[Rule] = &[
    Rule { pattern: ".unwrap()", budget: 0 },
    Rule { pattern: ".expect(", budget: 0 },
    Rule { pattern: "panic!(", budget: 0 },
    Rule { pattern: "unreachable!(", budget: 0 },
    Rule { pattern: "todo!(", budget: 0 },
    Rule { pattern: "unimplemented!(", budget: 0 },
];

const DISCARDS: &[Rule] = &[
    Rule { pattern: "let _ =", budget: 0 },
    Rule { pattern: ".ok()", budget: 0 },
];

const OUTPUT: &[Rule] = &[
    Rule { pattern: "println!(", budget: 0 },
    Rule { pattern: "eprintln!(", budget: 0 },
    Rule { pattern: "dbg!(", budget: 0 },
];

const STRUCTURE: &[Rule] = &[Rule { pattern: "#[allow(dead_code)]", budget: 0 }];

/// Production `.rs` files under `src/`; `*_test.rs` siblings are skipped.
fn production_files() -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    walk(Path::new("src"), &mut files);
    files
}

fn walk(dir: &Path, out: &mut Vec<(PathBuf, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            walk(&path, out);
            continue;
        }
        let is_rs = path.extension().is_some_and(|ext| ext == "rs");
        let is_test = path.to_string_lossy().ends_with("_test.rs");
        if is_rs && !is_test {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((path, content));
            }
        }
    }
}

fn check(rules: &[Rule]) {
    let files = production_files();
    assert!(!files.is_empty(), "no sources found; run from the crate root");

    let mut failures = Vec::new();
    for rule in rules {
        let hits: Vec<(String, usize)> = files
            .iter()
            .map(|(path, content)| {
                let count = content.lines().filter(|line| line.contains(rule.pattern)).count();
                (path.display().to_string(), count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        let found: usize = hits.iter().map(|(_, count)| count).sum();
        if found > rule.budget {
            let listing: Vec<String> = hits.iter().map(|(path, count)| format!("  {path}: {count}")).collect();
            failures.push(format!(
                "`{}` found {found}, budget {}\n{}",
                rule.pattern,
                rule.budget,
                listing.join("\n")
            ));
        }
    }
    assert!(failures.is_empty(), "hygiene budget exceeded:\n{}", failures.join("\n"));
}

#[test]
fn no_panicking_calls() {
    check(PANICS);
}

#[test]
fn no_discarded_results() {
    check(DISCARDS);
}

#[test]
fn no_direct_console_output() {
    check(OUTPUT);
}

#[test]
fn no_dead_code_allowances() {
    check(STRUCTURE);
}

#[test]
fn crate_docs_cover_every_module() {
    let lib = fs::read_to_string("src/lib.rs").expect("read src/lib.rs");
    let (header, items) = lib.split_at(lib.find("\npub mod ").expect("module list"));

    let stray: Vec<&str> = header
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with("//!"))
        .collect();
    assert!(stray.is_empty(), "non-doc lines in the crate header: {stray:?}");

    let missing: Vec<&str> = items
        .lines()
        .filter_map(|line| line.strip_prefix("pub mod ")?.strip_suffix(';'))
        .filter(|module| !header.contains(&format!("`{module}`")))
        .collect();
    assert!(missing.is_empty(), "modules missing from the crate docs: {missing:?}");
}
