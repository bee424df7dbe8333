//! Hygiene: enforces coding standards at test time
//!
//! Scans the overlay crate's production sources (everything under `src/`
//! except `*_test.rs`) for antipatterns. Each pattern has a budget, ideally
//! zero. The budget never grows: fix an existing hit before adding one.

use std::fs;
use std::path::Path;

struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

// Panics crash the editor tab or abort an export.
const UNWRAP: Budget = Budget { pattern: ".unwrap()", max: 0, why: "panics" };
const EXPECT: Budget = Budget { pattern: ".expect(", max: 0, why: "panics" };
const PANIC: Budget = Budget { pattern: "panic!(", max: 0, why: "panics" };
const UNREACHABLE: Budget = Budget { pattern: "unreachable!(", max: 0, why: "panics" };
const TODO: Budget = Budget { pattern: "todo!(", max: 0, why: "stub" };
const UNIMPLEMENTED: Budget = Budget { pattern: "unimplemented!(", max: 0, why: "stub" };

// Silent loss discards errors without inspecting them.
const SILENT_DISCARD: Budget = Budget { pattern: "let _ =", max: 0, why: "discarded result" };
const DOT_OK: Budget = Budget { pattern: ".ok()", max: 0, why: "discarded error" };

const ALLOW_DEAD_CODE: Budget = Budget { pattern: "#[allow(dead_code)]", max: 0, why: "dead code" };

/// Only these modules may talk to the browser.
const WEB_SYS_MODULES: [&str; 2] = ["engine.rs", "paint.rs"];

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .map(|f| (f.path.clone(), f.content.lines().filter(|l| l.contains(pattern)).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

fn check(budget: &Budget) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found; run from the overlay crate root");
    let found = hits(&files, budget.pattern);
    let count: usize = found.iter().map(|(_, n)| n).sum();
    let listing = found.iter().map(|(p, n)| format!("  {p}: {n}")).collect::<Vec<_>>().join("\n");
    assert!(
        count <= budget.max,
        "`{}` ({}) budget exceeded: found {count}, max {}.\n{listing}",
        budget.pattern,
        budget.why,
        budget.max
    );
}

#[test]
fn unwrap_budget() {
    check(&UNWRAP);
}

#[test]
fn expect_budget() {
    check(&EXPECT);
}

#[test]
fn panic_budget() {
    check(&PANIC);
}

#[test]
fn unreachable_budget() {
    check(&UNREACHABLE);
}

#[test]
fn todo_budget() {
    check(&TODO);
}

#[test]
fn unimplemented_budget() {
    check(&UNIMPLEMENTED);
}

#[test]
fn silent_discard_budget() {
    check(&SILENT_DISCARD);
}

#[test]
fn dot_ok_budget() {
    check(&DOT_OK);
}

#[test]
fn allow_dead_code_budget() {
    check(&ALLOW_DEAD_CODE);
}

#[test]
fn browser_access_is_confined() {
    let offenders: Vec<String> = source_files()
        .into_iter()
        .filter(|f| f.content.contains("web_sys::"))
        .filter(|f| !WEB_SYS_MODULES.iter().any(|m| f.path.ends_with(m)))
        .map(|f| f.path)
        .collect();
    assert!(offenders.is_empty(), "web_sys used outside {WEB_SYS_MODULES:?}: {offenders:?}");
}
