//! Golden-file test harness for elmpost.
//!
//! Discovers `.input.js` files under `tests/fixtures/`, runs the pipeline
//! (parse → transform → codegen) with shader inlining disabled so no test
//! ever shells out, and compares output against the corresponding
//! `.expected.js` file. Both sides are printed by the same emitter, so the
//! comparison is insensitive to fixture formatting.
//!
//! Set `ELMPOST_UPDATE_FIXTURES=1` to overwrite expected files with actual
//! output.

use std::path::{Path, PathBuf};

use anyhow::Result;
use ep_ast::Conventions;
use ep_parser::{emit_js, parse_js};
use ep_transform::{Pipeline, TransformError};

fn fixtures_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR is crates/ep_test/, so go up two levels to workspace root.
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
}

fn collect_input_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if !dir.exists() {
        return files;
    }
    for entry in walkdir(dir) {
        if entry.extension().is_some_and(|e| e == "js")
            && entry
                .file_name()
                .unwrap()
                .to_str()
                .is_some_and(|n| n.ends_with(".input.js"))
        {
            files.push(entry);
        }
    }
    files.sort();
    files
}

fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                result.extend(walkdir(&path));
            } else {
                result.push(path);
            }
        }
    }
    result
}

fn run_pipeline(source: &str, filename: &str) -> Result<String> {
    let mut parsed = parse_js(source, filename)?;
    let pipeline = Pipeline::new(Conventions::default());
    pipeline.run(&mut parsed.module, None)?;
    Ok(emit_js(&parsed.module, parsed.source_map)?)
}

/// Print a fixture through the same emitter the pipeline uses.
fn reprint(source: &str, filename: &str) -> Result<String> {
    let parsed = parse_js(source, filename)?;
    Ok(emit_js(&parsed.module, parsed.source_map)?)
}

#[test]
fn golden_file_tests() {
    let fixtures = fixtures_dir();
    let input_files = collect_input_files(&fixtures);

    assert!(
        !input_files.is_empty(),
        "No test fixtures found in {}",
        fixtures.display()
    );

    let update_mode = std::env::var("ELMPOST_UPDATE_FIXTURES").is_ok();
    let mut failures = Vec::new();

    for input_path in &input_files {
        let expected_path = input_path
            .to_str()
            .unwrap()
            .replace(".input.js", ".expected.js");
        let expected_path = PathBuf::from(&expected_path);

        let test_name = input_path
            .strip_prefix(&fixtures)
            .unwrap()
            .display()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read input: {e}"));
                continue;
            }
        };

        let filename = input_path.display().to_string();
        let actual = match run_pipeline(&source, &filename) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed: {e}"));
                continue;
            }
        };

        if update_mode {
            if let Err(e) = std::fs::write(&expected_path, &actual) {
                failures.push(format!("{test_name}: failed to write expected: {e}"));
            }
            continue;
        }

        if !expected_path.exists() {
            failures.push(format!(
                "{test_name}: missing expected file: {}",
                expected_path.display()
            ));
            continue;
        }

        let expected_source = match std::fs::read_to_string(&expected_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read expected: {e}"));
                continue;
            }
        };
        let expected = match reprint(&expected_source, &expected_path.display().to_string()) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: expected file does not parse: {e}"));
                continue;
            }
        };
        if actual.trim() != expected.trim() {
            failures.push(format!(
                "{test_name}: output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                expected.trim(),
                actual.trim()
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} golden test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

#[test]
fn roundtrip_tests() {
    // Pipeline output must itself be valid JavaScript.
    let fixtures = fixtures_dir();
    let mut failures = Vec::new();

    for input_path in &collect_input_files(&fixtures) {
        let test_name = input_path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read: {e}"));
                continue;
            }
        };

        let filename = input_path.display().to_string();
        let output = match run_pipeline(&source, &filename) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed: {e}"));
                continue;
            }
        };

        if let Err(e) = parse_js(&output, &format!("{test_name}.output")) {
            failures.push(format!(
                "{test_name}: output is not valid JavaScript: {e}\n--- output ---\n{}",
                output.trim()
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} roundtrip test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

#[test]
fn module_without_export_call_aborts() {
    let err = run_pipeline("var x = F2(fn); var r = A2(x, a, b);", "no-export.js")
        .expect_err("pipeline must abort without an entry point");
    match err.downcast_ref::<TransformError>() {
        Some(TransformError::EntryPointNotFound(name)) => {
            assert_eq!(name, "_Platform_export");
        }
        other => panic!("expected EntryPointNotFound, got {other:?}"),
    }
}
