//! Test harness for the jparse grammars against fixture files.
//!
//! - `test/good/*.jp` must parse to the value in `test/json/<name>.json`.
//! - `test/bad/*.jp` must fail with the message in the matching `.error` file.
//! - `test/cmd/*.cmd` are parsed line by line as commands; the matching
//!   `.json` file holds one entry per line (`null` for blank lines).
//! - `test/cmd-bad/*.cmd` hold a single command line that must fail.
//!
//! Expected JSON is read with libjparse itself, which is safe because the
//! value grammar is a superset of JSON.

use std::fs;
use std::path::{Path, PathBuf};

use libjparse::{parse, parse_with_filename, to_json, Reader, Value};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// Get all files with a given extension from a subdirectory of test/.
fn get_files_in_subdir(subdir: &str, ext: &str) -> Vec<PathBuf> {
    let dir = test_root().join(subdir);
    let mut files: Vec<PathBuf> = Vec::new();
    if let Ok(entries) = fs::read_dir(&dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == ext).unwrap_or(false) {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// Read a sibling file of `path` from `subdir` with a different extension.
fn read_companion(path: &Path, subdir: &str, ext: &str) -> Option<String> {
    let stem = path.file_stem().unwrap().to_string_lossy();
    fs::read_to_string(test_root().join(subdir).join(format!("{}.{}", stem, ext))).ok()
}

/// Run a single good document (expected to succeed).
fn run_good_test(path: &Path) -> Result<(), String> {
    let name = file_name(path);
    let content = fs::read_to_string(path).map_err(|e| format!("{}: {}", name, e))?;
    let value = parse(&content).map_err(|e| format!("{}: Unexpected parse error: {}", name, e))?;

    let expected_text = read_companion(path, "json", "json")
        .ok_or_else(|| format!("{}: no expected .json file", name))?;
    let expected = parse(&expected_text)
        .map_err(|e| format!("{}: expected output does not parse: {}", name, e))?;
    if value != expected {
        return Err(format!(
            "{}: Output mismatch\n    expected: {:?}\n    actual:   {:?}",
            name, expected, value
        ));
    }

    // What we emit must read back to the same tree.
    let json = to_json(&value, 2).map_err(|e| format!("{}: {}", name, e))?;
    let reparsed = parse(&json).map_err(|e| format!("{}: re-parse failed: {}", name, e))?;
    if reparsed != value {
        return Err(format!("{}: JSON round trip changed the value", name));
    }
    println!("  {} => {}", name, to_json(&value, 0).unwrap_or_default());
    Ok(())
}

/// Run a single bad document (expected to fail with a specific error).
fn run_bad_test(path: &Path) -> Result<(), String> {
    let name = file_name(path);
    let content = fs::read_to_string(path).map_err(|e| format!("{}: {}", name, e))?;
    match parse_with_filename(&content, Some(&name)) {
        Ok(value) => Err(format!(
            "{}: Expected parse error, but got success: {:?}",
            name, value
        )),
        Err(e) => check_error(&name, read_companion(path, "bad", "error"), &e.to_string()),
    }
}

fn check_error(name: &str, expected: Option<String>, actual: &str) -> Result<(), String> {
    match expected {
        Some(expected) if expected.trim() == actual => {
            println!("  {} => error (as expected)", name);
            Ok(())
        }
        Some(expected) => Err(format!(
            "{}: Error mismatch\n    expected: {}\n    actual:   {}",
            name,
            expected.trim(),
            actual
        )),
        None => {
            println!("  {} => error: {} (no .error file to compare)", name, actual);
            Ok(())
        }
    }
}

/// Run a file of command lines against its expected `.json` array.
fn run_command_test(path: &Path) -> Result<(), String> {
    let name = file_name(path);
    let content = fs::read_to_string(path).map_err(|e| format!("{}: {}", name, e))?;
    let expected_text = read_companion(path, "cmd", "json")
        .ok_or_else(|| format!("{}: no expected .json file", name))?;
    let expected = parse(&expected_text).map_err(|e| format!("{}: {}", name, e))?;
    let expected = expected
        .as_array()
        .ok_or_else(|| format!("{}: expected output must be an array", name))?;

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() != expected.len() {
        return Err(format!(
            "{}: {} lines but {} expected entries",
            name,
            lines.len(),
            expected.len()
        ));
    }

    let reader = Reader::new().filename(Some(&name));
    for (i, (line, want)) in lines.iter().zip(expected).enumerate() {
        let got = reader
            .parse_command(line)
            .map_err(|e| format!("{} line {}: {}", name, i + 1, e))?
            .map(|c| c.to_value())
            .unwrap_or(Value::Null);
        if &got != want {
            return Err(format!(
                "{} line {}: Output mismatch\n    expected: {:?}\n    actual:   {:?}",
                name,
                i + 1,
                want,
                got
            ));
        }
    }
    println!("  {} => {} lines", name, lines.len());
    Ok(())
}

/// Run a single failing command line.
fn run_bad_command_test(path: &Path) -> Result<(), String> {
    let name = file_name(path);
    let content = fs::read_to_string(path).map_err(|e| format!("{}: {}", name, e))?;
    let line = content.lines().next().unwrap_or("");
    match Reader::new().filename(Some(&name)).parse_command(line) {
        Ok(command) => Err(format!(
            "{}: Expected parse error, but got success: {:?}",
            name, command
        )),
        Err(e) => check_error(&name, read_companion(path, "cmd-bad", "error"), &e.to_string()),
    }
}

/// Run every file through `run` and fail with a summary if any failed.
fn run_all(kind: &str, files: &[PathBuf], run: fn(&Path) -> Result<(), String>) {
    assert!(!files.is_empty(), "no {} fixtures found", kind);
    println!("\nRunning {} {} fixtures:", files.len(), kind);

    let errors: Vec<String> = files.iter().filter_map(|f| run(f).err()).collect();

    println!(
        "\nResults: {} passed, {} failed",
        files.len() - errors.len(),
        errors.len()
    );
    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }
    assert!(errors.is_empty(), "{} {} fixtures failed", errors.len(), kind);
}

#[test]
fn test_all_good_fixtures() {
    run_all("good", &get_files_in_subdir("good", "jp"), run_good_test);
}

#[test]
fn test_all_bad_fixtures() {
    run_all("bad", &get_files_in_subdir("bad", "jp"), run_bad_test);
}

#[test]
fn test_all_command_fixtures() {
    run_all("command", &get_files_in_subdir("cmd", "cmd"), run_command_test);
}

#[test]
fn test_all_bad_command_fixtures() {
    run_all(
        "bad command",
        &get_files_in_subdir("cmd-bad", "cmd"),
        run_bad_command_test,
    );
}
