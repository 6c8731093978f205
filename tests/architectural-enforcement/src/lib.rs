//! Architectural Enforcement Helpers
//!
//! Shared source-scanning helpers for the workspace-level tests in `tests/`:
//! - No `sleep()` calls in production code (frame limiting in the TUI excepted)
//! - The conductor core stays free of terminal UI crates
//!
//! Only production code is scanned. Test modules are expected at the bottom
//! of each file, so scanning stops at the first `#[cfg(test)]`.

use std::fs;
use std::path::{Path, PathBuf};

/// Crates the conductor core must never depend on
pub const UI_CRATES: &[&str] = &["ratatui", "crossterm", "tracing-subscriber"];

/// Workspace root (two levels above this crate)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// All `.rs` files under `dir` (relative to the workspace root)
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Production lines of a source file: 1-based line number and code without
/// trailing `//` comments. Stops at the first `#[cfg(test)]`.
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .collect()
}

/// Whether a line calls a sleep function
pub fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Whether the lines around `idx` talk about frame timing
pub fn is_frame_limiting_context(lines: &[(usize, &str)], idx: usize) -> bool {
    let start = idx.saturating_sub(10);
    let end = (idx + 5).min(lines.len());
    lines[start..end].iter().any(|(_, line)| {
        let line = line.to_lowercase();
        line.contains("frame") || line.contains("fps") || line.contains("tick")
    })
}

/// Find sleep calls in production code under `dir`
///
/// With `allow_frame_limiting`, sleeps in `tui/src/app.rs` next to frame
/// timing code are accepted.
pub fn sleep_violations(dir: &str, allow_frame_limiting: bool) -> Vec<String> {
    let mut violations = Vec::new();

    for path in rust_sources(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let lines = production_lines(&content);

        for (idx, (line_number, code)) in lines.iter().enumerate() {
            if !is_sleep_call(code) {
                continue;
            }
            if allow_frame_limiting
                && path.ends_with("tui/src/app.rs")
                && is_frame_limiting_context(&lines, idx)
            {
                continue;
            }
            violations.push(format!(
                "{}:{} - {}",
                path.display(),
                line_number,
                code.trim()
            ));
        }
    }

    violations
}

/// Dependency names from the `[dependencies]` table of a Cargo.toml
pub fn dependency_names(manifest: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut in_deps = false;

    for line in manifest.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_deps = line == "[dependencies]";
            continue;
        }
        if !in_deps || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            names.push(name.trim().to_string());
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_tests() {
        let src = "fn a() {} // sleep(1)\n#[cfg(test)]\nmod tests { fn b() { sleep(1) } }\n";
        let lines = production_lines(src);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], (1, "fn a() {} "));
    }

    #[test]
    fn test_sleep_detection() {
        assert!(is_sleep_call("tokio::time::sleep(d).await;"));
        assert!(is_sleep_call("std::thread::sleep(d);"));
        assert!(!is_sleep_call("let asleep = true;"));
    }

    #[test]
    fn test_dependency_names() {
        let manifest = r#"
[package]
name = "x"

[dependencies]
# Async runtime
tokio = { version = "1", features = ["full"] }
serde = "1"

[dev-dependencies]
ratatui = "0.29"
"#;
        assert_eq!(dependency_names(manifest), vec!["tokio", "serde"]);
    }
}
