//! Integration Test: Layering
//!
//! The conductor core is headless. It must not depend on terminal UI crates
//! or install a log subscriber; those belong to the surface.

use std::fs;

use architectural_enforcement::{
    dependency_names, production_lines, rust_sources, workspace_root, UI_CRATES,
};

#[test]
fn test_core_manifest_has_no_ui_crates() {
    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("conductor/core/Cargo.toml readable");
    let deps = dependency_names(&manifest);

    assert!(deps.iter().any(|d| d == "tokio"), "unexpected manifest shape");
    for ui in UI_CRATES {
        assert!(
            !deps.iter().any(|d| d == ui),
            "conductor core depends on {ui}"
        );
    }
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let mut violations = Vec::new();

    for path in rust_sources("conductor/core/src") {
        let content = fs::read_to_string(&path).unwrap_or_default();
        for (line_number, code) in production_lines(&content) {
            let uses_ui = UI_CRATES
                .iter()
                .map(|c| c.replace('-', "_"))
                .any(|c| code.contains(&format!("{c}::")));
            if uses_ui {
                violations.push(format!("{}:{}", path.display(), line_number));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "UI crates referenced from conductor core:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_tui_depends_on_core() {
    let manifest = fs::read_to_string(workspace_root().join("tui/Cargo.toml"))
        .expect("tui/Cargo.toml readable");
    assert!(dependency_names(&manifest)
        .iter()
        .any(|d| d == "pastel-conductor"));
}
