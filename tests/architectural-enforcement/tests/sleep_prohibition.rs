//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the TUI and the conductor core MUST NOT
//! call sleep methods. Waiting happens on I/O and channels.
//! **Exception**: frame rate limiting in the TUI event loop.

use architectural_enforcement::{rust_sources, sleep_violations};

#[test]
fn test_no_sleep_in_conductor_core() {
    assert!(
        !rust_sources("conductor/core/src").is_empty(),
        "conductor core sources not found"
    );

    let violations = sleep_violations("conductor/core/src", false);
    assert!(
        violations.is_empty(),
        "Sleep calls found in conductor core:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_no_sleep_in_tui_outside_frame_limiter() {
    assert!(!rust_sources("tui/src").is_empty(), "tui sources not found");

    let violations = sleep_violations("tui/src", true);
    assert!(
        violations.is_empty(),
        "Sleep calls found in TUI outside frame limiting:\n{}",
        violations.join("\n")
    );
}
