//! Integration Test: Production Source Rules
//!
//! **Policy**: production code (everything before a file's `#[cfg(test)]`
//! module) in the core library, the watcher and the TUI must not:
//! - sleep: periodic work uses `tokio::time::interval`, waiting uses
//!   channels, timeouts or I/O
//! - block inside async functions: no `std::fs`, `std::net` or
//!   `reqwest::blocking` there
//! - panic on recoverable errors: no `unwrap()` / `expect()`

use architectural_enforcement::{is_in_async_function, scan, Violation};

fn report(title: &str, violations: &[Violation], advice: &[&str]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for line in advice {
        eprintln!("  {line}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(|_, _, code| code.contains("::sleep(") || code.contains(".sleep("));

    report(
        "Sleep calls found in production code!",
        &violations,
        &[
            "✅ Periodic tasks: tokio::time::interval()",
            "✅ Bounded waits: tokio::time::timeout()",
            "✅ Waiting for state: watch::Receiver::changed()",
        ],
    );
}

#[test]
fn test_no_blocking_io_in_async_code() {
    let violations = scan(|lines, idx, code| {
        if code.contains("reqwest::blocking") {
            return true;
        }
        (code.contains("std::fs::") || code.contains("std::net::"))
            && is_in_async_function(lines, idx)
    });

    report(
        "Blocking I/O found in async production code!",
        &violations,
        &[
            "✅ Config files may be read with std::fs before the runtime work starts",
            "✅ Inside async fns use tokio::fs / tokio::net / async reqwest",
        ],
    );
}

#[test]
fn test_no_unwrap_in_production_code() {
    let violations = scan(|_, _, code| code.contains(".unwrap()") || code.contains(".expect("));

    report(
        "unwrap()/expect() found in production code!",
        &violations,
        &[
            "✅ Libraries: return a thiserror error with ?",
            "✅ Binaries: add anyhow context with .context(...)?",
        ],
    );
}
