//! Shared helpers for dombuild's integration tests.

use std::fmt::Write;

/// Escapes control characters so snapshot lines stay one-line.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the first mismatching region of two line sequences, with two
/// lines of context on each side.
pub fn diff_lines(expected: &[&str], actual: &[String]) -> String {
    let max = expected.len().max(actual.len());
    let missing = "<missing>";
    let mut mismatch = None;
    for i in 0..max {
        let left = expected.get(i).copied().unwrap_or(missing);
        let right = actual.get(i).map(String::as_str).unwrap_or(missing);
        if left != right {
            mismatch = Some(i);
            break;
        }
    }
    let mut out = String::new();
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for line_idx in start..end {
            let left = expected.get(line_idx).copied().unwrap_or(missing);
            let right = actual.get(line_idx).map(String::as_str).unwrap_or(missing);
            let marker = if line_idx == i { ">" } else { " " };
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {left}", line_idx + 1);
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {right}", line_idx + 1);
        }
    } else if expected.len() != actual.len() {
        let _ = writeln!(
            &mut out,
            "prefix matched but lengths differ (expected {} lines, actual {} lines)",
            expected.len(),
            actual.len()
        );
    }
    out
}

/// Asserts that a built tree snapshots to exactly `expected`.
#[cfg(feature = "dom-snapshot")]
pub fn assert_tree(root: &dombuild::Node, expected: &[&str]) {
    let snapshot = dombuild::dom_snapshot::TreeSnapshot::new(root);
    let actual = snapshot.as_lines();
    if actual != expected {
        panic!("tree snapshot mismatch\n{}", diff_lines(expected, actual));
    }
}
