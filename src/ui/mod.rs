//! Operator-facing terminal output.
//!
//! Separates concerns:
//! - `formatter` - Printing to stdout/stderr
//! - This module - Pure text helpers shared by the printers

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_operation, display_promotion_header,
    display_release_notes, display_status, display_success, display_version_change,
};

/// Indent every line of multi-line output by two spaces.
pub fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First seven characters of a commit hash.
pub fn short_hash(hash: &str) -> &str {
    if hash.len() > 7 {
        &hash[..7]
    } else {
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_multiline() {
        assert_eq!(indent("- a\n- b"), "  - a\n  - b");
    }

    #[test]
    fn test_indent_empty() {
        assert_eq!(indent(""), "");
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("abc1234def5678"), "abc1234");
        assert_eq!(short_hash("abc"), "abc");
    }
}
