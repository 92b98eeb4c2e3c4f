//! Helpers for building SOQL text.

/// Render `value` as a single-quoted SOQL string literal.
///
/// Backslashes and single quotes are escaped so caller-supplied ids, order
/// numbers and emails cannot break out of the literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_are_wrapped() {
        assert_eq!(quote("ORD-001"), "'ORD-001'");
        assert_eq!(quote("a@b.com"), "'a@b.com'");
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(quote("o'brien"), r"'o\'brien'");
        assert_eq!(quote(r"a\b"), r"'a\\b'");
        assert_eq!(quote("' OR Name != '"), r"'\' OR Name != \''");
    }
}
