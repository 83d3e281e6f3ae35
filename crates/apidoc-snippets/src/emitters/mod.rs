pub mod curl;
pub mod go;
pub mod java;
pub mod javascript;
pub mod node;
pub mod php;
pub mod python;
pub mod typescript;

/// Escape for a double-quoted string literal (C-family and shell).
pub(crate) fn escape_double(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Escape for a single-quoted PHP string, where only `\` and `'` are special.
pub(crate) fn escape_single(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Indent every line after the first, for nesting multi-line literals.
pub(crate) fn indent_tail(text: &str, pad: &str) -> String {
    text.lines()
        .collect::<Vec<_>>()
        .join(&format!("\n{pad}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_double() {
        assert_eq!(escape_double(r#"say "hi"\n"#), r#"say \"hi\"\\n"#);
        assert_eq!(escape_double("a\nb"), "a\\nb");
    }

    #[test]
    fn test_indent_tail() {
        assert_eq!(indent_tail("{\n  \"a\": 1\n}", "    "), "{\n      \"a\": 1\n    }");
    }
}
