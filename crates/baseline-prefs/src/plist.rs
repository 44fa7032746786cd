//! Re-serializing structured values read from the store.
//!
//! `defaults read` prints dictionaries and arrays in the old-style property
//! list layout, one item per line:
//!
//! ```text
//! {
//!     Enabled = 1;
//!     Servers =     (
//!         "a.example.com",
//!         b
//!     );
//! }
//! ```
//!
//! The store cannot replace part of such a value, so an undo must write the
//! whole thing back as one literal: `{"Enabled" = 1;"Servers" = ("a.example.com","b");}`.

/// True when a value contains dictionary or array delimiters.
pub fn is_structured(value: &str) -> bool {
    value.contains(['{', '}', '(', ')'])
}

fn quote(token: &str) -> String {
    let bare = token.trim().trim_matches('"');
    format!("\"{bare}\"")
}

fn is_delimiter_line(line: &str) -> bool {
    matches!(
        line,
        "{" | "(" | "}" | ")" | "};" | ");" | "}," | "),"
    )
}

/// Collapse a multi-line structured value into a single literal.
///
/// Keys and array elements are quoted; dictionary values are kept as printed.
pub fn serialize_structured(output: &str) -> String {
    let mut literal = String::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_delimiter_line(line) {
            literal.push_str(line);
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            literal.push_str(&quote(key));
            literal.push_str(" = ");
            literal.push_str(value);
            continue;
        }

        match line.strip_suffix(',') {
            Some(element) => {
                literal.push_str(&quote(element));
                literal.push(',');
            }
            None => literal.push_str(&quote(line)),
        }
    }

    literal
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dictionary_with_nested_array() {
        let output = "{\n    Enabled = 1;\n    Servers =     (\n        \"a.example.com\",\n        b\n    );\n}\n";
        assert_eq!(
            serialize_structured(output),
            r#"{"Enabled" = 1;"Servers" = ("a.example.com","b");}"#
        );
    }

    #[test]
    fn array_of_dictionaries() {
        let output = "(\n    {\n        Name = \"Guest Access\";\n    },\n    {\n        Name = Admin;\n    }\n)\n";
        assert_eq!(
            serialize_structured(output),
            r#"({"Name" = "Guest Access";},{"Name" = Admin;})"#
        );
    }

    #[test]
    fn quoted_keys_are_not_double_quoted() {
        assert_eq!(
            serialize_structured("{\n    \"com.apple.x\" = 0;\n}"),
            r#"{"com.apple.x" = 0;}"#
        );
    }

    #[test]
    fn detects_structure() {
        assert!(is_structured("{ a = 1; }"));
        assert!(is_structured("(a, b)"));
        assert!(!is_structured("-bool true"));
    }
}
