use std::fmt::Write as _;

use super::RecordFields;

/// Renders records back into the canonical document layout. The output
/// always ends in a newline so page diffs stay minimal.
pub fn render_records(records: &[RecordFields]) -> String {
    let mut out = String::from("return {\n");
    for record in records {
        out.push_str("\t{\n");
        for (key, raw) in record {
            if is_bare_key(key) {
                writeln!(out, "\t\t{} = \"{}\",", key, escape(raw)).expect("write field");
            } else {
                writeln!(out, "\t\t[\"{}\"] = \"{}\",", escape(key), escape(raw))
                    .expect("write bracketed field");
            }
        }
        out.push_str("\t},\n");
    }
    out.push_str("}\n");
    out
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}
