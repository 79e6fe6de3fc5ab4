//! Pure, stateless XML group builders.
//!
//! Groups are built bottom-up and concatenated; no builder holds
//! document-wide state, so nested structures compose by string
//! concatenation and two independent serializations can never interfere.

use rust_decimal::Decimal;

use super::escape::escape;

/// Build a leaf group: a tag wrapping one text element per field, every
/// value escaped. Fields with empty values are omitted.
pub fn build_group(tag: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(tag);
    out.push('>');
    for (name, value) in fields {
        if value.is_empty() {
            continue;
        }
        out.push_str(&text_element(name, value));
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    out
}

/// Wrap pre-built child XML in a parent tag.
pub fn wrap_group(tag: &str, children: &str) -> String {
    format!("<{tag}>{children}</{tag}>")
}

/// Wrap pre-built child XML in a parent tag with escaped attributes.
pub fn wrap_group_with_attrs(tag: &str, attrs: &[(&str, &str)], children: &str) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
    out.push('>');
    out.push_str(children);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    out
}

/// A single text element with escaped content.
pub fn text_element(tag: &str, text: &str) -> String {
    format!("<{tag}>{}</{tag}>", escape(text))
}

/// Format a Decimal for XML output — always include at least 2 decimal
/// places, keep any extra precision.
pub fn format_decimal(d: Decimal) -> String {
    let s = d.normalize().to_string();
    if let Some(dot_pos) = s.find('.') {
        let decimals = s.len() - dot_pos - 1;
        if decimals < 2 {
            format!("{s}{}", "0".repeat(2 - decimals))
        } else {
            s
        }
    } else {
        format!("{s}.00")
    }
}
