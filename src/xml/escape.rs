use crate::core::NotaError;

/// Escape the five XML metacharacters (`& < > " '`) in a text node or
/// attribute value.
pub fn escape(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

/// Resolve XML entities back to characters.
///
/// `&amp;` is resolved as a single entity, never re-scanned, so
/// `unescape(escape(s)) == s` holds for every input — escaped output
/// containing `&amp;lt;` decodes to `&lt;`, not `<`.
pub fn unescape(s: &str) -> Result<String, NotaError> {
    quick_xml::escape::unescape(s)
        .map(|c| c.into_owned())
        .map_err(|e| NotaError::Xml(format!("invalid entity in '{s}': {e}")))
}
