//! Numeric character reference encoding for escaped ERB placeholders.

/// Replacement for the `<` of a `<%%` literal-escape.
pub(crate) const LITERAL_OPEN: &str = "&lt;";

/// Appends `text` to `out`, turning every ASCII byte that is not alphanumeric
/// into a numeric character reference.
///
/// The result contains no markup-significant characters (`<`, `>`, quotes,
/// whitespace, `=`, `/`), so the markup parser sees it as opaque text wherever
/// it lands. Non-ASCII characters are copied unchanged.
pub(crate) fn encode_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch.is_ascii() && !ch.is_ascii_alphanumeric() {
            out.push_str("&#");
            out.push_str(&(ch as u32).to_string());
            out.push(';');
        } else {
            out.push(ch);
        }
    }
}
