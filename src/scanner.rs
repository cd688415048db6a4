/// ASCII whitespace as SGF writers use it, vertical tab included.
pub(crate) fn is_sgf_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// `text[start..end]` with surrounding whitespace removed.
pub(crate) fn trimmed_slice(text: &str, start: usize, end: usize) -> &str {
    text[start..end].trim_matches(|c: char| c.is_ascii() && is_sgf_space(c as u8))
}

/// Finds the first unescaped byte of `targets` at or after `start`.
///
/// A backslash escapes the byte after it. When `expect_contents` is false only
/// whitespace may precede the target; any other byte ends the scan with `None`.
pub fn find_first(text: &str, start: usize, targets: &[u8], expect_contents: bool) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut escaping = false;

    for (pos, &cur) in bytes.iter().enumerate().skip(start) {
        if escaping {
            escaping = false;
        } else if cur == b'\\' {
            escaping = true;
        } else if targets.contains(&cur) {
            return Some(pos);
        } else if !expect_contents && !is_sgf_space(cur) {
            return None;
        }
    }

    None
}
