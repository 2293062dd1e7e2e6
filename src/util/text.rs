use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Terminal columns occupied by `s`.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Shorten `s` to at most `max_width` columns, ending in an ellipsis when cut.
///
/// Wide characters are never split.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Remove escape sequences and control characters from catalog text before
/// it reaches the terminal.
///
/// CSI (`ESC [ ... final`) and OSC (`ESC ] ... BEL|ST`) sequences are dropped
/// whole. Newlines and tabs become spaces so a card stays on one line.
pub fn sanitize_line(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| c.is_control()) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    for n in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&n) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(n) = chars.next() {
                        if n == '\x07' {
                            break;
                        }
                        if n == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\n' | '\r' | '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits_is_borrowed() {
        assert!(matches!(truncate_to_width("VLC", 10), Cow::Borrowed("VLC")));
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_to_width("Notepad++", 6), "Notep…");
        assert_eq!(truncate_to_width("Notepad++", 0), "");
        assert_eq!(truncate_to_width("Notepad++", 1), "…");
    }

    #[test]
    fn test_truncate_wide_chars_not_split() {
        // Each CJK char is two columns wide
        let out = truncate_to_width("日本語ゲーム", 6);
        assert_eq!(out, "日本…");
        assert!(display_width(&out) <= 6);
    }

    #[test]
    fn test_sanitize_clean_is_borrowed() {
        assert!(matches!(sanitize_line("Doom 64"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_strips_sequences() {
        assert_eq!(sanitize_line("\x1b[31mRed\x1b[0m game"), "Red game");
        assert_eq!(sanitize_line("a\x1b]0;title\x07b"), "ab");
        assert_eq!(sanitize_line("a\x1b]52;c;eA==\x1b\\b"), "ab");
        assert_eq!(sanitize_line("two\nlines\tand\x00nul"), "two lines andnul");
    }
}
