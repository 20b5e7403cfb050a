use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Truncate a string to fit within `width` display columns, adding ".." if
/// truncated. Measures Unicode display width so CJK alignment stays correct.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if width < 3 {
        // No room for the ellipsis; keep the first char that fits
        for ch in s.chars() {
            if char_width(ch) <= width {
                return ch.to_string();
            }
        }
        return String::new();
    }

    if display_width(s) <= width {
        return s.to_string();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = char_width(ch);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }

    format!("{}..", &s[..end_byte])
}
