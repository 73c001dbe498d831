//! Text wrapping for the chat view.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Word-wrap `text` to `width` display columns, prefixing every line with
/// `indent`. Words wider than the available space are split.
pub fn wrap_indented(text: &str, width: usize, indent: &str) -> Vec<String> {
    let available = width.saturating_sub(indent.width()).max(1);
    let mut lines = Vec::new();

    for source in text.lines() {
        let mut line = String::new();
        let mut line_width = 0;

        for word in source.split(' ') {
            if !line.is_empty() {
                if line_width + 1 + word.width() <= available {
                    line.push(' ');
                    line_width += 1;
                } else {
                    lines.push(format!("{}{}", indent, line));
                    line.clear();
                    line_width = 0;
                }
            }

            for ch in word.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if line_width + ch_width > available && !line.is_empty() {
                    lines.push(format!("{}{}", indent, line));
                    line.clear();
                    line_width = 0;
                }
                line.push(ch);
                line_width += ch_width;
            }
        }

        lines.push(format!("{}{}", indent, line));
    }

    if lines.is_empty() {
        lines.push(indent.to_string());
    }

    lines
}
